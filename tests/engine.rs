//! End-to-end engine scenarios over real temporary file trees.
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::tempdir;
use zxgrep::{
    classifier, CancelToken, MatchRecord, SearchConfig, SearchEngine, SearchRequest, SearchResults,
};

fn run(pattern: &str, targets: Vec<PathBuf>, config: SearchConfig) -> SearchResults {
    let engine = SearchEngine::new();
    let request = SearchRequest::new(pattern, targets, config);
    engine.search(&request, &CancelToken::new())
}

fn assert_sorted(matches: &[MatchRecord]) {
    for pair in matches.windows(2) {
        let key = |r: &MatchRecord| (r.path.clone(), r.line_number, r.match_start);
        assert!(key(&pair[0]) <= key(&pair[1]), "records out of order");
    }
}

fn assert_spans_match(pattern: &str, matches: &[MatchRecord]) {
    let regex = regex::Regex::new(pattern).unwrap();
    for record in matches {
        let span = &record.line[record.match_start..record.match_end];
        assert!(regex.is_match(span), "span {span:?} does not match {pattern:?}");
    }
}

#[test]
fn two_matches_on_one_line() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "foo bar foo\n").unwrap();

    let results = run("foo", vec![dir.path().to_path_buf()], SearchConfig::default());
    assert_eq!(results.matches.len(), 2);
    for record in &results.matches {
        assert!(record.path.ends_with("a.txt"));
        assert_eq!(record.line_number, 1);
        assert_eq!(record.line, "foo bar foo");
    }
    assert_eq!(
        (results.matches[0].match_start, results.matches[0].match_end),
        (0, 3)
    );
    assert_eq!(
        (results.matches[1].match_start, results.matches[1].match_end),
        (8, 11)
    );
    assert_eq!(results.total_files, 1);
    assert!(!results.truncated);
}

#[test]
fn multi_file_ordering() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("b")).unwrap();
    fs::write(dir.path().join("b/one.txt"), "x\nhit\n").unwrap();
    fs::write(dir.path().join("b/two.txt"), "hit\n").unwrap();

    let results = run("hit", vec![dir.path().to_path_buf()], SearchConfig::default());
    assert_eq!(results.matches.len(), 2);
    assert!(results.matches[0].path.ends_with("b/one.txt"));
    assert_eq!(results.matches[0].line_number, 2);
    assert!(results.matches[1].path.ends_with("b/two.txt"));
    assert_eq!(results.matches[1].line_number, 1);
    assert_sorted(&results.matches);
    assert_spans_match("hit", &results.matches);
}

#[test]
fn hidden_and_binary_files_are_skipped() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(".hidden.txt"), "x\n").unwrap();
    fs::write(dir.path().join("image.png"), "x\n").unwrap();
    fs::write(dir.path().join("code.txt"), "xyz\n").unwrap();

    let results = run("x", vec![dir.path().to_path_buf()], SearchConfig::default());
    assert_eq!(results.matches.len(), 1);
    let record = &results.matches[0];
    assert!(record.path.ends_with("code.txt"));
    assert_eq!(record.line_number, 1);
    assert_eq!(record.line, "xyz");
    assert_eq!((record.match_start, record.match_end), (0, 1));
    assert_eq!(results.total_files, 1);
}

#[test]
fn invalid_pattern_is_the_only_hard_failure() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "anything\n").unwrap();

    let results = run(
        "[unclosed",
        vec![dir.path().to_path_buf()],
        SearchConfig::default(),
    );
    assert!(results.matches.is_empty());
    assert!(!results.truncated);
    assert_eq!(results.errors.len(), 1);
    assert!(results.errors[0].contains("Invalid regex pattern"));
}

#[test]
fn truncation_honors_the_cap_and_stays_sorted() {
    let dir = tempdir().unwrap();
    let content = "hit\n".repeat(100);
    for i in 0..10 {
        fs::write(dir.path().join(format!("f{i:02}.txt")), &content).unwrap();
    }

    let mut config = SearchConfig::default();
    config.max_results = 250;
    let results = run("hit", vec![dir.path().to_path_buf()], config);
    assert_eq!(results.matches.len(), 250);
    assert!(results.truncated);
    assert_sorted(&results.matches);
    assert_spans_match("hit", &results.matches);
}

#[test]
fn completeness_below_the_cap() {
    let dir = tempdir().unwrap();
    for i in 0..5 {
        fs::write(
            dir.path().join(format!("f{i}.txt")),
            "hit\nmiss\nhit hit\n",
        )
        .unwrap();
    }

    let results = run("hit", vec![dir.path().to_path_buf()], SearchConfig::default());
    assert!(!results.truncated);
    assert_eq!(results.matches.len(), 15);
    let progress = &results.progress;
    assert_eq!(progress.processed_files, progress.total_files);
    assert_eq!(progress.processed_bytes, progress.total_bytes);
    assert_eq!(progress.matches_found, 15);
}

#[test]
fn cancellation_before_dispatch_returns_promptly() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "hit\n").unwrap();

    let engine = SearchEngine::new();
    let request = SearchRequest::new(
        "hit",
        vec![dir.path().to_path_buf()],
        SearchConfig::default(),
    );
    let cancel = CancelToken::new();
    cancel.cancel();

    let results = engine.search(&request, &cancel);
    assert!(results.matches.is_empty());
    assert!(results.progress.cancelled);
}

#[test]
fn cancellation_mid_run_returns_partial_sorted_results() {
    let dir = tempdir().unwrap();
    let filler = "filler line without the token\n".repeat(200);
    for i in 0..1000 {
        let content = format!("{filler}hit number {i}\n");
        fs::write(dir.path().join(format!("f{i:04}.txt")), content).unwrap();
    }

    let mut config = SearchConfig::default();
    config.max_concurrency = 2;
    let engine = Arc::new(SearchEngine::new());
    let cancel = CancelToken::new();
    let request = SearchRequest::new("hit", vec![dir.path().to_path_buf()], config);

    let handle = {
        let engine = Arc::clone(&engine);
        let cancel = cancel.clone();
        thread::spawn(move || engine.search(&request, &cancel))
    };

    let deadline = Instant::now() + Duration::from_secs(30);
    while engine.progress().processed_files < 5 && Instant::now() < deadline {
        thread::sleep(Duration::from_micros(200));
    }
    cancel.cancel();
    let results = handle.join().unwrap();

    assert!(results.progress.cancelled);
    assert!(!results.matches.is_empty());
    assert!(results.matches.len() < 1000);
    assert_sorted(&results.matches);
    assert_spans_match("hit", &results.matches);
    for record in &results.matches {
        assert!(!classifier::is_hidden(&record.path));
        assert!(!classifier::is_binary_extension(&record.path));
    }
}

#[test]
fn no_eligible_files_reports_informational_error() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(".only-hidden"), "x\n").unwrap();

    let results = run("x", vec![dir.path().to_path_buf()], SearchConfig::default());
    assert!(results.matches.is_empty());
    assert!(results
        .errors
        .iter()
        .any(|e| e.contains("No searchable files found")));
}

#[test]
fn missing_target_is_reported_but_not_fatal() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "hit\n").unwrap();

    let results = run(
        "hit",
        vec![dir.path().join("missing"), dir.path().join("a.txt")],
        SearchConfig::default(),
    );
    assert_eq!(results.matches.len(), 1);
    assert!(results
        .errors
        .iter()
        .any(|e| e.contains("File or folder not found")));
}

#[test]
fn case_insensitive_configuration() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "Hit\nHIT\nhit\n").unwrap();

    let mut config = SearchConfig::default();
    config.case_sensitive = false;
    let results = run("hit", vec![dir.path().to_path_buf()], config);
    assert_eq!(results.matches.len(), 3);

    let results = run(
        "hit",
        vec![dir.path().to_path_buf()],
        SearchConfig::default(),
    );
    assert_eq!(results.matches.len(), 1);
}

#[test]
fn identical_runs_produce_identical_bundles() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("a.txt"), "hit\nmiss\nhit\n").unwrap();
    fs::write(dir.path().join("nested/b.txt"), "hit hit\n").unwrap();

    let first = run("hit", vec![dir.path().to_path_buf()], SearchConfig::default());
    let second = run("hit", vec![dir.path().to_path_buf()], SearchConfig::default());
    assert_eq!(first.matches, second.matches);
    assert_eq!(first.total_files, second.total_files);
    assert_eq!(first.truncated, second.truncated);
}

#[test]
fn auto_configuration_still_finds_everything() {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        fs::write(dir.path().join(format!("f{i}.txt")), "hit\n").unwrap();
    }

    let mut config = SearchConfig::default();
    config.auto_configured = true;
    let results = run("hit", vec![dir.path().to_path_buf()], config);
    assert_eq!(results.matches.len(), 20);
    assert_sorted(&results.matches);
}

#[test]
fn suggestions_surface_for_near_misses() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "hello wrold\nunrelated text line\n").unwrap();

    let results = run(
        "hello world",
        vec![dir.path().to_path_buf()],
        SearchConfig::default(),
    );
    assert!(results.matches.is_empty());
    assert_eq!(results.suggestions, vec!["hello wrold".to_string()]);
}
