use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env, Target};
use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use zxgrep::cli::Cli;
use zxgrep::config::{FileConfig, SearchConfig};
use zxgrep::output;
use zxgrep::{analyze, AnalyzeOptions, CancelToken, SearchEngine, SearchRequest};

const PROGRESS_POLL_INTERVAL: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli)?;

    let file_config = FileConfig::load().unwrap_or_else(|err| {
        warn!("ignoring config file: {err}");
        FileConfig::default()
    });
    let mut config = SearchConfig::from_file_config(&file_config);
    if cli.ignore_case {
        config.case_sensitive = false;
    }
    if let Some(mib) = cli.max_size {
        config.max_file_size = mib << 20;
    }
    if let Some(max_results) = cli.max_results {
        config.max_results = max_results;
    }
    if let Some(jobs) = cli.jobs {
        config.max_concurrency = jobs;
    }
    config.auto_configured = cli.auto;
    config.validate()?;

    let missing: Vec<&PathBuf> = cli.targets.iter().filter(|t| !t.exists()).collect();
    if missing.len() == cli.targets.len() {
        for target in missing {
            eprintln!("File or folder not found: {}", target.display());
        }
        std::process::exit(1);
    }

    if cli.analyze {
        let analysis = analyze(&cli.targets, &config, AnalyzeOptions::default());
        print!("{}", output::render_analysis(&analysis));
        return Ok(());
    }

    let engine = Arc::new(SearchEngine::new());
    let cancel = CancelToken::new();
    let mut request = SearchRequest::new(cli.pattern.clone(), cli.targets.clone(), config);
    request.default_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let handle = {
        let engine = Arc::clone(&engine);
        let cancel = cancel.clone();
        thread::spawn(move || engine.search(&request, &cancel))
    };

    let bar = if cli.no_progress {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files {msg}",
                )?
                .progress_chars("=>-"),
        );
        bar
    };

    while !handle.is_finished() {
        let snapshot = engine.progress();
        if snapshot.total_files > 0 {
            bar.set_length(snapshot.total_files);
            bar.set_position(snapshot.processed_files);
        }
        bar.set_message(format!(
            "{} | {}",
            output::format_size(snapshot.processed_bytes),
            snapshot.current_file
        ));
        thread::sleep(PROGRESS_POLL_INTERVAL);
    }
    bar.finish_and_clear();

    let results = handle
        .join()
        .map_err(|_| anyhow::anyhow!("search thread panicked"))?;
    print!("{}", output::render_results(&results));

    if results
        .errors
        .iter()
        .any(|err| err.starts_with("Invalid regex pattern"))
    {
        std::process::exit(1);
    }
    Ok(())
}

fn setup_logging(cli: &Cli) -> Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));

    if let Some(log_path) = &cli.log {
        if let Some(parent_dir) = log_path.parent() {
            if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                fs::create_dir_all(parent_dir)?;
            }
        }
        let log_file = fs::File::create(log_path)?;
        builder.target(Target::Pipe(Box::new(log_file)));
    } else {
        builder.target(Target::Stderr);
    }

    builder.try_init()?;
    Ok(())
}
