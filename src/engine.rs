//! Search coordinator: validates the pattern, plans the configuration,
//! enumerates files, and runs the dispatcher.
use crate::analyzer::{self, AnalyzeOptions};
use crate::cancel::CancelToken;
use crate::config::SearchConfig;
use crate::dispatcher;
use crate::error::Result;
use crate::matcher::MatchRecord;
use crate::progress::{ProgressTracker, SearchProgress};
use crate::walker;
use regex::{Regex, RegexBuilder};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Immutable input for one search run.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub pattern: String,
    /// Files and directories to search. When empty, `default_dir` is
    /// searched instead.
    pub targets: Vec<PathBuf>,
    pub default_dir: PathBuf,
    pub config: SearchConfig,
}

impl SearchRequest {
    pub fn new(pattern: impl Into<String>, targets: Vec<PathBuf>, config: SearchConfig) -> Self {
        Self {
            pattern: pattern.into(),
            targets,
            default_dir: PathBuf::from("."),
            config,
        }
    }
}

/// Completed run: the records, everything learned along the way, and the
/// final progress snapshot.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    pub pattern: String,
    /// Human-readable description of what was searched.
    pub target: String,
    /// Sorted by (path, line number, match start).
    pub matches: Vec<MatchRecord>,
    pub suggestions: Vec<String>,
    pub errors: Vec<String>,
    /// Count of eligible files, whether or not they matched.
    pub total_files: usize,
    pub elapsed: Duration,
    pub progress: SearchProgress,
    /// Set when the result cap was reached and further records were dropped.
    pub truncated: bool,
}

/// One engine per in-flight request. The engine holds no global state;
/// concurrent searches take separate engines with separate cancel tokens.
#[derive(Debug, Default)]
pub struct SearchEngine {
    progress: Arc<ProgressTracker>,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the running search's progress. Callable from any thread
    /// while `search` executes.
    pub fn progress(&self) -> SearchProgress {
        self.progress.snapshot()
    }

    /// Run one search to completion. The only hard failure is an invalid
    /// pattern (or configuration); everything else degrades into error
    /// strings on the returned bundle.
    pub fn search(&self, request: &SearchRequest, cancel: &CancelToken) -> SearchResults {
        let started = Instant::now();
        self.progress.begin_run();

        let targets = if request.targets.is_empty() {
            vec![request.default_dir.clone()]
        } else {
            request.targets.clone()
        };
        let target = targets
            .iter()
            .map(|t| t.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");

        let mut results = SearchResults {
            pattern: request.pattern.clone(),
            target,
            ..Default::default()
        };

        if let Err(err) = request.config.validate() {
            results.errors.push(format!("Invalid configuration: {err}"));
            return self.finish(results, started, cancel);
        }

        let regex = match build_regex(&request.pattern, request.config.case_sensitive) {
            Ok(regex) => regex,
            Err(err) => {
                results.errors.push(format!("Invalid regex pattern: {err}"));
                return self.finish(results, started, cancel);
            }
        };

        let config = if request.config.auto_configured {
            analyzer::analyze(&targets, &request.config, AnalyzeOptions::default()).recommended
        } else {
            request.config.clone()
        };

        let enumeration = walker::enumerate(&targets, &config, cancel);
        for _ in 0..enumeration.errors.len() {
            self.progress.add_error();
        }
        results.errors.extend(enumeration.errors);
        results.total_files = enumeration.files.len();

        if enumeration.files.is_empty() {
            results.errors.push(
                "No searchable files found (all files may be binary, hidden, or too large)"
                    .to_string(),
            );
            return self.finish(results, started, cancel);
        }

        self.progress
            .set_totals(enumeration.files.len() as u64, enumeration.total_bytes);

        let outcome = dispatcher::dispatch(
            &regex,
            &request.pattern,
            enumeration.files,
            &config,
            &self.progress,
            cancel,
        );
        results.matches = outcome.matches;
        results.suggestions = outcome.suggestions;
        results.errors.extend(outcome.errors);
        results.truncated = outcome.truncated;

        self.finish(results, started, cancel)
    }

    fn finish(
        &self,
        mut results: SearchResults,
        started: Instant,
        cancel: &CancelToken,
    ) -> SearchResults {
        if cancel.is_cancelled() {
            self.progress.set_cancelled();
        }
        results.elapsed = started.elapsed();
        results.progress = self.progress.snapshot();
        results
    }
}

/// Compile the pattern, honoring the case flag.
pub fn build_regex(pattern: &str, case_sensitive: bool) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(!case_sensitive)
        .build()
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_flag_controls_compilation() {
        let sensitive = build_regex("Foo", true).unwrap();
        assert!(sensitive.is_match("Foo"));
        assert!(!sensitive.is_match("foo"));

        let insensitive = build_regex("Foo", false).unwrap();
        assert!(insensitive.is_match("foo"));
        assert!(insensitive.is_match("FOO"));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(build_regex("[unclosed", true).is_err());
    }
}
