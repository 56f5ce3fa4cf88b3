//! Bounded worker pool: fans the file list out to workers, merges their
//! match streams under the result cap, and aggregates progress and errors.
use crate::cancel::CancelToken;
use crate::config::SearchConfig;
use crate::matcher::{self, MatchRecord};
use crate::progress::ProgressTracker;
use crate::walker::FileEntry;
use crossbeam_channel::bounded;
use log::debug;
use regex::Regex;
use std::collections::HashSet;
use std::thread;

/// Bound on the results channel; workers block here when the collector lags,
/// except while the run is draining.
const RESULTS_CHANNEL_BOUND: usize = 1024;
/// Bound on the errors channel. Errors are diagnostic; on overflow the
/// oldest are retained and the newest dropped.
const ERRORS_CHANNEL_BOUND: usize = 128;
/// Suggestion scanning is skipped above this many files.
const SUGGESTION_FILE_LIMIT: usize = 200;
/// Global cap on the suggestion list.
const MAX_SUGGESTIONS: usize = 10;

/// What the dispatcher hands back to the coordinator.
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    pub matches: Vec<MatchRecord>,
    pub suggestions: Vec<String>,
    pub errors: Vec<String>,
    pub truncated: bool,
}

/// Per-file message from a worker to the collector. Files with nothing to
/// report send nothing.
struct FileOutcome {
    records: Vec<MatchRecord>,
    suggestions: Vec<String>,
}

/// Run the worker pool over the file list. Files are dispatched FIFO in
/// enumeration order; workers are never re-ordered or stolen from. The
/// collector owns the result list exclusively and admits records until the
/// cap, after which the run keeps draining so workers never block on a full
/// channel. Returns once every worker has exited; none outlive the call.
pub fn dispatch(
    regex: &Regex,
    pattern: &str,
    files: Vec<FileEntry>,
    config: &SearchConfig,
    progress: &ProgressTracker,
    cancel: &CancelToken,
) -> DispatchOutcome {
    let want_suggestions =
        files.len() <= SUGGESTION_FILE_LIMIT && matcher::is_literal_pattern(pattern);
    let workers = config.max_concurrency.clamp(1, files.len().max(1));

    let (work_tx, work_rx) = bounded::<FileEntry>(workers * 2);
    let (result_tx, result_rx) = bounded::<FileOutcome>(RESULTS_CHANNEL_BOUND);
    let (error_tx, error_rx) = bounded::<String>(ERRORS_CHANNEL_BOUND);

    let (mut matches, mut suggestion_set, truncated) = thread::scope(|scope| {
        // Feeder: preserves enumeration order, observes cancellation
        // between dispatches.
        scope.spawn(move || {
            for entry in files {
                if cancel.is_cancelled() {
                    break;
                }
                if work_tx.send(entry).is_err() {
                    break;
                }
            }
        });

        for _ in 0..workers {
            let work_rx = work_rx.clone();
            let result_tx = result_tx.clone();
            let error_tx = error_tx.clone();
            scope.spawn(move || {
                while let Ok(entry) = work_rx.recv() {
                    if cancel.is_cancelled() {
                        break;
                    }
                    progress.file_started(&entry.path);
                    match matcher::search_file(regex, &entry, pattern, want_suggestions, cancel)
                    {
                        Ok(outcome) => {
                            progress.file_done(outcome.bytes);
                            progress.add_matches(outcome.records.len() as u64);
                            if outcome.records.is_empty() && outcome.suggestions.is_empty() {
                                continue;
                            }
                            if cancel.is_cancelled() {
                                break;
                            }
                            let sent = result_tx.send(FileOutcome {
                                records: outcome.records,
                                suggestions: outcome.suggestions,
                            });
                            if sent.is_err() {
                                break;
                            }
                        }
                        Err(err) => {
                            // The file still counts toward progress; its
                            // bytes are accounted as skipped.
                            progress.file_done(entry.size);
                            progress.add_error();
                            let message =
                                format!("unable to search {}: {err}", entry.path.display());
                            if error_tx.try_send(message).is_err() {
                                debug!("error channel full, dropping diagnostic");
                            }
                        }
                    }
                }
            });
        }
        // The collector's receive loop ends when the last worker drops its
        // sender clone.
        drop(result_tx);
        drop(error_tx);
        drop(work_rx);

        let mut matches: Vec<MatchRecord> = Vec::new();
        let mut suggestion_set: HashSet<String> = HashSet::new();
        let mut truncated = false;

        while let Ok(outcome) = result_rx.recv() {
            if truncated {
                // Draining: keep the channel moving, discard the payload.
                continue;
            }
            for record in outcome.records {
                if matches.len() >= config.max_results {
                    truncated = true;
                    break;
                }
                matches.push(record);
            }
            for suggestion in outcome.suggestions {
                suggestion_set.insert(suggestion);
            }
        }

        (matches, suggestion_set, truncated)
    });

    let errors: Vec<String> = error_rx.try_iter().collect();

    if cancel.is_cancelled() {
        progress.set_cancelled();
    }

    matches.sort_by(|a, b| {
        a.path
            .cmp(&b.path)
            .then(a.line_number.cmp(&b.line_number))
            .then(a.match_start.cmp(&b.match_start))
    });

    // Deterministic suggestion list: sort the deduplicated set, then cap.
    let mut suggestions: Vec<String> = suggestion_set.drain().collect();
    suggestions.sort();
    suggestions.truncate(MAX_SUGGESTIONS);

    DispatchOutcome {
        matches,
        suggestions,
        errors,
        truncated,
    }
}
