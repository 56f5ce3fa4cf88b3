//! Plain-terminal rendering of result bundles and folder analyses.
use crate::analyzer::FolderAnalysis;
use crate::engine::SearchResults;
use chrono::{DateTime, Local};
use colored::*;
use std::fmt::Write;
use std::time::SystemTime;

/// Render a completed bundle the way the legacy command line prints it:
/// per-file headers, numbered lines with the span highlighted, suggestions
/// and errors, then a one-line summary.
pub fn render_results(results: &SearchResults) -> String {
    let mut out = String::new();

    if results.matches.is_empty() {
        let _ = writeln!(out, "{}", "No matches found.".magenta());
        if !results.suggestions.is_empty() {
            let _ = writeln!(out, "{}", "Suggested matches:".green());
            for suggestion in &results.suggestions {
                let _ = writeln!(out, "  - {}", suggestion.cyan());
            }
        }
    } else {
        let mut last_path = None;
        for record in &results.matches {
            if last_path != Some(&record.path) {
                let _ = writeln!(
                    out,
                    "\n{} {} ({} bytes, Last Modified: {})",
                    "File:".cyan().bold(),
                    record.path.display(),
                    record.file_size,
                    format_modified(record.modified),
                );
                last_path = Some(&record.path);
            }
            let before = &record.line[..record.match_start];
            let matched = &record.line[record.match_start..record.match_end];
            let after = &record.line[record.match_end..];
            let _ = writeln!(
                out,
                "  {} {} {}{}{}",
                record.line_number.to_string().yellow(),
                "|".dimmed(),
                before,
                matched.red().bold(),
                after
            );
        }
    }

    if !results.errors.is_empty() {
        let _ = writeln!(out, "\n{}", "Errors encountered:".red().bold());
        for err in &results.errors {
            let _ = writeln!(out, "  {}", err.red());
        }
    }

    let mut summary = format!(
        "\nFound {} matches in {} files in {:.2?}",
        results.matches.len(),
        results.total_files,
        results.elapsed
    );
    if results.truncated {
        summary.push_str(" (truncated)");
    }
    if results.progress.cancelled {
        summary.push_str(" (cancelled)");
    }
    let _ = writeln!(out, "{}", summary.green().bold());

    out
}

/// Render folder statistics and the planner's recommendation.
pub fn render_analysis(analysis: &FolderAnalysis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Folder Analysis".cyan().bold());

    let _ = writeln!(out, "\n{}", "File Statistics:".green().bold());
    let _ = writeln!(out, "Total Files: {}", analysis.total_files);
    let _ = writeln!(out, "Text Files: {}", analysis.text_files);
    let _ = writeln!(out, "Binary Files: {} (skipped)", analysis.binary_files);
    let _ = writeln!(out, "Hidden Files: {} (skipped)", analysis.hidden_files);
    let _ = writeln!(out, "Large Files: {} (may be skipped)", analysis.large_files);

    let _ = writeln!(out, "\n{}", "Size Statistics:".green().bold());
    let _ = writeln!(out, "Total Size: {}", format_size(analysis.total_bytes));
    let _ = writeln!(out, "Largest File: {}", format_size(analysis.largest_file));
    let _ = writeln!(
        out,
        "Average File Size: {}",
        format_size(analysis.average_file_size)
    );

    let recommended = &analysis.recommended;
    let _ = writeln!(out, "\n{}", "Recommended Configuration:".green().bold());
    let _ = writeln!(
        out,
        "Max File Size: {}",
        format_size(recommended.max_file_size)
    );
    let _ = writeln!(out, "Max Results: {}", recommended.max_results);
    let _ = writeln!(out, "Concurrency: {} workers", recommended.max_concurrency);

    out
}

/// Human-readable byte count, binary units.
pub fn format_size(size: u64) -> String {
    const UNIT: u64 = 1024;
    if size < UNIT {
        return format!("{size} B");
    }
    let mut div = UNIT;
    let mut exp = 0;
    let mut n = size / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    format!(
        "{:.1} {}B",
        size as f64 / div as f64,
        ['K', 'M', 'G', 'T', 'P', 'E'][exp]
    )
}

fn format_modified(modified: Option<SystemTime>) -> String {
    modified
        .map(|t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
