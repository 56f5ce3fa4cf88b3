//! Folder statistics and the adaptive configuration planner.
use crate::classifier;
use crate::config::{
    SearchConfig, DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_RESULTS, MAX_CONCURRENCY_CEILING,
};
use rayon::prelude::*;
use std::fs;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Statistics over a target set, plus the configuration the planner derives
/// from them.
#[derive(Debug, Clone, Default)]
pub struct FolderAnalysis {
    pub total_files: usize,
    pub total_bytes: u64,
    pub largest_file: u64,
    pub average_file_size: u64,
    pub hidden_files: usize,
    pub binary_files: usize,
    pub text_files: usize,
    /// Non-hidden files exceeding the file-size cap in force when the
    /// analysis ran.
    pub large_files: usize,
    pub recommended: SearchConfig,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzeOptions {
    /// Permit the recommendation to drop below the compiled-in defaults.
    /// Without this the planner only ever raises caps.
    pub allow_shrink: bool,
}

struct FileStat {
    size: u64,
    hidden: bool,
    binary: bool,
}

/// Walk the targets, tally file statistics, and derive a recommended
/// configuration for searching them.
pub fn analyze(
    targets: &[PathBuf],
    current: &SearchConfig,
    options: AnalyzeOptions,
) -> FolderAnalysis {
    let mut paths: Vec<PathBuf> = Vec::new();
    for target in targets {
        let Ok(meta) = fs::metadata(target) else {
            continue;
        };
        if meta.is_dir() {
            for entry in WalkDir::new(target).follow_links(false) {
                let Ok(entry) = entry else { continue };
                if entry.file_type().is_file() {
                    paths.push(entry.path().to_path_buf());
                }
            }
        } else {
            paths.push(target.clone());
        }
    }

    // Stat calls dominate on large trees; fan them out. The tallies below
    // are order-independent, so the result stays deterministic.
    let stats: Vec<FileStat> = paths
        .par_iter()
        .filter_map(|path| {
            let meta = fs::metadata(path).ok()?;
            Some(FileStat {
                size: meta.len(),
                hidden: classifier::is_hidden(path),
                binary: classifier::is_binary_extension(path),
            })
        })
        .collect();

    let mut analysis = FolderAnalysis::default();
    for stat in &stats {
        analysis.total_files += 1;
        analysis.total_bytes += stat.size;
        if stat.size > analysis.largest_file {
            analysis.largest_file = stat.size;
        }
        if stat.hidden {
            // Hidden files are excluded from the remaining tallies.
            analysis.hidden_files += 1;
            continue;
        }
        if stat.binary {
            analysis.binary_files += 1;
        } else {
            analysis.text_files += 1;
        }
        if stat.size > current.max_file_size {
            analysis.large_files += 1;
        }
    }
    if analysis.total_files > 0 {
        analysis.average_file_size = analysis.total_bytes / analysis.total_files as u64;
    }

    analysis.recommended = recommend(&analysis, num_cpus::get(), current, options);
    analysis
}

/// Derive limits from the tallies. File-size cap scales with the largest
/// observed file, result cap with the file count, worker count with the file
/// count bounded by the CPU count.
fn recommend(
    analysis: &FolderAnalysis,
    cpu_count: usize,
    current: &SearchConfig,
    options: AnalyzeOptions,
) -> SearchConfig {
    let max_file_size = if analysis.largest_file == 0 {
        DEFAULT_MAX_FILE_SIZE
    } else if analysis.largest_file <= 1 << 20 {
        10 << 20
    } else if analysis.largest_file <= 10 << 20 {
        50 << 20
    } else if analysis.largest_file <= 100 << 20 {
        500 << 20
    } else {
        2 << 30
    };

    let max_results = if analysis.total_files <= 1_000 {
        5_000
    } else if analysis.total_files <= 10_000 {
        15_000
    } else if analysis.total_files <= 50_000 {
        30_000
    } else {
        50_000
    };

    let max_concurrency = if analysis.total_files <= 100 {
        cpu_count.min(10)
    } else if analysis.total_files <= 1_000 {
        (cpu_count * 2).min(25)
    } else {
        (cpu_count * 3).min(100)
    };

    let mut config = SearchConfig {
        max_file_size,
        max_results,
        max_concurrency: max_concurrency.clamp(1, MAX_CONCURRENCY_CEILING),
        case_sensitive: current.case_sensitive,
        auto_configured: true,
    };

    // The planner only raises the memory caps from the adaptive baseline;
    // shrinking below the defaults takes an explicit opt-in.
    if !options.allow_shrink {
        config.max_file_size = config.max_file_size.max(DEFAULT_MAX_FILE_SIZE);
        config.max_results = config.max_results.max(DEFAULT_MAX_RESULTS);
    }

    config
}
