//! File enumeration: resolve the target set into an ordered list of
//! searchable files plus an aggregate byte count.
use crate::cancel::CancelToken;
use crate::classifier;
use crate::config::SearchConfig;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// One eligible file, as produced by the enumerator.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

/// Enumeration output. `errors` carries per-path failures; none of them are
/// fatal to the run.
#[derive(Debug, Default)]
pub struct Enumeration {
    pub files: Vec<FileEntry>,
    pub total_bytes: u64,
    pub errors: Vec<String>,
}

/// Walk the targets in order and collect every file passing the classifier.
/// File targets are emitted directly; directory targets are walked depth-first
/// in file-name order, so the output is deterministic for a given filesystem
/// snapshot. Symlinks are not followed, which rules out cycle recursion.
pub fn enumerate(targets: &[PathBuf], config: &SearchConfig, cancel: &CancelToken) -> Enumeration {
    let mut out = Enumeration::default();

    for target in targets {
        if cancel.is_cancelled() {
            break;
        }
        let meta = match fs::metadata(target) {
            Ok(meta) => meta,
            Err(_) => {
                out.errors
                    .push(format!("File or folder not found: {}", target.display()));
                continue;
            }
        };
        if meta.is_dir() {
            walk_directory(target, config, cancel, &mut out);
        } else if classifier::is_searchable(target, meta.len(), config.max_file_size) {
            out.total_bytes += meta.len();
            out.files.push(FileEntry {
                path: target.clone(),
                size: meta.len(),
                modified: meta.modified().ok(),
            });
        } else {
            debug!("skipping ineligible target {}", target.display());
        }
    }

    out
}

fn walk_directory(dir: &Path, config: &SearchConfig, cancel: &CancelToken, out: &mut Enumeration) {
    let walker = WalkDir::new(dir).follow_links(false).sort_by_file_name();
    for entry in walker {
        if cancel.is_cancelled() {
            return;
        }
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| dir.display().to_string());
                out.errors.push(format!("unable to access {path}: {err}"));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let meta = match entry.metadata() {
            Ok(meta) => meta,
            Err(err) => {
                out.errors
                    .push(format!("unable to access {}: {err}", entry.path().display()));
                continue;
            }
        };
        if classifier::is_searchable(entry.path(), meta.len(), config.max_file_size) {
            out.total_bytes += meta.len();
            out.files.push(FileEntry {
                path: entry.path().to_path_buf(),
                size: meta.len(),
                modified: meta.modified().ok(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn config() -> SearchConfig {
        SearchConfig::default()
    }

    #[test]
    fn emits_eligible_files_and_byte_total() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "hello\n").unwrap();
        fs::write(dir.path().join("b.txt"), "world!\n").unwrap();

        let result = enumerate(
            &[dir.path().to_path_buf()],
            &config(),
            &CancelToken::new(),
        );
        assert_eq!(result.files.len(), 2);
        assert_eq!(result.total_bytes, 13);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn skips_hidden_and_binary_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden.txt"), "x\n").unwrap();
        fs::write(dir.path().join("image.png"), "x\n").unwrap();
        fs::write(dir.path().join("code.txt"), "x\n").unwrap();

        let result = enumerate(
            &[dir.path().to_path_buf()],
            &config(),
            &CancelToken::new(),
        );
        assert_eq!(result.files.len(), 1);
        assert!(result.files[0].path.ends_with("code.txt"));
    }

    #[test]
    fn missing_target_is_an_error_not_a_failure() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "x\n").unwrap();

        let result = enumerate(
            &[dir.path().join("nope"), dir.path().join("a.txt")],
            &config(),
            &CancelToken::new(),
        );
        assert_eq!(result.files.len(), 1);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("File or folder not found"));
    }

    #[test]
    fn file_target_over_cap_is_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.txt");
        fs::write(&path, vec![b'x'; 4096]).unwrap();

        let mut cfg = config();
        cfg.max_file_size = 2048;
        let result = enumerate(&[path], &cfg, &CancelToken::new());
        assert!(result.files.is_empty());
    }

    #[test]
    fn traversal_order_is_deterministic() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/z.txt"), "z\n").unwrap();
        fs::write(dir.path().join("sub/a.txt"), "a\n").unwrap();
        fs::write(dir.path().join("top.txt"), "t\n").unwrap();

        let first = enumerate(&[dir.path().to_path_buf()], &config(), &CancelToken::new());
        let second = enumerate(&[dir.path().to_path_buf()], &config(), &CancelToken::new());
        let paths: Vec<_> = first.files.iter().map(|f| f.path.clone()).collect();
        let paths_again: Vec<_> = second.files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(paths, paths_again);
    }

    #[test]
    fn cancellation_stops_the_walk() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "x\n").unwrap();

        let cancel = CancelToken::new();
        cancel.cancel();
        let result = enumerate(&[dir.path().to_path_buf()], &config(), &cancel);
        assert!(result.files.is_empty());
    }
}
