//! Per-path searchability predicate: hidden files, known-binary extensions,
//! and the per-file size cap.
use lazy_static::lazy_static;
use std::collections::HashSet;
use std::path::Path;

lazy_static! {
    static ref BINARY_EXTENSIONS: HashSet<&'static str> = [
        "exe", "bin", "so", "dll", "dylib", "a", "o", "jpg", "jpeg", "png", "gif", "bmp", "ico",
        "mp3", "mp4", "avi", "mov", "wav", "flac", "zip", "tar", "gz", "bz2", "xz", "7z", "pdf",
        "doc", "docx", "xls", "xlsx", "ppt", "pptx",
    ]
    .into_iter()
    .collect();
}

/// Basename starts with a dot.
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Extension is in the known-binary set, case-insensitively. Files with no
/// extension or an unknown extension are treated as text; content is never
/// sniffed.
pub fn is_binary_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| BINARY_EXTENSIONS.contains(ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Whether a regular file should be searched. Directories never reach this
/// predicate; the enumerator only passes non-directories.
pub fn is_searchable(path: &Path, size: u64, max_file_size: u64) -> bool {
    if is_hidden(path) {
        return false;
    }
    if size > max_file_size {
        return false;
    }
    !is_binary_extension(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn hidden_files_are_skipped() {
        assert!(is_hidden(Path::new("/tmp/.hidden.txt")));
        assert!(!is_hidden(Path::new("/tmp/visible.txt")));
        assert!(!is_searchable(Path::new("/tmp/.env"), 10, 1 << 20));
    }

    #[test]
    fn binary_extensions_are_skipped_case_insensitively() {
        assert!(is_binary_extension(Path::new("a.png")));
        assert!(is_binary_extension(Path::new("a.PNG")));
        assert!(is_binary_extension(Path::new("archive.tar")));
        assert!(!is_binary_extension(Path::new("main.rs")));
        assert!(!is_searchable(Path::new("photo.JPEG"), 10, 1 << 20));
    }

    #[test]
    fn unknown_extensions_are_text_by_default() {
        assert!(is_searchable(Path::new("data.weird"), 10, 1 << 20));
        assert!(is_searchable(Path::new("Makefile"), 10, 1 << 20));
    }

    #[test]
    fn size_cap_is_enforced() {
        let path = PathBuf::from("big.log");
        assert!(is_searchable(&path, 1024, 1024));
        assert!(!is_searchable(&path, 1025, 1024));
    }
}
