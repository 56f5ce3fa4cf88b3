//! Per-file line matching: stream lines, apply the regex, emit one record
//! per non-overlapping match span.
use crate::cancel::CancelToken;
use crate::error::Result;
use crate::walker::FileEntry;
use memmap2::Mmap;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::time::SystemTime;

/// Line buffer start size. `read_until` grows past this, so lines longer
/// than 64 KiB come through whole and numbering stays physical.
const LINE_BUFFER_SIZE: usize = 64 << 10;

/// Files above this are memory-mapped instead of read through a buffer.
pub const MMAP_THRESHOLD: u64 = 16 << 20;

/// Maximum edit distance for a line to count as a suggestion.
const SUGGESTION_DISTANCE: usize = 3;

/// One regex hit on one line of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub path: PathBuf,
    /// 1-based physical line number.
    pub line_number: usize,
    /// Line content, verbatim, without the trailing newline.
    pub line: String,
    /// Byte offset of the match start within `line`.
    pub match_start: usize,
    /// Byte offset one past the match end. Always > `match_start`.
    pub match_end: usize,
    pub file_size: u64,
    pub modified: Option<SystemTime>,
}

/// Everything the matcher learned about one file.
#[derive(Debug, Default)]
pub struct FileMatches {
    pub records: Vec<MatchRecord>,
    /// Bytes accounted for: the full file size on completion, the observed
    /// count if cancelled mid-file.
    pub bytes: u64,
    /// Near-miss lines, only populated for files with zero matches.
    pub suggestions: Vec<String>,
}

/// Search one file line by line. Cancellation is checked between lines; on
/// cancel the records accumulated so far are returned with the byte count
/// observed up to that point.
pub fn search_file(
    regex: &Regex,
    entry: &FileEntry,
    pattern: &str,
    want_suggestions: bool,
    cancel: &CancelToken,
) -> Result<FileMatches> {
    let file = File::open(&entry.path)?;
    let pattern_lower = pattern.to_lowercase();

    let mut state = ScanState {
        regex,
        entry,
        want_suggestions,
        pattern_lower: &pattern_lower,
        records: Vec::new(),
        suggestions: Vec::new(),
    };

    let bytes = if entry.size > MMAP_THRESHOLD {
        scan_mapped(&file, &mut state, cancel)?
    } else {
        scan_buffered(file, &mut state, cancel)?
    };

    // Suggestions are a zero-match fallback only.
    let suggestions = if state.records.is_empty() {
        state.suggestions
    } else {
        Vec::new()
    };

    Ok(FileMatches {
        records: state.records,
        bytes,
        suggestions,
    })
}

struct ScanState<'a> {
    regex: &'a Regex,
    entry: &'a FileEntry,
    want_suggestions: bool,
    pattern_lower: &'a str,
    records: Vec<MatchRecord>,
    suggestions: Vec<String>,
}

impl ScanState<'_> {
    fn scan_line(&mut self, raw: &[u8], line_number: usize) {
        let line = String::from_utf8_lossy(raw);
        let mut matched = false;
        // Zero-width matches (an empty pattern, a bare anchor) carry no
        // span and are not recorded.
        for m in self.regex.find_iter(&line).filter(|m| m.start() < m.end()) {
            matched = true;
            self.records.push(MatchRecord {
                path: self.entry.path.clone(),
                line_number,
                line: line.clone().into_owned(),
                match_start: m.start(),
                match_end: m.end(),
                file_size: self.entry.size,
                modified: self.entry.modified,
            });
        }

        if !matched && self.want_suggestions && self.records.is_empty() {
            let line_len = line.chars().count();
            let pattern_len = self.pattern_lower.chars().count();
            if line_len.abs_diff(pattern_len) <= SUGGESTION_DISTANCE
                && levenshtein(&line.to_lowercase(), self.pattern_lower) <= SUGGESTION_DISTANCE
            {
                self.suggestions.push(line.into_owned());
            }
        }
    }
}

fn scan_buffered(file: File, state: &mut ScanState<'_>, cancel: &CancelToken) -> Result<u64> {
    let mut reader = BufReader::with_capacity(LINE_BUFFER_SIZE, file);
    let mut raw: Vec<u8> = Vec::with_capacity(256);
    let mut line_number = 0usize;
    let mut bytes_read = 0u64;

    loop {
        if cancel.is_cancelled() {
            return Ok(bytes_read);
        }
        raw.clear();
        let n = reader.read_until(b'\n', &mut raw)?;
        if n == 0 {
            break;
        }
        bytes_read += n as u64;
        line_number += 1;
        state.scan_line(trim_line_ending(&raw), line_number);
    }

    Ok(state.entry.size)
}

fn scan_mapped(file: &File, state: &mut ScanState<'_>, cancel: &CancelToken) -> Result<u64> {
    let mmap = unsafe { Mmap::map(file)? };
    let data: &[u8] = &mmap;
    let mut pos = 0usize;
    let mut line_number = 0usize;

    while pos < data.len() {
        if cancel.is_cancelled() {
            return Ok(pos as u64);
        }
        let end = memchr::memchr(b'\n', &data[pos..])
            .map(|i| pos + i)
            .unwrap_or(data.len());
        line_number += 1;
        state.scan_line(trim_line_ending(&data[pos..end]), line_number);
        pos = end + 1;
    }

    Ok(state.entry.size)
}

fn trim_line_ending(raw: &[u8]) -> &[u8] {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    raw.strip_suffix(b"\r").unwrap_or(raw)
}

/// Whether the pattern is a plain literal. The suggestion heuristic compares
/// lines against the raw pattern text, which is meaningless for a real regex,
/// so it only runs for literals.
pub(crate) fn is_literal_pattern(pattern: &str) -> bool {
    !pattern
        .chars()
        .any(|c| matches!(c, '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$'))
}

/// Classic edit-distance DP over characters.
pub(crate) fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    let mut matrix = vec![vec![0usize; b_len + 1]; a_len + 1];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=b_len {
        matrix[0][j] = j;
    }

    for i in 1..=a_len {
        for j in 1..=b_len {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }

    matrix[a_len][b_len]
}
