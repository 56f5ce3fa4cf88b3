//! Shared progress state: atomic counters written by workers, snapshot reads
//! from any thread.
use parking_lot::Mutex;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Point-in-time copy of the progress state. `current_file` is advisory; the
/// counters are exact. ETA derivation is left to the caller.
#[derive(Debug, Clone, Default)]
pub struct SearchProgress {
    pub total_files: u64,
    pub processed_files: u64,
    pub total_bytes: u64,
    pub processed_bytes: u64,
    pub matches_found: u64,
    pub error_count: u64,
    pub current_file: String,
    pub elapsed: Duration,
    pub cancelled: bool,
}

/// Mutable side of the progress state. One tracker per engine; workers update
/// it through a shared reference while the caller polls `snapshot`.
#[derive(Debug)]
pub struct ProgressTracker {
    total_files: AtomicU64,
    total_bytes: AtomicU64,
    processed_files: AtomicU64,
    processed_bytes: AtomicU64,
    matches_found: AtomicU64,
    error_count: AtomicU64,
    cancelled: AtomicBool,
    current_file: Mutex<String>,
    started: Mutex<Instant>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self {
            total_files: AtomicU64::new(0),
            total_bytes: AtomicU64::new(0),
            processed_files: AtomicU64::new(0),
            processed_bytes: AtomicU64::new(0),
            matches_found: AtomicU64::new(0),
            error_count: AtomicU64::new(0),
            cancelled: AtomicBool::new(false),
            current_file: Mutex::new(String::new()),
            started: Mutex::new(Instant::now()),
        }
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all state for a fresh run.
    pub fn begin_run(&self) {
        self.total_files.store(0, Ordering::Relaxed);
        self.total_bytes.store(0, Ordering::Relaxed);
        self.processed_files.store(0, Ordering::Relaxed);
        self.processed_bytes.store(0, Ordering::Relaxed);
        self.matches_found.store(0, Ordering::Relaxed);
        self.error_count.store(0, Ordering::Relaxed);
        self.cancelled.store(false, Ordering::Relaxed);
        self.current_file.lock().clear();
        *self.started.lock() = Instant::now();
    }

    pub fn set_totals(&self, files: u64, bytes: u64) {
        self.total_files.store(files, Ordering::Relaxed);
        self.total_bytes.store(bytes, Ordering::Relaxed);
    }

    /// Record that a worker picked up a file. The label is the basename, as
    /// a display hint only.
    pub fn file_started(&self, path: &Path) {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        *self.current_file.lock() = name;
    }

    pub fn file_done(&self, bytes: u64) {
        self.processed_files.fetch_add(1, Ordering::Relaxed);
        self.processed_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn add_matches(&self, count: u64) {
        self.matches_found.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_error(&self) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_cancelled(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Copy of the current state. Callable concurrently with a running
    /// search; counters use relaxed loads, which is enough for display.
    pub fn snapshot(&self) -> SearchProgress {
        SearchProgress {
            total_files: self.total_files.load(Ordering::Relaxed),
            processed_files: self.processed_files.load(Ordering::Relaxed),
            total_bytes: self.total_bytes.load(Ordering::Relaxed),
            processed_bytes: self.processed_bytes.load(Ordering::Relaxed),
            matches_found: self.matches_found.load(Ordering::Relaxed),
            error_count: self.error_count.load(Ordering::Relaxed),
            current_file: self.current_file.lock().clone(),
            elapsed: self.started.lock().elapsed(),
            cancelled: self.cancelled.load(Ordering::Acquire),
        }
    }
}
