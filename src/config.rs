use crate::error::{Result, ZxgrepError};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default per-file size cap: 100 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 << 20;
/// Default number of retained match records.
pub const DEFAULT_MAX_RESULTS: usize = 10_000;
/// Default number of concurrent file workers.
pub const DEFAULT_MAX_CONCURRENCY: usize = 50;

/// Hard ceiling on worker count, whatever the planner or caller asks for.
pub const MAX_CONCURRENCY_CEILING: usize = 128;
/// Floor on the per-file size cap.
pub const MIN_FILE_SIZE_CAP: u64 = 1024;

/// Effective configuration for one search run. Immutable once a request is
/// built; the interactive layer owns any mutation between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Files larger than this many bytes are skipped.
    pub max_file_size: u64,
    /// Maximum match records retained before the run truncates.
    pub max_results: usize,
    /// Number of concurrent file workers.
    pub max_concurrency: usize,
    pub case_sensitive: bool,
    /// When set, the coordinator runs the folder analyzer and adopts its
    /// recommendation before dispatch.
    pub auto_configured: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_results: DEFAULT_MAX_RESULTS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            case_sensitive: true,
            auto_configured: false,
        }
    }
}

impl SearchConfig {
    /// Check the configuration invariants: strictly positive limits, a sane
    /// concurrency ceiling, and a file-size cap of at least 1 KiB.
    pub fn validate(&self) -> Result<()> {
        if self.max_file_size < MIN_FILE_SIZE_CAP {
            return Err(ZxgrepError::Config(format!(
                "max file size must be at least {MIN_FILE_SIZE_CAP} bytes, got {}",
                self.max_file_size
            )));
        }
        if self.max_results == 0 {
            return Err(ZxgrepError::Config(
                "max results must be positive".to_string(),
            ));
        }
        if self.max_concurrency == 0 {
            return Err(ZxgrepError::Config(
                "max concurrency must be positive".to_string(),
            ));
        }
        if self.max_concurrency > MAX_CONCURRENCY_CEILING {
            return Err(ZxgrepError::Config(format!(
                "max concurrency {} exceeds ceiling {MAX_CONCURRENCY_CEILING}",
                self.max_concurrency
            )));
        }
        Ok(())
    }

    /// Defaults overlaid with whatever an on-disk config file provides.
    pub fn from_file_config(file: &FileConfig) -> Self {
        let mut config = Self::default();
        if let Some(mb) = file.limits.max_file_size_mb {
            config.max_file_size = mb << 20;
        }
        if let Some(max_results) = file.limits.max_results {
            config.max_results = max_results;
        }
        if let Some(max_concurrency) = file.limits.max_concurrency {
            config.max_concurrency = max_concurrency;
        }
        if let Some(case_sensitive) = file.search.case_sensitive {
            config.case_sensitive = case_sensitive;
        }
        config
    }
}

/// On-disk configuration. All fields optional; anything absent falls back to
/// the compiled-in defaults.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub limits: LimitsSection,
    pub search: SearchSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsSection {
    pub max_file_size_mb: Option<u64>,
    pub max_results: Option<usize>,
    pub max_concurrency: Option<usize>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    pub case_sensitive: Option<bool>,
}

impl FileConfig {
    pub fn load() -> anyhow::Result<Self> {
        if let Some(path) = Self::find_config_path() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&content).with_context(|| "Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    fn find_config_path() -> Option<PathBuf> {
        if let Some(xdg_config) = dirs::config_dir() {
            let xdg_path = xdg_config.join("zxgrep/config.toml");
            if xdg_path.exists() {
                return Some(xdg_path);
            }
        }

        if let Some(home) = dirs::home_dir() {
            let home_path = home.join(".zxgrep.toml");
            if home_path.exists() {
                return Some(home_path);
            }
        }

        let current_path = Path::new(".zxgrep.toml");
        if current_path.exists() {
            return Some(current_path.to_path_buf());
        }

        None
    }
}
