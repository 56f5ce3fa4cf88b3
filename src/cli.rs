use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Regular expression to search for
    pub pattern: String,

    /// Files and directories to search
    #[arg(default_value = ".")]
    pub targets: Vec<PathBuf>,

    /// Case-insensitive matching
    #[arg(long, short = 'i')]
    pub ignore_case: bool,

    /// Derive limits from the target set before searching
    #[arg(long)]
    pub auto: bool,

    /// Per-file size cap in MiB
    #[arg(long, value_name = "MIB")]
    pub max_size: Option<u64>,

    /// Maximum number of match records to keep
    #[arg(long, value_name = "N")]
    pub max_results: Option<usize>,

    /// Number of concurrent file workers
    #[arg(long, short = 'j', value_name = "N")]
    pub jobs: Option<usize>,

    /// Print folder statistics instead of searching
    #[arg(long)]
    pub analyze: bool,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log: Option<PathBuf>,
}
