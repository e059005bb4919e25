use clap::Parser;
use std::path::PathBuf;

use crate::sorting::RunConfig;

/// Command-line arguments for dcmsort
#[derive(Parser, Debug)]
#[command(name = "dcmsort")]
#[command(about = "Sort a directory of DICOM files into project/session folders")]
#[command(version)]
pub struct Cli {
    /// Directory to scan (immediate children only)
    #[arg(long, value_name = "PATH")]
    pub base_dir: PathBuf,

    /// Create directories and move files; without this flag nothing on disk
    /// changes
    #[arg(long)]
    pub do_sort: bool,

    /// Prompt before each move
    #[arg(long)]
    pub confirm: bool,

    /// Mode bits for newly created directories, as a decimal integer
    /// (504 = octal 770; 0 disables)
    #[arg(long, default_value_t = 504)]
    pub chmod: u32,

    /// Group ownership for newly created directories
    #[arg(long, value_name = "GROUP")]
    pub chgrp: Option<String>,

    /// Build destination filenames from header tags instead of keeping the
    /// original name
    #[arg(long)]
    pub rename: bool,

    /// Write log output to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Roll the log file when it would exceed this size (0 = never)
    #[arg(long, default_value_t = 0)]
    pub log_max_bytes: u64,

    /// Number of rolled log files to keep (0 = truncate in place)
    #[arg(long, default_value_t = 0)]
    pub log_backup_count: u32,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Builds the run configuration for the sorting pass
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            base_dir: self.base_dir.clone(),
            do_sort: self.do_sort,
            confirm: self.confirm,
            rename: self.rename,
            chmod: self.chmod,
            chgrp: self.chgrp.clone(),
        }
    }
}
