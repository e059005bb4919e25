use clap::Parser;
use log::error;
use std::process;

use dcmsort_core::cli::Cli;
use dcmsort_core::{logging, run};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(
        cli.verbose,
        cli.log_file.as_deref(),
        cli.log_max_bytes,
        cli.log_backup_count,
    ) {
        eprintln!("Error: failed to set up logging: {}", e);
        process::exit(1);
    }

    // Per-file problems are recovered inside the run; an error here means
    // the whole pass could not start
    if let Err(e) = run(&cli.run_config()) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
