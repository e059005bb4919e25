use std::fs;
use std::path::PathBuf;

use chrono::Local;
use log::{error, info, warn};

use crate::error::{DcmsortError, Result};
use crate::sorting::apply::{self, ApplyConfig};
use crate::sorting::decision::PlacementDecision;
use crate::sorting::engine::{decide_file, SortConfig};

/// Configuration for one sorting pass
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory whose immediate file entries are scanned
    pub base_dir: PathBuf,

    /// Apply decisions to disk; without it the run is a dry run
    pub do_sort: bool,

    /// Prompt on stdin before each move
    pub confirm: bool,

    /// Synthesize destination basenames from header tags
    pub rename: bool,

    /// Mode bits for newly created directories; 0 disables
    pub chmod: u32,

    /// Group name applied to newly created directories
    pub chgrp: Option<String>,
}

/// Per-action tallies for one pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// MOVE decisions (applied when sorting, counted only when dry)
    pub moved: usize,
    /// Destination already held identical content
    pub identical: usize,
    /// Destination held different content; left alone
    pub conflicts: usize,
    /// Entries that were not readable DICOM
    pub unparseable: usize,
    /// Files skipped because no destination name could be derived
    pub errors: usize,
    /// MOVE decisions whose rename failed
    pub move_failures: usize,
}

/// Runs one sequential sorting pass over the base directory
///
/// Scans immediate children only. Every per-file failure is recovered
/// locally; the run aborts only when the base directory itself is missing
/// or the requested group does not exist.
///
/// The session fallback timestamp is captured once here, so every
/// unidentifiable file in the run lands in the same session bucket.
pub fn run(config: &RunConfig) -> Result<RunSummary> {
    if !config.base_dir.exists() {
        return Err(DcmsortError::DirectoryNotFound(config.base_dir.clone()));
    }

    #[cfg(unix)]
    let group = match config.chgrp.as_deref() {
        Some(name) => Some(apply::resolve_group(name)?),
        None => None,
    };
    #[cfg(not(unix))]
    let group: Option<u32> = None;

    let sort_config = SortConfig {
        base_dir: config.base_dir.clone(),
        rename: config.rename,
        fallback_session: Local::now()
            .naive_local()
            .format("%Y-%m-%dT%H:%M:%S%.6f")
            .to_string(),
    };
    let apply_config = ApplyConfig {
        confirm: config.confirm,
        chmod: config.chmod,
        group,
    };

    let mut summary = RunSummary::default();
    for entry in fs::read_dir(&config.base_dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("unreadable directory entry: {}", e);
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let decision = decide_file(&path, &sort_config);
        if let Some(placement) = decision.placement() {
            info!("source file {}", path.display());
            info!("destination file {}", placement.dest_file.display());
        }

        match decision {
            PlacementDecision::SkipUnparseable => summary.unparseable += 1,
            PlacementDecision::SkipError(_) => summary.errors += 1,
            PlacementDecision::SkipIdentical(_) => summary.identical += 1,
            PlacementDecision::SkipConflict(_) => summary.conflicts += 1,
            PlacementDecision::Move(placement) => {
                if config.do_sort {
                    let moved = apply::ensure_dirs(&placement, &apply_config).and_then(|()| {
                        apply::move_file(&path, &placement.dest_file, &apply_config)
                    });
                    match moved {
                        Ok(()) => summary.moved += 1,
                        Err(e) => {
                            error!("failed to move {}: {}", path.display(), e);
                            summary.move_failures += 1;
                        }
                    }
                } else {
                    summary.moved += 1;
                }
            }
        }
    }

    info!(
        "moved {} files ({} identical, {} conflicts, {} unparseable, {} errors, {} move failures)",
        summary.moved,
        summary.identical,
        summary.conflicts,
        summary.unparseable,
        summary.errors,
        summary.move_failures
    );
    Ok(summary)
}
