use std::fmt;
use std::path::PathBuf;

/// Destination paths computed for one source file
///
/// The destination is always `base_dir/PROJECT/SESSION/basename`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Top-level grouping directory derived from StudyDescription
    pub project_dir: PathBuf,

    /// Second-level grouping directory derived from PatientID/StudyInstanceUID
    pub session_dir: PathBuf,

    /// Full destination path for the file
    pub dest_file: PathBuf,
}

/// Outcome of the placement engine for one source file
///
/// One decision is produced per source file per run; decisions are derived
/// and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementDecision {
    /// File parses and the destination path is free
    Move(Placement),

    /// Destination exists with identical content; already placed or a
    /// verified duplicate
    SkipIdentical(Placement),

    /// Destination exists with different content; never overwritten
    SkipConflict(Placement),

    /// Not a readable DICOM file
    SkipUnparseable,

    /// A destination name could not be derived
    SkipError(String),
}

impl PlacementDecision {
    /// Returns the computed placement, if the file was parseable and namable
    pub fn placement(&self) -> Option<&Placement> {
        match self {
            Self::Move(p) | Self::SkipIdentical(p) | Self::SkipConflict(p) => Some(p),
            Self::SkipUnparseable | Self::SkipError(_) => None,
        }
    }

    /// Checks if this decision calls for a move
    pub fn is_move(&self) -> bool {
        matches!(self, Self::Move(_))
    }
}

impl fmt::Display for PlacementDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move(_) => write!(f, "MOVE"),
            Self::SkipIdentical(_) => write!(f, "SKIP-IDENTICAL"),
            Self::SkipConflict(_) => write!(f, "SKIP-CONFLICT"),
            Self::SkipUnparseable => write!(f, "SKIP-UNPARSEABLE"),
            Self::SkipError(_) => write!(f, "SKIP-ERROR"),
        }
    }
}
