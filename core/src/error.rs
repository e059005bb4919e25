use std::path::PathBuf;
use thiserror::Error;

/// Result type for dcmsort operations
pub type Result<T> = std::result::Result<T, DcmsortError>;

/// Error types for dcmsort operations
#[derive(Error, Debug)]
pub enum DcmsortError {
    /// Base directory does not exist; the only per-run fatal error
    #[error("directory does not exist: {0}")]
    DirectoryNotFound(PathBuf),

    /// File could not be read as DICOM
    #[error("not a readable DICOM file: {0}")]
    ParseFailure(String),

    /// Rename mode could not synthesize a destination name
    #[error("missing SOPInstanceUID: {0}")]
    MissingIdentifier(String),

    /// The group named by --chgrp does not exist on this system
    #[error("unknown group: {0}")]
    UnknownGroup(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// Convert dicom-object errors
impl From<dicom_object::ReadError> for DcmsortError {
    fn from(e: dicom_object::ReadError) -> Self {
        DcmsortError::ParseFailure(format!("{}", e))
    }
}
