use std::path::PathBuf;
use thiserror::Error;

/// Failure of a snapshot commit.
///
/// Every variant leaves the previously committed snapshot readable at the
/// primary path, except `SwapFailed { rolled_back: false }`, where the last
/// good snapshot survives only as the `.bak` file.
#[derive(Error, Debug)]
pub enum CommitError {
    #[error("Failed to encode snapshot: {0}")]
    Encode(String),

    #[error("Failed to write temp snapshot '{path}': {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("Partial write to '{path}': expected {expected} bytes, found {written}")]
    PartialWrite {
        path: PathBuf,
        expected: u64,
        written: u64,
    },

    #[error("Failed to rotate '{path}' into backup: {reason}")]
    BackupFailed { path: PathBuf, reason: String },

    #[error("Failed to swap temp snapshot into '{path}': {reason} (rolled back: {rolled_back})")]
    SwapFailed {
        path: PathBuf,
        reason: String,
        rolled_back: bool,
    },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open '{0}': {1}")]
    OpenFailed(PathBuf, String),

    #[error("Failed to write '{0}': {1}")]
    WriteFailed(PathBuf, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Hour {0} is outside 0..=23")]
    InvalidHour(u8),

    #[error("File '{0}' not found")]
    NotFound(PathBuf),

    #[error("File '{0}' is empty")]
    Empty(PathBuf),

    #[error(transparent)]
    Commit(#[from] CommitError),
}

pub type Result<T> = std::result::Result<T, StoreError>;
