//! Ingestion error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while ingesting raw data files.
///
/// Per-line parse failures never surface here; parsers log and skip
/// them. These are the per-file and fatal classes.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The configured data root does not exist. This is the one fatal
    /// condition that aborts a run before any file is processed.
    #[error("data root not found: {0}")]
    DataRootMissing(PathBuf),

    /// An error propagated from the core domain layer.
    #[error("database error: {0}")]
    Database(#[from] pitchsync_core::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl IngestError {
    /// Returns `true` when the error aborts the whole run rather than a
    /// single file.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DataRootMissing(_))
    }
}

/// Convenience alias for ingestion results.
pub type IngestResult<T> = std::result::Result<T, IngestError>;
