use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool opens, queries, or reports on a tabular source.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON serialization of a report fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when a source cannot be opened or is unusable as configured.
    /// Fatal for the run: no partial report is produced.
    #[error("source unavailable: {}: {}", .path.display(), .reason)]
    SourceUnavailable { path: PathBuf, reason: String },

    /// Raised when a single lookup is rejected by an already-open source.
    /// Recorded against the entity being checked; the run continues.
    #[error("query failed: {0}")]
    Query(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
