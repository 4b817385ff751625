//! Error types for Burdock Core

use thiserror::Error;

/// Result type alias using Burdock's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Burdock error types
///
/// These are collaborator-level failures that abort a call. Per-record
/// validation failures are reported as conflicts in import summaries and
/// never surface here.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
