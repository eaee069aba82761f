//! Error types for Reclaimer operations

use thiserror::Error;

/// Errors surfaced through a [`ReclaimerHandle`](crate::ReclaimerHandle)
///
/// Host and storage failures never show up here: the worker logs them and
/// carries on.
#[derive(Error, Debug)]
pub enum ReclaimerError {
    /// The worker task has shut down
    #[error("Reclaimer worker is not running")]
    Stopped,

    /// Worker error (tokio runtime issues)
    #[error("Worker error: {0}")]
    Worker(String),
}

impl From<tokio::task::JoinError> for ReclaimerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ReclaimerError::Worker(err.to_string())
    }
}
