//! Media store error types.

use thiserror::Error;

/// Errors that can occur while persisting attachment bytes.
#[derive(Debug, Error)]
pub enum MediaStoreError {
    /// Filesystem error while writing the object.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The destination path escapes the storage root.
    #[error("invalid destination path: {0}")]
    InvalidPath(String),
}

/// Result type for media store operations.
pub type Result<T> = std::result::Result<T, MediaStoreError>;
