//! Shared error types used across folder-diff crates.

use thiserror::Error;

/// Path-related errors shared across crates.
#[derive(Debug, Error, Clone)]
pub enum PathError {
    /// IO error occurred while accessing path.
    #[error("IO error at {path}: {message}")]
    IoError {
        /// Path where error occurred.
        path: String,
        /// Error message.
        message: String,
    },
}

impl PathError {
    /// Create an IoError from std::io::Error.
    ///
    /// # Arguments
    /// * `path` - Path where the error occurred
    /// * `err` - The underlying IO error
    pub fn from_io(path: impl Into<String>, err: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Raised when a long-running operation observes a cancellation request,
/// either through a [`CancelToken`](crate::progress::CancelToken) or a
/// progress callback returning `false`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Default)]
#[error("Operation cancelled")]
pub struct OperationCancelled;
