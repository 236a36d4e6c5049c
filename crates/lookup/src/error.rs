//! Lookup error types.

use folder_diff_common::OperationCancelled;
use folder_diff_filesystem::FileSystemError;
use thiserror::Error;

/// Errors that can occur during lookup operations.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Operation cancelled through the cancel token or a progress callback.
    #[error("Operation cancelled")]
    Cancelled,

    /// Pattern, collection or hashing error.
    #[error(transparent)]
    FileSystem(FileSystemError),
}

impl LookupError {
    /// Check whether this error is a cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LookupError::Cancelled)
    }
}

impl From<FileSystemError> for LookupError {
    fn from(err: FileSystemError) -> Self {
        match err {
            FileSystemError::Cancelled => LookupError::Cancelled,
            other => LookupError::FileSystem(other),
        }
    }
}

impl From<OperationCancelled> for LookupError {
    fn from(_: OperationCancelled) -> Self {
        LookupError::Cancelled
    }
}
