//! Error types for pattern resolution, collection and hashing.

use folder_diff_common::{OperationCancelled, PathError};
use thiserror::Error;

/// Errors that can occur during file system operations.
#[derive(Debug, Error)]
pub enum FileSystemError {
    /// Pattern string is empty or cannot be compiled into a glob.
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The raw pattern.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Root directory of an include pattern does not exist.
    #[error("Directory not found: {path}")]
    DirectoryNotFound {
        /// The missing directory.
        path: String,
    },

    /// File vanished or could not be opened while it was being read.
    #[error("File unavailable: {path}: {message}")]
    FileUnavailable {
        /// The file that could not be read.
        path: String,
        /// Underlying error message.
        message: String,
    },

    /// Operation cancelled through a cancel token or progress callback.
    #[error("Operation cancelled")]
    Cancelled,

    /// Path normalization failed.
    #[error(transparent)]
    Path(#[from] PathError),
}

impl FileSystemError {
    /// Create an InvalidPattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileUnavailable error from an IO error.
    pub fn unavailable(path: impl Into<String>, err: &std::io::Error) -> Self {
        Self::FileUnavailable {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Check whether this error is a cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FileSystemError::Cancelled)
    }
}

impl From<OperationCancelled> for FileSystemError {
    fn from(_: OperationCancelled) -> Self {
        FileSystemError::Cancelled
    }
}
