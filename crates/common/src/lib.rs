//! Shared types and utilities for folder-diff.
//!
//! This crate provides common functionality used across all folder-diff crates:
//! - Path normalization utilities
//! - Hash computation functions
//! - Progress callbacks, throttling and cancellation
//! - Shared constants and error types

pub mod constants;
pub mod error;
pub mod hash;
pub mod path_utils;
pub mod progress;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{OperationCancelled, PathError};
pub use hash::{hash_bytes, hash_file, hash_reader, Xxh3Hasher};
pub use path_utils::{
    fold_case, lexical_normalize, normalize_separators, path_key, strip_root, to_absolute,
    to_slash_string, with_trailing_separator,
};
pub use progress::{
    progress_fn, CancelToken, FnProgress, NoOpProgress, ProgressCallback, ProgressEvent,
    ThrottledReporter,
};
