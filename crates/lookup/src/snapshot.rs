//! Serializable state of a lookup, for external persistence.

use folder_diff_filesystem::{FilePattern, FileRecord};
use serde::{Deserialize, Serialize};

/// Patterns and records of a [`FileHashLookup`](crate::FileHashLookup).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LookupSnapshot {
    /// Include patterns, in registration order.
    pub include_patterns: Vec<FilePattern>,
    /// Exclude patterns, in registration order.
    pub exclude_patterns: Vec<FilePattern>,
    /// Indexed records, sorted by path.
    pub files: Vec<FileRecord>,
}
