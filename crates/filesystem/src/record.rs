//! Immutable identity snapshot of one file.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use folder_diff_common::{lexical_normalize, to_absolute, to_slash_string, PathError};
use serde::{Deserialize, Serialize};

use crate::fs::FileMetadata;

/// Path, timestamps, size and content hash of a file as observed when it was read.
///
/// Equality covers path, timestamps and size. The hash is the diffing
/// signal but not part of identity equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    path: PathBuf,
    created_us: i64,
    modified_us: i64,
    size: u64,
    hash: String,
}

impl FileRecord {
    /// Create a record. The path is lexically normalized.
    pub fn new(path: impl Into<PathBuf>, metadata: FileMetadata, hash: impl Into<String>) -> Self {
        Self {
            path: lexical_normalize(&path.into()),
            created_us: metadata.created_us,
            modified_us: metadata.modified_us,
            size: metadata.size,
            hash: hash.into(),
        }
    }

    /// Same record with its path lexically normalized.
    ///
    /// Records built by [`FileRecord::new`] already are; deserialized ones
    /// may not be.
    pub fn normalized(mut self) -> Self {
        self.path = lexical_normalize(&self.path);
        self
    }

    /// Same record with a relative path resolved against the current directory.
    ///
    /// # Errors
    /// Returns error if the current directory cannot be determined.
    pub fn into_absolute(mut self) -> Result<Self, PathError> {
        self.path = lexical_normalize(&to_absolute(&self.path)?);
        Ok(self)
    }

    /// Absolute path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path rendered as a slash string.
    pub fn slash_path(&self) -> String {
        to_slash_string(&self.path)
    }

    /// Creation time (microseconds since epoch).
    pub fn created_us(&self) -> i64 {
        self.created_us
    }

    /// Modification time (microseconds since epoch).
    pub fn modified_us(&self) -> i64 {
        self.modified_us
    }

    /// File size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Content hash (32-char lowercase hex).
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Timestamps and size as metadata.
    pub fn metadata(&self) -> FileMetadata {
        FileMetadata {
            created_us: self.created_us,
            modified_us: self.modified_us,
            size: self.size,
        }
    }

    /// Compare which record describes the later version of a file.
    ///
    /// Uses the combined difference of creation and modification times.
    pub fn cmp_version(&self, other: &FileRecord) -> Ordering {
        let delta: i128 = (self.created_us as i128 - other.created_us as i128)
            + (self.modified_us as i128 - other.modified_us as i128);
        delta.cmp(&0)
    }
}

impl PartialEq for FileRecord {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
            && self.created_us == other.created_us
            && self.modified_us == other.modified_us
            && self.size == other.size
    }
}

impl Eq for FileRecord {}

impl Hash for FileRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
        self.created_us.hash(state);
        self.modified_us.hash(state);
        self.size.hash(state);
    }
}
