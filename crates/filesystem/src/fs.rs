//! Filesystem capability consumed by the collector and the identity step.
//!
//! [`FileSystem`] is the seam between pattern resolution and the real disk.
//! [`LocalFileSystem`] implements it with `walkdir` and `std::fs`.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use folder_diff_common::to_slash_string;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::FileSystemError;

/// Timestamps and size of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Creation time (microseconds since epoch). Falls back to the
    /// modification time on filesystems without birth time.
    pub created_us: i64,
    /// Modification time (microseconds since epoch).
    pub modified_us: i64,
    /// File size in bytes.
    pub size: u64,
}

impl FileMetadata {
    /// Extract the fields from `std::fs::Metadata`.
    pub fn from_std(meta: &std::fs::Metadata) -> Self {
        let modified: SystemTime = meta.modified().unwrap_or(UNIX_EPOCH);
        let created: SystemTime = meta.created().unwrap_or(modified);
        Self {
            created_us: system_time_to_micros(created),
            modified_us: system_time_to_micros(modified),
            size: meta.len(),
        }
    }
}

/// A file found on disk together with the metadata observed at that moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    /// Absolute path to the file.
    pub path: PathBuf,
    /// Metadata captured when the file was enumerated.
    pub metadata: FileMetadata,
}

impl FileHandle {
    /// Create a handle.
    pub fn new(path: impl Into<PathBuf>, metadata: FileMetadata) -> Self {
        Self {
            path: path.into(),
            metadata,
        }
    }

    /// Path rendered as a slash string.
    pub fn slash_path(&self) -> String {
        to_slash_string(&self.path)
    }
}

/// Abstract filesystem used by the collector and content identity.
pub trait FileSystem: Send + Sync {
    /// Check whether `path` is an existing directory.
    fn directory_exists(&self, path: &Path) -> bool;

    /// Check whether `path` is an existing regular file.
    fn file_exists(&self, path: &Path) -> bool;

    /// Roots searched by patterns that have no root of their own.
    fn roots(&self) -> Vec<PathBuf>;

    /// Enumerate every regular file below `root`, recursively.
    ///
    /// `visit` is called once per file; an error returned from it stops the
    /// walk and is propagated.
    fn walk_files(
        &self,
        root: &Path,
        visit: &mut dyn FnMut(FileHandle) -> Result<(), FileSystemError>,
    ) -> Result<(), FileSystemError>;

    /// Read current metadata of a file.
    fn metadata(&self, path: &Path) -> Result<FileMetadata, FileSystemError>;

    /// Open a file for sequential reading.
    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>, FileSystemError>;
}

/// [`FileSystem`] backed by the local disk.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystem {
    /// Explicit roots for root-less patterns; `None` = platform roots.
    roots: Option<Vec<PathBuf>>,
}

impl LocalFileSystem {
    /// Create a filesystem that searches the platform roots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a filesystem whose root-less patterns search only `roots`.
    ///
    /// # Arguments
    /// * `roots` - Directories standing in for drives/mount roots
    pub fn with_roots(roots: Vec<PathBuf>) -> Self {
        Self { roots: Some(roots) }
    }
}

impl FileSystem for LocalFileSystem {
    fn directory_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn roots(&self) -> Vec<PathBuf> {
        match &self.roots {
            Some(roots) => roots.clone(),
            None => platform_roots(),
        }
    }

    fn walk_files(
        &self,
        root: &Path,
        visit: &mut dyn FnMut(FileHandle) -> Result<(), FileSystemError>,
    ) -> Result<(), FileSystemError> {
        for entry in WalkDir::new(root).follow_links(false).into_iter() {
            let entry: walkdir::DirEntry = match entry {
                Ok(e) => e,
                Err(e) => {
                    log::warn!(
                        "Skipping unreadable entry {}: {}",
                        e.path().map(|p| p.display().to_string()).unwrap_or_default(),
                        e
                    );
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let metadata: FileMetadata = match entry.metadata() {
                Ok(meta) => FileMetadata::from_std(&meta),
                Err(e) => {
                    log::warn!("Skipping {}: {}", entry.path().display(), e);
                    continue;
                }
            };

            visit(FileHandle::new(entry.into_path(), metadata))?;
        }

        Ok(())
    }

    fn metadata(&self, path: &Path) -> Result<FileMetadata, FileSystemError> {
        let meta: std::fs::Metadata = std::fs::metadata(path)
            .map_err(|e| FileSystemError::unavailable(path.display().to_string(), &e))?;
        if !meta.is_file() {
            return Err(FileSystemError::FileUnavailable {
                path: path.display().to_string(),
                message: "not a regular file".to_string(),
            });
        }
        Ok(FileMetadata::from_std(&meta))
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>, FileSystemError> {
        let file: std::fs::File = std::fs::File::open(path)
            .map_err(|e| FileSystemError::unavailable(path.display().to_string(), &e))?;
        Ok(Box::new(file))
    }
}

/// Convert a `SystemTime` to microseconds since the Unix epoch.
pub fn system_time_to_micros(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_micros() as i64,
        Err(e) => -(e.duration().as_micros() as i64),
    }
}

#[cfg(windows)]
fn platform_roots() -> Vec<PathBuf> {
    (b'A'..=b'Z')
        .map(|letter: u8| PathBuf::from(format!("{}:\\", letter as char)))
        .filter(|root: &PathBuf| root.is_dir())
        .collect()
}

#[cfg(not(windows))]
fn platform_roots() -> Vec<PathBuf> {
    vec![PathBuf::from("/")]
}
