//! Content identity: turning a file handle into a [`FileRecord`].

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use folder_diff_common::{hash_reader, ProgressEvent, ThrottledReporter};

use crate::error::FileSystemError;
use crate::fs::{FileHandle, FileMetadata, FileSystem};
use crate::record::FileRecord;

/// Non-fatal error encountered for one file of a batch.
#[derive(Debug)]
pub struct SkippedFile {
    /// The file that was skipped.
    pub path: PathBuf,
    /// Why it was skipped.
    pub error: FileSystemError,
}

impl SkippedFile {
    /// Create a skipped-file entry.
    pub fn new(path: impl Into<PathBuf>, error: FileSystemError) -> Self {
        Self {
            path: path.into(),
            error,
        }
    }
}

/// Compute the identity record of one file.
///
/// Metadata is read right before the content so the record describes the
/// file as of this read, not as of enumeration.
///
/// # Errors
/// Returns `FileUnavailable` if the file vanished or cannot be read.
pub fn identify(fs: &dyn FileSystem, path: &Path) -> Result<FileRecord, FileSystemError> {
    let metadata: FileMetadata = fs.metadata(path)?;
    let mut reader: Box<dyn Read + Send> = fs.open_read(path)?;
    let (hash, _bytes): (String, u64) = hash_reader(&mut reader)
        .map_err(|e| FileSystemError::unavailable(path.display().to_string(), &e))?;

    Ok(FileRecord::new(path, metadata, hash))
}

/// Identify a batch of files.
///
/// Each record is handed to `on_record` as soon as it is hashed, in input
/// order. Unreadable files are logged and skipped instead of failing the
/// batch.
///
/// # Arguments
/// * `fs` - Filesystem to read from
/// * `files` - Files to hash
/// * `reporter` - Progress and cancellation, ticked once per file
/// * `on_record` - Receives every successfully identified file
///
/// # Returns
/// The files that could not be read.
///
/// # Errors
/// Returns `Cancelled` if the reporter observes a cancellation between files.
/// Records handed to `on_record` before that point stay delivered.
pub fn identify_all<F>(
    fs: &dyn FileSystem,
    files: &[FileHandle],
    reporter: &mut ThrottledReporter<'_, ProgressEvent>,
    mut on_record: F,
) -> Result<Vec<SkippedFile>, FileSystemError>
where
    F: FnMut(FileRecord),
{
    let total_bytes: u64 = files.iter().map(|f: &FileHandle| f.metadata.size).sum();
    let mut bytes_done: u64 = 0;
    let mut skipped: Vec<SkippedFile> = Vec::new();

    for file in files {
        reporter.tick(|elapsed: Duration| {
            ProgressEvent::new("Calculating file hashes", "Hashing")
                .with_item(file.path.display().to_string())
                .with_progress(bytes_done, total_bytes)
                .with_elapsed(elapsed)
        })?;

        match identify(fs, &file.path) {
            Ok(record) => on_record(record),
            Err(e) => {
                log::warn!("Skipping {}: {}", file.path.display(), e);
                skipped.push(SkippedFile::new(file.path.clone(), e));
            }
        }
        bytes_done += file.metadata.size;
    }

    Ok(skipped)
}
