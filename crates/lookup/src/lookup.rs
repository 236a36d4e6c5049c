//! The file hash lookup: collector and index behind one command surface.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use folder_diff_common::{
    to_absolute, CancelToken, ProgressCallback, ProgressEvent, ThrottledReporter,
};
use folder_diff_filesystem::{
    identify, identify_all, FileCollector, FileHandle, FilePattern, FileRecord, FileSystem,
    FileSystemError, LocalFileSystem, SkippedFile,
};

use crate::diff::{diff, DiffResult};
use crate::error::LookupError;
use crate::index::LookupIndex;
use crate::options::LookupOptions;
use crate::refresh::{refresh, RefreshReport};
use crate::snapshot::LookupSnapshot;

/// Outcome of indexing a batch of files.
#[derive(Debug, Default)]
pub struct AddFilesReport {
    /// Records added to (or replaced in) the index.
    pub added: Vec<FileRecord>,
    /// Files that could not be hashed.
    pub skipped: Vec<SkippedFile>,
}

/// Content-addressable index of the files selected by include/exclude patterns.
///
/// Long-running commands take an optional progress callback. They observe
/// the lookup's [`CancelToken`]; once cancelled, commands fail with
/// [`LookupError::Cancelled`] until the token is reset.
pub struct FileHashLookup {
    collector: FileCollector,
    index: LookupIndex,
    options: LookupOptions,
    cancel: CancelToken,
}

impl FileHashLookup {
    /// Create an empty lookup over `fs`.
    pub fn new(fs: Arc<dyn FileSystem>, options: LookupOptions) -> Self {
        let collector: FileCollector = FileCollector::new(fs, options.case_insensitive)
            .with_exclude_scope(options.exclude_scope);
        Self {
            collector,
            index: LookupIndex::new(options.case_insensitive),
            options,
            cancel: CancelToken::new(),
        }
    }

    /// Create an empty lookup over the local disk.
    pub fn local(options: LookupOptions) -> Self {
        Self::new(Arc::new(LocalFileSystem::new()), options)
    }

    /// Rebuild a lookup from a snapshot without touching the disk.
    ///
    /// # Errors
    /// Returns `InvalidPattern` if a stored pattern does not compile.
    pub fn restore(
        snapshot: LookupSnapshot,
        fs: Arc<dyn FileSystem>,
        options: LookupOptions,
    ) -> Result<Self, LookupError> {
        let mut lookup: FileHashLookup = Self::new(fs, options);
        lookup
            .collector
            .merge_patterns(&snapshot.include_patterns, &snapshot.exclude_patterns)?;
        for record in snapshot.files {
            lookup.index.add(record);
        }
        Ok(lookup)
    }

    /// Options this lookup was created with.
    pub fn options(&self) -> &LookupOptions {
        &self.options
    }

    /// Token that cancels running and future commands of this lookup.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Read-only view of the index.
    pub fn index(&self) -> &LookupIndex {
        &self.index
    }

    /// Include patterns, in registration order.
    pub fn include_patterns(&self) -> Vec<FilePattern> {
        self.collector.include_patterns()
    }

    /// Exclude patterns, in registration order.
    pub fn exclude_patterns(&self) -> Vec<FilePattern> {
        self.collector.exclude_patterns()
    }

    /// Snapshot of all indexed records, sorted by path.
    pub fn files(&self) -> Vec<FileRecord> {
        self.index.get_files()
    }

    /// Snapshot of the records sharing `hash`.
    pub fn files_by_hash(&self, hash: &str) -> Vec<FileRecord> {
        self.index.files_by_hash(hash)
    }

    /// Capture patterns and records for persistence.
    pub fn snapshot(&self) -> LookupSnapshot {
        LookupSnapshot {
            include_patterns: self.include_patterns(),
            exclude_patterns: self.exclude_patterns(),
            files: self.files(),
        }
    }

    /// Include every file below `folder` and index it.
    ///
    /// # Arguments
    /// * `folder` - Directory to include recursively
    /// * `progress` - Optional progress callback
    ///
    /// # Errors
    /// Returns `DirectoryNotFound` if `folder` does not exist, or `Cancelled`.
    /// Unreadable files are reported in [`AddFilesReport::skipped`].
    pub fn include_folder(
        &mut self,
        folder: &Path,
        progress: Option<&dyn ProgressCallback<ProgressEvent>>,
    ) -> Result<AddFilesReport, LookupError> {
        let mut reporter: ThrottledReporter<'_, ProgressEvent> =
            ThrottledReporter::new(progress, self.options.report_interval).with_cancel(&self.cancel);
        let files: Vec<FileHandle> = self.collector.add_include_folder(folder, &mut reporter)?;
        Self::index_files(&mut self.index, &self.collector, &files, &mut reporter)
    }

    /// Include the files matching a glob pattern and index them.
    ///
    /// # Errors
    /// Returns `InvalidPattern`, `DirectoryNotFound` or `Cancelled`.
    pub fn include_pattern(
        &mut self,
        pattern: &str,
        progress: Option<&dyn ProgressCallback<ProgressEvent>>,
    ) -> Result<AddFilesReport, LookupError> {
        let mut reporter: ThrottledReporter<'_, ProgressEvent> =
            ThrottledReporter::new(progress, self.options.report_interval).with_cancel(&self.cancel);
        let files: Vec<FileHandle> = self.collector.add_include_pattern(pattern, &mut reporter)?;
        Self::index_files(&mut self.index, &self.collector, &files, &mut reporter)
    }

    /// Exclude files matching a glob pattern.
    ///
    /// Indexed records matching the pattern are removed right away and the
    /// pattern applies to every later resolution.
    ///
    /// # Returns
    /// The records that were removed.
    ///
    /// # Errors
    /// Returns `InvalidPattern`. Nothing changes on error.
    pub fn exclude_pattern(&mut self, pattern: &str) -> Result<Vec<FileRecord>, LookupError> {
        let parsed: FilePattern = FilePattern::parse(pattern)?.into_absolute()?;
        let paths: Vec<String> = self.index.paths();
        let excluded: Vec<String> = self
            .collector
            .paths_excluded_by(&parsed, &paths)?
            .into_iter()
            .map(str::to_string)
            .collect();

        self.collector.add_exclude(parsed)?;

        let removed: Vec<FileRecord> = excluded
            .iter()
            .filter_map(|path: &String| self.index.remove_path(Path::new(path)))
            .collect();
        log::debug!("Exclude pattern {} removed {} records", pattern, removed.len());
        Ok(removed)
    }

    /// Hash one file and index it. A relative path resolves against the
    /// current directory.
    ///
    /// # Errors
    /// Returns `FileUnavailable` if the file cannot be read.
    pub fn add_file(&mut self, file: &FileHandle) -> Result<FileRecord, LookupError> {
        let path: PathBuf = to_absolute(&file.path).map_err(FileSystemError::from)?;
        let record: FileRecord = identify(self.collector.file_system().as_ref(), &path)?;
        self.index.add(record.clone());
        Ok(record)
    }

    /// Hash a batch of files and index them.
    ///
    /// # Errors
    /// Returns `Cancelled`. Unreadable files are reported in
    /// [`AddFilesReport::skipped`].
    pub fn add_files(
        &mut self,
        files: &[FileHandle],
        progress: Option<&dyn ProgressCallback<ProgressEvent>>,
    ) -> Result<AddFilesReport, LookupError> {
        let mut reporter: ThrottledReporter<'_, ProgressEvent> =
            ThrottledReporter::new(progress, self.options.report_interval).with_cancel(&self.cancel);
        Self::index_files(&mut self.index, &self.collector, files, &mut reporter)
    }

    /// Index a record that was identified elsewhere.
    ///
    /// # Errors
    /// Returns error if the record's path is relative and the current
    /// directory cannot be determined.
    pub fn add_record(&mut self, record: FileRecord) -> Result<(), LookupError> {
        let record: FileRecord = record.into_absolute().map_err(FileSystemError::from)?;
        self.index.add(record);
        Ok(())
    }

    /// Drop the record for `path`.
    pub fn remove_file(&mut self, path: &Path) -> Option<FileRecord> {
        self.index.remove_path(path)
    }

    /// Merge the patterns and records of another lookup into this one.
    ///
    /// # Errors
    /// Returns `InvalidPattern` if a pattern does not compile; nothing changes then.
    pub fn merge_from(&mut self, other: &FileHashLookup) -> Result<(), LookupError> {
        self.collector.merge(&other.collector)?;
        for record in other.index.get_files() {
            self.index.add(record);
        }
        Ok(())
    }

    /// Reconcile the index with the disk.
    ///
    /// # Errors
    /// Returns `Cancelled`; the index keeps the changes applied so far.
    pub fn refresh(
        &mut self,
        progress: Option<&dyn ProgressCallback<ProgressEvent>>,
    ) -> Result<RefreshReport, LookupError> {
        let mut reporter: ThrottledReporter<'_, ProgressEvent> =
            ThrottledReporter::new(progress, self.options.report_interval).with_cancel(&self.cancel);
        refresh(&mut self.index, &self.collector, &mut reporter)
    }

    /// Classify the files of `other` against this lookup.
    ///
    /// # Errors
    /// Returns `Cancelled`.
    pub fn diff_against(
        &self,
        other: &FileHashLookup,
        progress: Option<&dyn ProgressCallback<ProgressEvent>>,
    ) -> Result<DiffResult, LookupError> {
        self.diff_records(&other.files(), progress)
    }

    /// Classify a list of records against this lookup.
    ///
    /// # Errors
    /// Returns `Cancelled`.
    pub fn diff_records(
        &self,
        records: &[FileRecord],
        progress: Option<&dyn ProgressCallback<ProgressEvent>>,
    ) -> Result<DiffResult, LookupError> {
        let mut reporter: ThrottledReporter<'_, ProgressEvent> =
            ThrottledReporter::new(progress, self.options.report_interval).with_cancel(&self.cancel);
        diff(&self.index, records, &mut reporter)
    }

    fn index_files(
        index: &mut LookupIndex,
        collector: &FileCollector,
        files: &[FileHandle],
        reporter: &mut ThrottledReporter<'_, ProgressEvent>,
    ) -> Result<AddFilesReport, LookupError> {
        let mut added: Vec<FileRecord> = Vec::with_capacity(files.len());
        let skipped: Vec<SkippedFile> = identify_all(
            collector.file_system().as_ref(),
            files,
            reporter,
            |record: FileRecord| {
                index.add(record.clone());
                added.push(record);
            },
        )?;

        let report: AddFilesReport = AddFilesReport { added, skipped };

        log::info!(
            "Indexed {} files ({} skipped)",
            report.added.len(),
            report.skipped.len()
        );
        Ok(report)
    }
}
