//! Reconciles a lookup index with the files currently on disk.

use std::path::PathBuf;

use folder_diff_common::{ProgressEvent, ThrottledReporter};
use folder_diff_filesystem::{
    identify_all, FileCollector, FileHandle, FileRecord, FileSystem, SkippedFile,
};

use crate::error::LookupError;
use crate::index::{ContainsState, LookupIndex};

/// What a refresh changed.
#[derive(Debug, Default)]
pub struct RefreshReport {
    /// Files indexed for the first time.
    pub added: Vec<PathBuf>,

    /// Files re-hashed because their timestamps or size changed.
    pub changed: Vec<PathBuf>,

    /// Files dropped because they no longer exist or could not be re-read.
    pub removed: Vec<PathBuf>,

    /// Files whose metadata still matched the index.
    pub unchanged: usize,

    /// Files that could not be hashed.
    pub skipped: Vec<SkippedFile>,
}

impl RefreshReport {
    /// Whether the refresh left the index as it was.
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.removed.is_empty()
    }
}

/// Bring `index` in line with the files `collector` resolves to now.
///
/// Only new files and files whose creation time, modification time or size
/// changed are hashed. Records of files that vanished from disk are removed.
/// A file that fails to hash is skipped; if it was indexed, its record is
/// removed.
///
/// Each add is applied as soon as its file is hashed, and all adds come
/// before the removes. On cancellation the index keeps every add/remove
/// completed so far.
///
/// # Errors
/// Returns `Cancelled` if the reporter observes a cancellation.
pub fn refresh(
    index: &mut LookupIndex,
    collector: &FileCollector,
    reporter: &mut ThrottledReporter<'_, ProgressEvent>,
) -> Result<RefreshReport, LookupError> {
    let fs: &dyn FileSystem = collector.file_system().as_ref();
    let candidates: Vec<FileHandle> = collector.get_files(reporter)?;

    let mut report: RefreshReport = RefreshReport::default();
    let mut to_hash: Vec<FileHandle> = Vec::new();
    for file in candidates {
        match index.contains_metadata(&file) {
            ContainsState::NoMatch => {
                report.added.push(file.path.clone());
                to_hash.push(file);
            }
            ContainsState::Modified => {
                report.changed.push(file.path.clone());
                to_hash.push(file);
            }
            ContainsState::Match => report.unchanged += 1,
        }
    }

    let skipped: Vec<SkippedFile> =
        identify_all(fs, &to_hash, reporter, |record: FileRecord| index.add(record))?;

    let mut removed: Vec<PathBuf> = index
        .get_files()
        .iter()
        .filter(|r: &&FileRecord| !fs.file_exists(r.path()))
        .map(|r: &FileRecord| r.path().to_path_buf())
        .collect();
    for file in &skipped {
        report.added.retain(|p: &PathBuf| p != &file.path);
        report.changed.retain(|p: &PathBuf| p != &file.path);
        if index.get(&file.path).is_some() && !removed.contains(&file.path) {
            removed.push(file.path.clone());
        }
    }

    for path in &removed {
        reporter.check_cancelled()?;
        index.remove_path(path);
    }

    report.removed = removed;
    report.skipped = skipped;

    log::info!(
        "Refresh: {} added, {} changed, {} removed, {} unchanged, {} skipped",
        report.added.len(),
        report.changed.len(),
        report.removed.len(),
        report.unchanged,
        report.skipped.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folder_diff_filesystem::{FileMetadata, FileSystemError, LocalFileSystem};
    use std::io::{Read, Write};
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tempfile::TempDir;

    /// Local disk where some files are listed by a walk but cannot be read,
    /// as if they were locked or deleted right after enumeration.
    struct LockedFileSystem {
        inner: LocalFileSystem,
        locked: Mutex<Vec<PathBuf>>,
    }

    impl LockedFileSystem {
        fn new(root: &Path) -> Self {
            Self {
                inner: LocalFileSystem::with_roots(vec![root.to_path_buf()]),
                locked: Mutex::new(Vec::new()),
            }
        }

        fn lock(&self, path: &Path) {
            self.locked.lock().unwrap().push(path.to_path_buf());
        }

        fn check(&self, path: &Path) -> Result<(), FileSystemError> {
            if self.locked.lock().unwrap().iter().any(|p: &PathBuf| p == path) {
                let err: std::io::Error = std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "file is locked",
                );
                return Err(FileSystemError::unavailable(path.display().to_string(), &err));
            }
            Ok(())
        }
    }

    impl FileSystem for LockedFileSystem {
        fn directory_exists(&self, path: &Path) -> bool {
            self.inner.directory_exists(path)
        }

        fn file_exists(&self, path: &Path) -> bool {
            self.inner.file_exists(path)
        }

        fn roots(&self) -> Vec<PathBuf> {
            self.inner.roots()
        }

        fn walk_files(
            &self,
            root: &Path,
            visit: &mut dyn FnMut(FileHandle) -> Result<(), FileSystemError>,
        ) -> Result<(), FileSystemError> {
            self.inner.walk_files(root, visit)
        }

        fn metadata(&self, path: &Path) -> Result<FileMetadata, FileSystemError> {
            self.check(path)?;
            self.inner.metadata(path)
        }

        fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>, FileSystemError> {
            self.check(path)?;
            self.inner.open_read(path)
        }
    }

    fn write_file(path: &Path, content: &[u8]) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        let mut file: std::fs::File = std::fs::File::create(path).unwrap();
        file.write_all(content).unwrap();
    }

    fn silent() -> ThrottledReporter<'static, ProgressEvent> {
        ThrottledReporter::new(None, Duration::ZERO)
    }

    fn setup(dir: &Path) -> FileCollector {
        write_file(&dir.join("data/a.txt"), b"alpha");
        write_file(&dir.join("data/b.txt"), b"beta");
        let fs: Arc<dyn FileSystem> =
            Arc::new(LocalFileSystem::with_roots(vec![dir.to_path_buf()]));
        let mut collector: FileCollector = FileCollector::new(fs, false);
        collector
            .add_include_folder(&dir.join("data"), &mut silent())
            .unwrap();
        collector
    }

    #[test]
    fn test_refresh_populates_empty_index() {
        let dir: TempDir = TempDir::new().unwrap();
        let collector: FileCollector = setup(dir.path());
        let mut index: LookupIndex = LookupIndex::new(false);

        let report: RefreshReport = refresh(&mut index, &collector, &mut silent()).unwrap();

        assert_eq!(report.added.len(), 2);
        assert!(report.changed.is_empty());
        assert!(report.removed.is_empty());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_refresh_twice_is_noop() {
        let dir: TempDir = TempDir::new().unwrap();
        let collector: FileCollector = setup(dir.path());
        let mut index: LookupIndex = LookupIndex::new(false);
        refresh(&mut index, &collector, &mut silent()).unwrap();
        let before: Vec<FileRecord> = index.get_files();

        let report: RefreshReport = refresh(&mut index, &collector, &mut silent()).unwrap();

        assert!(report.is_noop());
        assert_eq!(report.unchanged, 2);
        assert_eq!(index.get_files(), before);
    }

    #[test]
    fn test_refresh_removes_deleted_file() {
        let dir: TempDir = TempDir::new().unwrap();
        let collector: FileCollector = setup(dir.path());
        let mut index: LookupIndex = LookupIndex::new(false);
        refresh(&mut index, &collector, &mut silent()).unwrap();

        let deleted: PathBuf = dir.path().join("data/a.txt");
        std::fs::remove_file(&deleted).unwrap();
        let report: RefreshReport = refresh(&mut index, &collector, &mut silent()).unwrap();

        assert_eq!(report.removed, vec![deleted.clone()]);
        assert_eq!(index.len(), 1);
        assert!(index.get(&deleted).is_none());
    }

    #[test]
    fn test_refresh_rehashes_changed_file() {
        let dir: TempDir = TempDir::new().unwrap();
        let collector: FileCollector = setup(dir.path());
        let mut index: LookupIndex = LookupIndex::new(false);
        refresh(&mut index, &collector, &mut silent()).unwrap();

        let path: PathBuf = dir.path().join("data/b.txt");
        let old_hash: String = index.get(&path).unwrap().hash().to_string();
        let mut file: std::fs::File = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b" and more").unwrap();
        drop(file);

        let report: RefreshReport = refresh(&mut index, &collector, &mut silent()).unwrap();

        assert_eq!(report.changed, vec![path.clone()]);
        assert_eq!(index.len(), 2);
        assert_ne!(index.get(&path).unwrap().hash(), old_hash);
        assert!(index.files_by_hash(&old_hash).is_empty());
    }

    fn locked_collector(dir: &Path) -> (Arc<LockedFileSystem>, FileCollector) {
        let locked: Arc<LockedFileSystem> = Arc::new(LockedFileSystem::new(dir));
        let fs: Arc<dyn FileSystem> = locked.clone();
        let mut collector: FileCollector = FileCollector::new(fs, false);
        collector
            .add_include_folder(&dir.join("data"), &mut silent())
            .unwrap();
        (locked, collector)
    }

    #[test]
    fn test_changed_file_that_cannot_be_read_is_removed() {
        let dir: TempDir = TempDir::new().unwrap();
        let collector: FileCollector = setup(dir.path());
        let mut index: LookupIndex = LookupIndex::new(false);
        refresh(&mut index, &collector, &mut silent()).unwrap();

        let path: PathBuf = dir.path().join("data/b.txt");
        let mut file: std::fs::File = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b" and more").unwrap();
        drop(file);

        let (locked, locked_view): (Arc<LockedFileSystem>, FileCollector) =
            locked_collector(dir.path());
        locked.lock(&path);
        let report: RefreshReport = refresh(&mut index, &locked_view, &mut silent()).unwrap();

        assert!(report.changed.is_empty());
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].path, path);
        assert!(matches!(
            report.skipped[0].error,
            FileSystemError::FileUnavailable { .. }
        ));
        assert_eq!(report.removed, vec![path.clone()]);
        assert!(index.get(&path).is_none());
        assert_eq!(index.len(), 1);
        assert_eq!(index.hash_count(), 1);
    }

    #[test]
    fn test_new_file_that_cannot_be_read_is_skipped() {
        let dir: TempDir = TempDir::new().unwrap();
        let collector: FileCollector = setup(dir.path());
        let mut index: LookupIndex = LookupIndex::new(false);
        refresh(&mut index, &collector, &mut silent()).unwrap();

        let path: PathBuf = dir.path().join("data/c.txt");
        write_file(&path, b"gamma");
        let (locked, locked_view): (Arc<LockedFileSystem>, FileCollector) =
            locked_collector(dir.path());
        locked.lock(&path);

        let report: RefreshReport = refresh(&mut index, &locked_view, &mut silent()).unwrap();

        assert!(report.added.is_empty());
        assert!(report.removed.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].path, path);
        assert!(report.is_noop());
        assert!(index.get(&path).is_none());
        assert_eq!(index.len(), 2);

        // Once readable again, the next refresh picks it up.
        let report: RefreshReport = refresh(&mut index, &collector, &mut silent()).unwrap();
        assert_eq!(report.added, vec![path]);
        assert_eq!(index.len(), 3);
    }
}
