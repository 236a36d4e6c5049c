//! Diff of a record list against a lookup index.

use std::time::Duration;

use folder_diff_common::{ProgressEvent, ThrottledReporter};
use folder_diff_filesystem::FileRecord;

use crate::error::LookupError;
use crate::index::{ContainsState, LookupIndex};

/// Result of comparing files against an index.
///
/// `matches` and `differences` partition the compared list.
#[derive(Debug, Clone, Default)]
pub struct DiffResult {
    /// Files indexed with the same creation time, size and hash.
    pub matches: Vec<FileRecord>,

    /// Files that are new or modified relative to the index.
    pub differences: Vec<FileRecord>,
}

impl DiffResult {
    /// Total number of compared files.
    pub fn len(&self) -> usize {
        self.matches.len() + self.differences.len()
    }

    /// Whether no files were compared.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty() && self.differences.is_empty()
    }

    /// Convert both sides into standalone indexes without any patterns.
    ///
    /// # Returns
    /// `(matches, differences)` as indexes.
    pub fn into_indexes(self, case_insensitive: bool) -> (LookupIndex, LookupIndex) {
        (
            LookupIndex::from_records(self.matches, case_insensitive),
            LookupIndex::from_records(self.differences, case_insensitive),
        )
    }
}

/// Classify every record of `other` against `mine`.
///
/// # Arguments
/// * `mine` - Index to compare against
/// * `other` - Records to classify
/// * `reporter` - Progress and cancellation
///
/// # Errors
/// Returns `Cancelled` if the reporter observes a cancellation.
pub fn diff(
    mine: &LookupIndex,
    other: &[FileRecord],
    reporter: &mut ThrottledReporter<'_, ProgressEvent>,
) -> Result<DiffResult, LookupError> {
    let total: u64 = other.len() as u64;
    let mut result: DiffResult = DiffResult::default();

    for (i, record) in other.iter().enumerate() {
        reporter.tick(|elapsed: Duration| {
            ProgressEvent::new("Comparing files", "Diffing")
                .with_item(record.path().display().to_string())
                .with_progress(i as u64, total)
                .with_elapsed(elapsed)
        })?;

        match mine.contains(record) {
            ContainsState::Match => result.matches.push(record.clone()),
            ContainsState::Modified | ContainsState::NoMatch => {
                result.differences.push(record.clone())
            }
        }
    }

    log::debug!(
        "Diff: {} matches, {} differences",
        result.matches.len(),
        result.differences.len()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folder_diff_common::CancelToken;
    use folder_diff_filesystem::FileMetadata;

    fn record(path: &str, created_us: i64, size: u64, hash: &str) -> FileRecord {
        FileRecord::new(
            path,
            FileMetadata {
                created_us,
                modified_us: created_us,
                size,
            },
            hash,
        )
    }

    fn silent() -> ThrottledReporter<'static, ProgressEvent> {
        ThrottledReporter::new(None, Duration::ZERO)
    }

    #[test]
    fn test_diff_classifies_each_record() {
        let mine: LookupIndex = LookupIndex::from_records(
            vec![record("/a", 1, 1, "ha"), record("/b", 1, 1, "hb")],
            false,
        );
        let other: Vec<FileRecord> = vec![
            record("/a", 1, 1, "ha"),
            record("/b", 1, 1, "changed"),
            record("/c", 1, 1, "hc"),
        ];

        let result: DiffResult = diff(&mine, &other, &mut silent()).unwrap();

        let matched: Vec<String> = result.matches.iter().map(FileRecord::slash_path).collect();
        let differing: Vec<String> = result.differences.iter().map(FileRecord::slash_path).collect();
        assert_eq!(matched, vec!["/a"]);
        assert_eq!(differing, vec!["/b", "/c"]);
        assert_eq!(result.len(), other.len());
    }

    #[test]
    fn test_diff_against_empty_index() {
        let mine: LookupIndex = LookupIndex::new(false);
        let other: Vec<FileRecord> = vec![record("/a", 1, 1, "ha")];

        let result: DiffResult = diff(&mine, &other, &mut silent()).unwrap();

        assert!(result.matches.is_empty());
        assert_eq!(result.differences.len(), 1);
    }

    #[test]
    fn test_diff_empty_list() {
        let mine: LookupIndex = LookupIndex::from_records(vec![record("/a", 1, 1, "ha")], false);
        let result: DiffResult = diff(&mine, &[], &mut silent()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_into_indexes() {
        let mine: LookupIndex = LookupIndex::from_records(vec![record("/a", 1, 1, "ha")], false);
        let other: Vec<FileRecord> = vec![record("/a", 1, 1, "ha"), record("/b", 1, 1, "ha")];

        let (matches, differences): (LookupIndex, LookupIndex) = diff(&mine, &other, &mut silent())
            .unwrap()
            .into_indexes(false);

        assert_eq!(matches.len(), 1);
        assert_eq!(differences.len(), 1);
        assert_eq!(differences.files_by_hash("ha")[0].slash_path(), "/b");
    }

    #[test]
    fn test_diff_cancelled() {
        let mine: LookupIndex = LookupIndex::new(false);
        let other: Vec<FileRecord> = vec![record("/a", 1, 1, "ha")];
        let token: CancelToken = CancelToken::new();
        token.cancel();
        let mut reporter: ThrottledReporter<'_, ProgressEvent> =
            ThrottledReporter::new(None, Duration::ZERO).with_cancel(&token);

        let result: Result<DiffResult, LookupError> = diff(&mine, &other, &mut reporter);
        assert!(matches!(result, Err(LookupError::Cancelled)));
    }
}
