//! Two-way file lookup index.
//!
//! Records are keyed by path in `by_path` and grouped by content hash in
//! `by_hash`. Every record in `by_path` sits in exactly one bucket of
//! `by_hash`, under its own hash, and no bucket is ever empty. Keys are
//! lexically normalized, so `/a//b` and `/a/./b` address the same record.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use folder_diff_common::path_key;
use folder_diff_filesystem::{FileHandle, FileRecord};

/// Result of looking up a record or file in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainsState {
    /// The path is not indexed.
    NoMatch,
    /// The path is indexed with the same identity.
    Match,
    /// The path is indexed but its content or metadata differ.
    Modified,
}

/// Index of file records by path and by content hash.
#[derive(Debug, Clone, Default)]
pub struct LookupIndex {
    by_path: BTreeMap<String, FileRecord>,
    by_hash: HashMap<String, Vec<FileRecord>>,
    case_insensitive: bool,
}

impl LookupIndex {
    /// Create an empty index.
    pub fn new(case_insensitive: bool) -> Self {
        Self {
            by_path: BTreeMap::new(),
            by_hash: HashMap::new(),
            case_insensitive,
        }
    }

    /// Create an index holding `records`. Later records win on duplicate paths.
    pub fn from_records<I>(records: I, case_insensitive: bool) -> Self
    where
        I: IntoIterator<Item = FileRecord>,
    {
        let mut index: LookupIndex = Self::new(case_insensitive);
        for record in records {
            index.add(record);
        }
        index
    }

    /// Whether paths compare without regard to ASCII case.
    pub fn case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// Insert a record, replacing any record already stored for its path.
    pub fn add(&mut self, record: FileRecord) {
        let record: FileRecord = record.normalized();
        let key: String = self.key(record.path());
        self.remove_key(&key);

        self.by_hash
            .entry(record.hash().to_string())
            .or_default()
            .push(record.clone());
        self.by_path.insert(key, record);
    }

    /// Remove the record stored for `record`'s path.
    ///
    /// The stored record is removed from the bucket of its own hash, which
    /// may differ from `record`'s hash.
    ///
    /// # Returns
    /// The removed record, or `None` if the path was not indexed.
    pub fn remove(&mut self, record: &FileRecord) -> Option<FileRecord> {
        self.remove_path(record.path())
    }

    /// Remove the record stored for `path`.
    pub fn remove_path(&mut self, path: &Path) -> Option<FileRecord> {
        let key: String = self.key(path);
        self.remove_key(&key)
    }

    /// Classify a record against the index.
    ///
    /// # Returns
    /// `Match` if the stored record has the same creation time, size and
    /// hash, `Modified` if it differs, `NoMatch` if the path is not indexed.
    pub fn contains(&self, record: &FileRecord) -> ContainsState {
        match self.get(record.path()) {
            None => ContainsState::NoMatch,
            Some(stored)
                if stored.created_us() == record.created_us()
                    && stored.size() == record.size()
                    && stored.hash() == record.hash() =>
            {
                ContainsState::Match
            }
            Some(_) => ContainsState::Modified,
        }
    }

    /// Classify an unhashed file against the index using metadata only.
    ///
    /// # Returns
    /// `Match` if the stored record has the same creation time, modification
    /// time and size, `Modified` if any differ, `NoMatch` if not indexed.
    pub fn contains_metadata(&self, file: &FileHandle) -> ContainsState {
        match self.get(&file.path) {
            None => ContainsState::NoMatch,
            Some(stored) if stored.metadata() == file.metadata => ContainsState::Match,
            Some(_) => ContainsState::Modified,
        }
    }

    /// Record stored for `path`.
    pub fn get(&self, path: &Path) -> Option<&FileRecord> {
        self.by_path.get(&self.key(path))
    }

    /// All records, sorted by path key.
    pub fn get_files(&self) -> Vec<FileRecord> {
        self.by_path.values().cloned().collect()
    }

    /// Records sharing `hash`, in insertion order.
    pub fn files_by_hash(&self, hash: &str) -> Vec<FileRecord> {
        self.by_hash.get(hash).cloned().unwrap_or_default()
    }

    /// Distinct content hashes in the index.
    pub fn hashes(&self) -> impl Iterator<Item = &str> + '_ {
        self.by_hash.keys().map(String::as_str)
    }

    /// Paths of all records as slash strings, in original case.
    pub fn paths(&self) -> Vec<String> {
        self.by_path.values().map(FileRecord::slash_path).collect()
    }

    /// Number of indexed files.
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    /// Whether the index holds no files.
    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// Number of distinct content hashes.
    pub fn hash_count(&self) -> usize {
        self.by_hash.len()
    }

    fn key(&self, path: &Path) -> String {
        path_key(path, self.case_insensitive)
    }

    fn remove_key(&mut self, key: &str) -> Option<FileRecord> {
        let existing: FileRecord = self.by_path.remove(key)?;
        let case_insensitive: bool = self.case_insensitive;

        if let Some(bucket) = self.by_hash.get_mut(existing.hash()) {
            bucket.retain(|r: &FileRecord| path_key(r.path(), case_insensitive) != key);
            if bucket.is_empty() {
                self.by_hash.remove(existing.hash());
            }
        }

        Some(existing)
    }
}
