//! File collector: resolves include/exclude patterns into concrete files.
//!
//! The collector is not live. Every call to [`FileCollector::get_files`]
//! walks the include roots again and applies the current exclude patterns.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use folder_diff_common::{
    lexical_normalize, path_key, to_absolute, to_slash_string, with_trailing_separator,
    ProgressEvent, ThrottledReporter,
};

use crate::error::FileSystemError;
use crate::fs::{FileHandle, FileSystem};
use crate::glob::{ExcludeScope, GlobFilter, ScopedGlob};
use crate::pattern::FilePattern;

/// Files gathered while resolving one or more include patterns.
#[derive(Default)]
struct Resolution {
    /// Folded path keys already collected.
    seen: HashSet<String>,
    files: Vec<FileHandle>,
    /// Files visited, matched or not.
    scanned: u64,
}

/// Owns the include/exclude patterns of an index and resolves them on demand.
pub struct FileCollector {
    fs: Arc<dyn FileSystem>,
    include: Vec<ScopedGlob>,
    exclude: Vec<ScopedGlob>,
    case_insensitive: bool,
    exclude_scope: ExcludeScope,
}

impl FileCollector {
    /// Create a collector without patterns.
    ///
    /// # Arguments
    /// * `fs` - Filesystem the patterns are resolved against
    /// * `case_insensitive` - Whether paths compare without regard to ASCII case
    pub fn new(fs: Arc<dyn FileSystem>, case_insensitive: bool) -> Self {
        Self {
            fs,
            include: Vec::new(),
            exclude: Vec::new(),
            case_insensitive,
            exclude_scope: ExcludeScope::default(),
        }
    }

    /// Set where root-less exclude patterns apply.
    pub fn with_exclude_scope(mut self, scope: ExcludeScope) -> Self {
        self.exclude_scope = scope;
        self
    }

    /// The filesystem patterns are resolved against.
    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Whether path comparison folds ASCII case.
    pub fn case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// Registered include patterns, in registration order.
    pub fn include_patterns(&self) -> Vec<FilePattern> {
        self.include.iter().map(|g: &ScopedGlob| g.pattern().clone()).collect()
    }

    /// Registered exclude patterns, in registration order.
    pub fn exclude_patterns(&self) -> Vec<FilePattern> {
        self.exclude.iter().map(|g: &ScopedGlob| g.pattern().clone()).collect()
    }

    /// Include every file below `folder`, recursively.
    ///
    /// # Arguments
    /// * `folder` - Directory to include (relative paths resolve against the cwd)
    /// * `reporter` - Progress and cancellation for the initial resolution
    ///
    /// # Returns
    /// The files the new pattern resolves to right now.
    ///
    /// # Errors
    /// Returns `DirectoryNotFound` if `folder` is not an existing directory, or
    /// `Cancelled`. The collector is unchanged on error.
    pub fn add_include_folder(
        &mut self,
        folder: &Path,
        reporter: &mut ThrottledReporter<'_, ProgressEvent>,
    ) -> Result<Vec<FileHandle>, FileSystemError> {
        let absolute: PathBuf = lexical_normalize(&to_absolute(folder)?);
        let pattern: FilePattern = FilePattern::folder(&absolute)?;
        self.add_include(pattern, reporter)
    }

    /// Include the files matching a raw glob pattern.
    ///
    /// # Errors
    /// Returns `InvalidPattern` for an empty or malformed pattern,
    /// `DirectoryNotFound` if the pattern has a root that does not exist, or
    /// `Cancelled`. The collector is unchanged on error.
    pub fn add_include_pattern(
        &mut self,
        raw: &str,
        reporter: &mut ThrottledReporter<'_, ProgressEvent>,
    ) -> Result<Vec<FileHandle>, FileSystemError> {
        let pattern: FilePattern = FilePattern::parse(raw)?.into_absolute()?;
        self.add_include(pattern, reporter)
    }

    /// Register a parsed include pattern and resolve it.
    ///
    /// # Errors
    /// Same as [`FileCollector::add_include_pattern`].
    pub fn add_include(
        &mut self,
        pattern: FilePattern,
        reporter: &mut ThrottledReporter<'_, ProgressEvent>,
    ) -> Result<Vec<FileHandle>, FileSystemError> {
        if let Some(root) = pattern.root_path() {
            if !self.fs.directory_exists(&root) {
                return Err(FileSystemError::DirectoryNotFound {
                    path: pattern.root().to_string(),
                });
            }
        }

        let glob: ScopedGlob = ScopedGlob::compile(&pattern, self.case_insensitive)?;
        let fs_roots: Vec<String> = self.fs_roots();
        let mut resolution: Resolution = Resolution::default();
        self.resolve_into(&glob, &fs_roots, reporter, &mut resolution)?;

        log::debug!(
            "Include pattern {} resolved to {} files",
            pattern,
            resolution.files.len()
        );
        self.include.push(glob);
        Ok(resolution.files)
    }

    /// Register an exclude pattern.
    ///
    /// Files already handed out are not retracted.
    ///
    /// # Returns
    /// The parsed pattern.
    ///
    /// # Errors
    /// Returns `InvalidPattern` for an empty or malformed pattern.
    pub fn add_exclude_pattern(&mut self, raw: &str) -> Result<FilePattern, FileSystemError> {
        let pattern: FilePattern = FilePattern::parse(raw)?.into_absolute()?;
        self.add_exclude(pattern.clone())?;
        Ok(pattern)
    }

    /// Register a parsed exclude pattern.
    ///
    /// # Errors
    /// Returns `InvalidPattern` if the glob does not compile.
    pub fn add_exclude(&mut self, pattern: FilePattern) -> Result<(), FileSystemError> {
        let glob: ScopedGlob = ScopedGlob::compile(&pattern, self.case_insensitive)?;
        self.exclude.push(glob);
        Ok(())
    }

    /// Re-resolve every include pattern, applying every exclude pattern.
    ///
    /// A file matched by several include patterns is returned once.
    ///
    /// # Errors
    /// Returns `Cancelled` if the reporter observes a cancellation.
    pub fn get_files(
        &self,
        reporter: &mut ThrottledReporter<'_, ProgressEvent>,
    ) -> Result<Vec<FileHandle>, FileSystemError> {
        let fs_roots: Vec<String> = self.fs_roots();
        let mut resolution: Resolution = Resolution::default();
        for glob in &self.include {
            self.resolve_into(glob, &fs_roots, reporter, &mut resolution)?;
        }

        log::debug!(
            "Collected {} files ({} scanned) from {} include patterns",
            resolution.files.len(),
            resolution.scanned,
            self.include.len()
        );
        Ok(resolution.files)
    }

    /// Append the patterns of another collector that are not registered yet.
    ///
    /// # Errors
    /// Returns `InvalidPattern` if a pattern does not compile. The collector is
    /// unchanged on error.
    pub fn merge(&mut self, other: &FileCollector) -> Result<(), FileSystemError> {
        self.merge_patterns(&other.include_patterns(), &other.exclude_patterns())
    }

    /// Append the given patterns that are not registered yet, preserving order.
    ///
    /// Roots are not checked for existence.
    ///
    /// # Errors
    /// Returns `InvalidPattern` if a pattern does not compile. The collector is
    /// unchanged on error.
    pub fn merge_patterns(
        &mut self,
        include: &[FilePattern],
        exclude: &[FilePattern],
    ) -> Result<(), FileSystemError> {
        let new_include: Vec<ScopedGlob> = self.compile_missing(&self.include, include)?;
        let new_exclude: Vec<ScopedGlob> = self.compile_missing(&self.exclude, exclude)?;
        self.include.extend(new_include);
        self.exclude.extend(new_exclude);
        Ok(())
    }

    /// Select the paths a single exclude pattern would remove.
    ///
    /// Works on path strings only; the filesystem is not consulted.
    ///
    /// # Arguments
    /// * `pattern` - Exclude pattern to evaluate
    /// * `paths` - Slash-string paths, typically the keys of an index
    ///
    /// # Errors
    /// Returns `InvalidPattern` if the glob does not compile.
    pub fn paths_excluded_by<'a>(
        &self,
        pattern: &FilePattern,
        paths: &'a [String],
    ) -> Result<Vec<&'a str>, FileSystemError> {
        let filter: GlobFilter =
            GlobFilter::with_patterns(std::slice::from_ref(pattern), &[], self.case_insensitive)?;
        Ok(filter.matching_paths(paths, &self.exclude_scope_roots()))
    }

    /// Roots below which root-less exclude patterns are evaluated, across
    /// every include pattern.
    fn exclude_scope_roots(&self) -> Vec<String> {
        let fs_roots: Vec<String> = self.fs_roots();
        let mut roots: Vec<String> = Vec::new();
        let include_everywhere: bool = self.include.iter().any(|g: &ScopedGlob| !g.pattern().has_root());

        if self.exclude_scope == ExcludeScope::AllRoots || include_everywhere {
            roots.extend(fs_roots);
        }
        for glob in &self.include {
            let root: &str = glob.pattern().root();
            if !root.is_empty() && !roots.iter().any(|r: &String| r == root) {
                roots.push(root.to_string());
            }
        }
        roots
    }

    fn compile_missing(
        &self,
        existing: &[ScopedGlob],
        candidates: &[FilePattern],
    ) -> Result<Vec<ScopedGlob>, FileSystemError> {
        let mut added: Vec<ScopedGlob> = Vec::new();
        for pattern in candidates {
            let present: bool = existing
                .iter()
                .chain(added.iter())
                .any(|g: &ScopedGlob| g.pattern() == pattern);
            if !present {
                added.push(ScopedGlob::compile(pattern, self.case_insensitive)?);
            }
        }
        Ok(added)
    }

    /// Filesystem roots as slash strings ending in `/`.
    fn fs_roots(&self) -> Vec<String> {
        self.fs
            .roots()
            .iter()
            .map(|root: &PathBuf| {
                with_trailing_separator(&to_slash_string(&lexical_normalize(root)))
            })
            .collect()
    }

    /// Walk the roots of one include pattern and collect the files it keeps.
    fn resolve_into(
        &self,
        include: &ScopedGlob,
        fs_roots: &[String],
        reporter: &mut ThrottledReporter<'_, ProgressEvent>,
        resolution: &mut Resolution,
    ) -> Result<(), FileSystemError> {
        let walk_roots: Vec<String> = if include.pattern().has_root() {
            vec![include.pattern().root().to_string()]
        } else {
            fs_roots.to_vec()
        };

        for root in &walk_roots {
            let root_path: PathBuf = PathBuf::from(root);
            if !self.fs.directory_exists(&root_path) {
                log::warn!("Skipping missing include root {}", root);
                continue;
            }

            let scope: [String; 1] = [root.clone()];
            let exclude_roots: Vec<String> = match self.exclude_scope {
                ExcludeScope::AllRoots => {
                    let mut roots: Vec<String> = fs_roots.to_vec();
                    if !roots.contains(root) {
                        roots.push(root.clone());
                    }
                    roots
                }
                ExcludeScope::IncludeRoot => scope.to_vec(),
            };

            self.fs.walk_files(&root_path, &mut |handle: FileHandle| {
                resolution.scanned += 1;
                let slash: String = handle.slash_path();
                let scanned: u64 = resolution.scanned;
                reporter.tick(|elapsed: Duration| {
                    ProgressEvent::new("Collecting files", "Scanning")
                        .with_item(slash.as_str())
                        .with_current(scanned)
                        .with_elapsed(elapsed)
                })?;

                if !include.matches(&slash, &scope) {
                    return Ok(());
                }
                if self
                    .exclude
                    .iter()
                    .any(|g: &ScopedGlob| g.matches(&slash, &exclude_roots))
                {
                    return Ok(());
                }

                let key: String = path_key(&handle.path, self.case_insensitive);
                if resolution.seen.insert(key) {
                    resolution.files.push(handle);
                }
                Ok(())
            })?;
        }

        Ok(())
    }
}
