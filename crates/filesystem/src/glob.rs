//! Glob pattern matching for file filtering.
//!
//! Matching is done on slash strings (`/`-separated absolute paths), never
//! on the filesystem. Each [`ScopedGlob`] applies its glob to the part of a
//! path below its root. A root-less pattern is tried below each of a list
//! of scope roots supplied by the caller.
//!
//! ```
//! use folder_diff_filesystem::glob::GlobFilter;
//! use folder_diff_filesystem::pattern::FilePattern;
//!
//! let include = vec![FilePattern::parse("/data/**/*.txt").unwrap()];
//! let exclude = vec![FilePattern::parse("**/tmp/**").unwrap()];
//! let filter = GlobFilter::with_patterns(&include, &exclude, false).unwrap();
//!
//! let roots = vec!["/".to_string()];
//! assert!(filter.matches("/data/notes/a.txt", &roots));
//! assert!(!filter.matches("/data/tmp/a.txt", &roots));
//! assert!(!filter.matches("/other/a.txt", &roots));
//! ```

use folder_diff_common::strip_root;
use globset::{GlobBuilder, GlobMatcher};
use serde::{Deserialize, Serialize};

use crate::error::FileSystemError;
use crate::pattern::FilePattern;

/// Where root-less exclude patterns are evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExcludeScope {
    /// Below every filesystem root as well as the include root a file was found under.
    #[default]
    AllRoots,
    /// Only below the include root a file was found under.
    IncludeRoot,
}

/// A compiled pattern bound to its root.
#[derive(Debug, Clone)]
pub struct ScopedGlob {
    pattern: FilePattern,
    matcher: GlobMatcher,
    case_insensitive: bool,
}

impl ScopedGlob {
    /// Compile a parsed pattern.
    ///
    /// # Errors
    /// Returns `InvalidPattern` if the glob does not compile.
    pub fn compile(pattern: &FilePattern, case_insensitive: bool) -> Result<Self, FileSystemError> {
        let matcher: GlobMatcher = GlobBuilder::new(pattern.relative_glob())
            .literal_separator(true)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|e| FileSystemError::invalid_pattern(pattern.to_string(), e.to_string()))?
            .compile_matcher();

        Ok(Self {
            pattern: pattern.clone(),
            matcher,
            case_insensitive,
        })
    }

    /// The pattern this glob was compiled from.
    pub fn pattern(&self) -> &FilePattern {
        &self.pattern
    }

    /// Check whether an absolute slash-string path matches.
    ///
    /// # Arguments
    /// * `path` - Absolute path with `/` separators
    /// * `scope_roots` - Roots (ending in `/`) to try when the pattern has no root
    pub fn matches(&self, path: &str, scope_roots: &[String]) -> bool {
        if self.pattern.has_root() {
            return self.matches_below(path, self.pattern.root());
        }
        scope_roots
            .iter()
            .any(|root: &String| self.matches_below(path, root))
    }

    fn matches_below(&self, path: &str, root: &str) -> bool {
        match strip_root(path, root, self.case_insensitive) {
            Some(relative) if !relative.is_empty() => self.matcher.is_match(relative),
            _ => false,
        }
    }
}

/// Include/exclude filter over slash-string paths.
#[derive(Debug, Clone, Default)]
pub struct GlobFilter {
    /// Patterns for files to include (empty = include all).
    include: Vec<ScopedGlob>,
    /// Patterns for files to exclude.
    exclude: Vec<ScopedGlob>,
    /// Whether matching folds ASCII case.
    case_insensitive: bool,
}

impl GlobFilter {
    /// Create a filter with no patterns (matches everything).
    pub fn new(case_insensitive: bool) -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            case_insensitive,
        }
    }

    /// Create a filter with both include and exclude patterns.
    ///
    /// # Errors
    /// Returns error if any pattern is invalid.
    pub fn with_patterns(
        include: &[FilePattern],
        exclude: &[FilePattern],
        case_insensitive: bool,
    ) -> Result<Self, FileSystemError> {
        let mut filter: GlobFilter = Self::new(case_insensitive);
        for pattern in include {
            filter.add_include(pattern)?;
        }
        for pattern in exclude {
            filter.add_exclude(pattern)?;
        }
        Ok(filter)
    }

    /// Add an include pattern.
    ///
    /// # Errors
    /// Returns error if the pattern is invalid.
    pub fn add_include(&mut self, pattern: &FilePattern) -> Result<(), FileSystemError> {
        self.include
            .push(ScopedGlob::compile(pattern, self.case_insensitive)?);
        Ok(())
    }

    /// Add an exclude pattern.
    ///
    /// # Errors
    /// Returns error if the pattern is invalid.
    pub fn add_exclude(&mut self, pattern: &FilePattern) -> Result<(), FileSystemError> {
        self.exclude
            .push(ScopedGlob::compile(pattern, self.case_insensitive)?);
        Ok(())
    }

    /// Check whether any exclude pattern matches.
    pub fn is_excluded(&self, path: &str, scope_roots: &[String]) -> bool {
        self.exclude
            .iter()
            .any(|glob: &ScopedGlob| glob.matches(path, scope_roots))
    }

    /// Check if a path matches the filter criteria.
    ///
    /// # Returns
    /// `true` if the path matches an include pattern (or there are none)
    /// and no exclude pattern.
    pub fn matches(&self, path: &str, scope_roots: &[String]) -> bool {
        let included: bool = self.include.is_empty()
            || self
                .include
                .iter()
                .any(|glob: &ScopedGlob| glob.matches(path, scope_roots));

        included && !self.is_excluded(path, scope_roots)
    }

    /// Select the paths of `paths` that match the filter.
    pub fn matching_paths<'a>(&self, paths: &'a [String], scope_roots: &[String]) -> Vec<&'a str> {
        paths
            .iter()
            .map(String::as_str)
            .filter(|path: &&str| self.matches(path, scope_roots))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roots() -> Vec<String> {
        vec!["/".to_string()]
    }

    fn pattern(raw: &str) -> FilePattern {
        FilePattern::parse(raw).unwrap()
    }

    fn include(raw: &str) -> GlobFilter {
        GlobFilter::with_patterns(&[pattern(raw)], &[], false).unwrap()
    }

    fn exclude(raw: &str) -> GlobFilter {
        GlobFilter::with_patterns(&[], &[pattern(raw)], false).unwrap()
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let filter: GlobFilter = GlobFilter::new(false);
        assert!(filter.matches("/any/path/file.txt", &roots()));
    }

    #[test]
    fn test_rooted_include_only_matches_below_root() {
        let filter: GlobFilter = include("/data/**/*.txt");
        assert!(filter.matches("/data/file.txt", &roots()));
        assert!(filter.matches("/data/deep/nested/file.txt", &roots()));
        assert!(!filter.matches("/data/file.rs", &roots()));
        assert!(!filter.matches("/other/file.txt", &roots()));
    }

    #[test]
    fn test_single_star_does_not_cross_directories() {
        let filter: GlobFilter = include("/data/*.txt");
        assert!(filter.matches("/data/file.txt", &roots()));
        assert!(!filter.matches("/data/sub/file.txt", &roots()));
    }

    #[test]
    fn test_rootless_exclude_applies_below_scope_roots() {
        let filter: GlobFilter = exclude(r"**\Sub\**\*");
        assert!(filter.matches("/data/Folder1/a.txt", &roots()));
        assert!(!filter.matches("/data/Folder1/Sub/b.txt", &roots()));
        assert!(!filter.matches("/data/Folder1/Sub/Sub/c.txt", &roots()));
    }

    #[test]
    fn test_rootless_pattern_without_scope_roots_never_matches() {
        let filter: GlobFilter = exclude("*.tmp");
        assert!(filter.matches("/data/file.tmp", &[]));
        assert!(!filter.matches("/data/file.tmp", &roots()));
    }

    #[test]
    fn test_rooted_exclude_scoped_to_its_root() {
        let filter: GlobFilter = exclude("/data/cache/**");
        assert!(!filter.matches("/data/cache/blob.bin", &roots()));
        assert!(filter.matches("/other/cache/blob.bin", &roots()));
    }

    #[test]
    fn test_node_modules_exclusion() {
        let filter: GlobFilter = exclude("**/node_modules/**");
        assert!(filter.matches("/src/index.js", &roots()));
        assert!(!filter.matches("/node_modules/lodash/index.js", &roots()));
        assert!(!filter.matches("/packages/app/node_modules/react/index.js", &roots()));
    }

    #[test]
    fn test_hidden_files() {
        let filter: GlobFilter = exclude("**/.*");
        assert!(filter.matches("/repo/file.txt", &roots()));
        assert!(!filter.matches("/repo/.hidden", &roots()));
    }

    #[test]
    fn test_brace_expansion() {
        let filter: GlobFilter = include("/assets/**/*.{png,jpg}");
        assert!(filter.matches("/assets/textures/wood.png", &roots()));
        assert!(filter.matches("/assets/photo.jpg", &roots()));
        assert!(!filter.matches("/assets/file.gif", &roots()));
    }

    #[test]
    fn test_case_insensitive_matching() {
        let filter: GlobFilter =
            GlobFilter::with_patterns(&[pattern("/Data/**/*.TXT")], &[], true).unwrap();
        assert!(filter.matches("/data/Notes/a.txt", &roots()));

        let sensitive: GlobFilter = include("/Data/**/*.TXT");
        assert!(!sensitive.matches("/data/Notes/a.txt", &roots()));
    }

    #[test]
    fn test_root_itself_is_not_a_match() {
        let filter: GlobFilter = include("/data/**");
        assert!(!filter.matches("/data/", &roots()));
    }

    #[test]
    fn test_matching_paths_over_plain_strings() {
        let filter: GlobFilter = include("**/Sub/**/*");
        let paths: Vec<String> = vec![
            "/a/top.txt".to_string(),
            "/a/Sub/one.txt".to_string(),
            "/b/Sub/deeper/two.txt".to_string(),
        ];

        let matched: Vec<&str> = filter.matching_paths(&paths, &roots());

        assert_eq!(matched, vec!["/a/Sub/one.txt", "/b/Sub/deeper/two.txt"]);
    }
}
