//! Include/exclude pattern parsing.
//!
//! A raw pattern such as `C:\Photos\**\*.jpg` or `/data/photos/*.png` is
//! split into a root directory and a glob relative to that root. Both `\`
//! and `/` are accepted as separators and normalized to `/`.
//!
//! ```
//! use folder_diff_filesystem::pattern::FilePattern;
//!
//! let pattern = FilePattern::parse(r"/data/photos/**/*.jpg").unwrap();
//! assert_eq!(pattern.root(), "/data/photos/");
//! assert_eq!(pattern.relative_glob(), "**/*.jpg");
//!
//! // A bare glob applies to every filesystem root.
//! let bare = FilePattern::parse("*.tmp").unwrap();
//! assert_eq!(bare.root(), "");
//! assert_eq!(bare.relative_glob(), "**/*.tmp");
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use folder_diff_common::{
    lexical_normalize, normalize_separators, to_absolute, to_slash_string, with_trailing_separator,
};
use globset::GlobBuilder;
use serde::{Deserialize, Serialize};

use crate::error::FileSystemError;

/// Glob that matches every file below a root, recursively.
pub const MATCH_ALL: &str = "**/*";

/// Characters that start a glob construct.
const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// A parsed include or exclude pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilePattern {
    /// Root directory ending in exactly one `/`, or empty for "every root".
    root: String,
    /// Glob relative to `root`, `/`-separated.
    relative_glob: String,
}

impl FilePattern {
    /// Parse a raw pattern string.
    ///
    /// The root is everything up to the last separator before the first glob
    /// metacharacter. A pattern without metacharacters is a folder and gets
    /// [`MATCH_ALL`]. A root-less glob is anchored with `**/` so it matches at
    /// any depth.
    ///
    /// # Errors
    /// Returns `InvalidPattern` if `raw` is empty or the glob does not compile.
    pub fn parse(raw: &str) -> Result<Self, FileSystemError> {
        let trimmed: &str = raw.trim();
        if trimmed.is_empty() {
            return Err(FileSystemError::invalid_pattern(raw, "pattern is empty"));
        }

        let normalized: String = normalize_separators(trimmed);
        let (root_part, glob_part): (&str, &str) = match normalized.find(GLOB_META) {
            None => (normalized.as_str(), ""),
            Some(idx) => {
                let cut: usize = normalized[..idx].rfind('/').map_or(0, |i: usize| i + 1);
                normalized.split_at(cut)
            }
        };

        let root: String = if root_part.is_empty() {
            String::new()
        } else {
            normalize_root(Path::new(root_part))
        };
        let relative_glob: String = canonical_glob(glob_part, root.is_empty());

        validate_glob(raw, &relative_glob)?;

        Ok(Self {
            root,
            relative_glob,
        })
    }

    /// Pattern matching every file below `folder`, recursively.
    ///
    /// Equivalent to parsing `folder/**/` but keeps glob metacharacters in
    /// the folder name literal.
    ///
    /// # Errors
    /// Returns `InvalidPattern` if `folder` is empty.
    pub fn folder(folder: &Path) -> Result<Self, FileSystemError> {
        let text: String = to_slash_string(folder);
        if text.trim().is_empty() {
            return Err(FileSystemError::invalid_pattern(text, "folder path is empty"));
        }
        Ok(Self {
            root: normalize_root(folder),
            relative_glob: MATCH_ALL.to_string(),
        })
    }

    /// Root directory (ends in `/`), or `""` for patterns spanning every root.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Glob relative to the root.
    pub fn relative_glob(&self) -> &str {
        &self.relative_glob
    }

    /// Whether the pattern is scoped to a single root directory.
    pub fn has_root(&self) -> bool {
        !self.root.is_empty()
    }

    /// Root as a filesystem path.
    pub fn root_path(&self) -> Option<PathBuf> {
        if self.has_root() {
            Some(PathBuf::from(&self.root))
        } else {
            None
        }
    }

    /// Resolve a relative root against the current directory.
    ///
    /// # Errors
    /// Returns error if the current directory cannot be determined.
    pub fn into_absolute(self) -> Result<Self, FileSystemError> {
        let root_path: PathBuf = match self.root_path() {
            Some(p) if p.is_relative() => p,
            _ => return Ok(self),
        };
        let absolute: PathBuf = to_absolute(&root_path)?;
        Ok(Self {
            root: normalize_root(&absolute),
            relative_glob: self.relative_glob,
        })
    }
}

impl fmt::Display for FilePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.root, self.relative_glob)
    }
}

/// Lexically normalize a root directory into a slash string ending in `/`.
///
/// Repeated separators collapse and `.`/`..` segments resolve. A root that
/// normalizes away entirely (`./`, `a/..`) names the current directory.
fn normalize_root(dir: &Path) -> String {
    let text: String = to_slash_string(&lexical_normalize(dir));
    if text.is_empty() {
        "./".to_string()
    } else {
        with_trailing_separator(&text)
    }
}

/// Bring the glob part into canonical form.
fn canonical_glob(glob: &str, rootless: bool) -> String {
    let glob: &str = glob.trim_start_matches('/');
    if glob.is_empty() {
        return MATCH_ALL.to_string();
    }

    let mut canonical: String = glob.to_string();
    while canonical.contains("//") {
        canonical = canonical.replace("//", "/");
    }
    if canonical.ends_with('/') {
        canonical.push('*');
    }
    if canonical == "**" {
        return MATCH_ALL.to_string();
    }
    if rootless && !canonical.starts_with("**/") {
        canonical.insert_str(0, "**/");
    }
    canonical
}

/// Check that the glob compiles.
fn validate_glob(raw: &str, glob: &str) -> Result<(), FileSystemError> {
    GlobBuilder::new(glob)
        .literal_separator(true)
        .build()
        .map(|_| ())
        .map_err(|e| FileSystemError::invalid_pattern(raw, e.to_string()))
}
