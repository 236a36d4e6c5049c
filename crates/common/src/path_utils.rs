//! Path normalization utilities for pattern matching and index keys.
//!
//! Patterns and index keys work on "slash strings": the path rendered as
//! text with `/` as the only separator. Matching is ASCII case-folded when
//! the platform treats paths case-insensitively.

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

use crate::error::PathError;

/// Convert a path to absolute without resolving symlinks.
///
/// # Arguments
/// * `path` - Path to convert (relative or absolute)
///
/// # Returns
/// Absolute path, joining with current directory if relative.
///
/// # Errors
/// Returns error if current directory cannot be determined.
pub fn to_absolute(path: &Path) -> Result<PathBuf, PathError> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        std::env::current_dir()
            .map(|cwd: PathBuf| cwd.join(path))
            .map_err(|e: std::io::Error| PathError::from_io(path.display().to_string(), e))
    }
}

/// Lexical path normalization without filesystem access.
///
/// Removes `.` components and resolves `..` components lexically.
/// Does not access the filesystem or resolve symlinks.
pub fn lexical_normalize(path: &Path) -> PathBuf {
    let mut components: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => { /* skip . */ }
            Component::ParentDir => {
                if !components.is_empty()
                    && !matches!(
                        components.last(),
                        Some(Component::ParentDir) | Some(Component::RootDir)
                    )
                {
                    components.pop();
                } else {
                    components.push(component);
                }
            }
            _ => components.push(component),
        }
    }

    components.iter().collect()
}

/// Render any path (absolute or relative) as a slash string.
///
/// On Windows `\` separators become `/`. Elsewhere the text is unchanged,
/// since `\` is an ordinary file name character there.
pub fn to_slash_string(path: &Path) -> String {
    let text: Cow<str> = path.to_string_lossy();
    if cfg!(windows) {
        text.replace('\\', "/")
    } else {
        text.into_owned()
    }
}

/// Replace every `\` in user input with `/`.
pub fn normalize_separators(raw: &str) -> String {
    raw.replace('\\', "/")
}

/// Strip trailing separators and append exactly one `/`.
///
/// A bare root such as `/` stays `/`.
pub fn with_trailing_separator(dir: &str) -> String {
    let trimmed: &str = dir.trim_end_matches('/');
    format!("{}/", trimmed)
}

/// Fold a slash string into the form used for keys and comparisons.
pub fn fold_case(path: &str, case_insensitive: bool) -> Cow<'_, str> {
    if case_insensitive {
        Cow::Owned(path.to_ascii_lowercase())
    } else {
        Cow::Borrowed(path)
    }
}

/// Key under which a path is stored and deduplicated.
///
/// The path is lexically normalized first, so `/a//b`, `/a/./b` and `/a/b`
/// share one key.
pub fn path_key(path: &Path, case_insensitive: bool) -> String {
    let slash: String = to_slash_string(&lexical_normalize(path));
    fold_case(&slash, case_insensitive).into_owned()
}

/// Strip `root` (a slash string ending in `/`) from the front of `path`.
///
/// # Returns
/// The remainder of `path` below `root`, or `None` if `path` is not under it.
pub fn strip_root<'a>(path: &'a str, root: &str, case_insensitive: bool) -> Option<&'a str> {
    let head: &str = path.get(..root.len())?;
    let matches: bool = if case_insensitive {
        head.eq_ignore_ascii_case(root)
    } else {
        head == root
    };
    if matches {
        path.get(root.len()..)
    } else {
        None
    }
}
