//! File system side of folder-diff.
//!
//! This crate turns include/exclude patterns into file identity records:
//! - `FilePattern` - Pattern parsing into root + relative glob
//! - `GlobFilter` / `ScopedGlob` - Root-scoped glob matching over path strings
//! - `FileSystem` / `LocalFileSystem` - Abstract filesystem capability
//! - `FileCollector` - Resolves patterns into candidate files
//! - `identify()` - Content identity (XXH128) of a single file

pub mod collector;
pub mod error;
pub mod fs;
pub mod glob;
pub mod identity;
pub mod pattern;
pub mod record;

// Re-export main types
pub use collector::FileCollector;
pub use error::FileSystemError;
pub use fs::{system_time_to_micros, FileHandle, FileMetadata, FileSystem, LocalFileSystem};
pub use glob::{ExcludeScope, GlobFilter, ScopedGlob};
pub use identity::{identify, identify_all, SkippedFile};
pub use pattern::{FilePattern, MATCH_ALL};
pub use record::FileRecord;
