//! Content-addressable file lookup for folder-diff.
//!
//! This crate provides:
//! - `LookupIndex` - Two-way index of file records by path and by hash
//! - `diff()` - Classification of records against an index
//! - `refresh()` - Reconciliation of an index with the disk
//! - `FileHashLookup` - Collector and index behind one command surface
//!
//! # Example
//!
//! ```no_run
//! use folder_diff_lookup::{FileHashLookup, LookupOptions};
//! use std::path::Path;
//!
//! let mut before = FileHashLookup::local(LookupOptions::default());
//! before.include_folder(Path::new("/data/photos"), None).unwrap();
//!
//! // ... files change on disk ...
//!
//! let mut after = FileHashLookup::local(LookupOptions::default());
//! after.include_folder(Path::new("/data/photos"), None).unwrap();
//!
//! let result = before.diff_against(&after, None).unwrap();
//! for record in &result.differences {
//!     println!("changed: {}", record.path().display());
//! }
//! ```

pub mod diff;
pub mod error;
pub mod index;
pub mod lookup;
pub mod options;
pub mod refresh;
pub mod snapshot;

// Re-export main types
pub use diff::{diff, DiffResult};
pub use error::LookupError;
pub use index::{ContainsState, LookupIndex};
pub use lookup::{AddFilesReport, FileHashLookup};
pub use options::LookupOptions;
pub use refresh::{refresh, RefreshReport};
pub use snapshot::LookupSnapshot;
