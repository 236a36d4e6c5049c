//! Shared constants used across folder-diff crates.

/// Default minimum interval between two progress callbacks (milliseconds).
pub const DEFAULT_REPORT_INTERVAL_MS: u64 = 500;

/// Read buffer used when streaming file contents into the hasher (64KB).
pub const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// Length of a rendered content hash (XXH128 as lowercase hex).
pub const HASH_HEX_LEN: usize = 32;
