//! Hash computation utilities.

use std::io::Read;
use std::path::Path;

use xxhash_rust::xxh3::Xxh3;

use crate::constants::{HASH_BUFFER_SIZE, HASH_HEX_LEN};

/// Compute XXH128 hash of a byte slice.
///
/// # Arguments
/// * `data` - Bytes to hash
///
/// # Returns
/// 32-character lowercase hex string (128 bits).
pub fn hash_bytes(data: &[u8]) -> String {
    let hash: u128 = xxhash_rust::xxh3::xxh3_128(data);
    to_hex(hash)
}

/// Compute XXH128 hash of everything readable from `reader`.
///
/// The stream is consumed once through a fixed-size buffer, so large files
/// are never held in memory.
///
/// # Arguments
/// * `reader` - Source of bytes to hash
///
/// # Returns
/// A tuple of (32-character lowercase hex hash, bytes read).
///
/// # Errors
/// Returns error if reading from the stream fails.
pub fn hash_reader<R: Read + ?Sized>(reader: &mut R) -> Result<(String, u64), std::io::Error> {
    let mut hasher: Xxh3Hasher = Xxh3Hasher::new();
    let mut buffer: Vec<u8> = vec![0u8; HASH_BUFFER_SIZE];
    let mut total: u64 = 0;

    loop {
        let bytes_read: usize = match reader.read(&mut buffer) {
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
        total += bytes_read as u64;
    }

    Ok((hasher.finish_hex(), total))
}

/// Compute XXH128 hash of a file.
///
/// # Arguments
/// * `path` - Path to the file to hash
///
/// # Returns
/// 32-character lowercase hex string (128 bits).
///
/// # Errors
/// Returns error if file cannot be read.
pub fn hash_file(path: &Path) -> Result<String, std::io::Error> {
    let mut file: std::fs::File = std::fs::File::open(path)?;
    let (hash, _): (String, u64) = hash_reader(&mut file)?;
    Ok(hash)
}

/// Streaming hasher for incremental XXH128 hashing.
pub struct Xxh3Hasher {
    inner: Xxh3,
}

impl Xxh3Hasher {
    /// Create a new streaming hasher.
    pub fn new() -> Self {
        Self { inner: Xxh3::new() }
    }

    /// Update the hasher with additional data.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Finalize and return the hash as u128.
    pub fn finish(&self) -> u128 {
        self.inner.digest128()
    }

    /// Finalize and return the hash as 32-char hex string.
    pub fn finish_hex(&self) -> String {
        to_hex(self.finish())
    }
}

/// Zero-padded lowercase hex rendering of a 128-bit hash.
fn to_hex(hash: u128) -> String {
    format!("{:0width$x}", hash, width = HASH_HEX_LEN)
}

impl Default for Xxh3Hasher {
    fn default() -> Self {
        Self::new()
    }
}
