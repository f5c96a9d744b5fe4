//! # Hasher Module
//!
//! Content fingerprinting via chunked SHA-256.
//!
//! The fingerprint depends only on file bytes, never on path or metadata,
//! so two runs over the same content always agree. The deleter relies on
//! this to detect files that changed between scan and deletion.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::HashError;

/// Computes content fingerprints by streaming files in fixed-size chunks.
#[derive(Debug, Clone)]
pub struct ContentHasher {
    chunk_size: usize,
}

impl ContentHasher {
    /// Create a hasher that reads `chunk_size` bytes at a time.
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size }
    }

    /// Hash the full content of a file and return the hex digest.
    ///
    /// Large files are never loaded into memory whole.
    pub fn hash_file(&self, path: &Path) -> Result<String, HashError> {
        let file = File::open(path).map_err(|source| HashError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = BufReader::new(file);
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            let bytes_read = reader.read(&mut buffer).map_err(|source| HashError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(format!("{:x}", hasher.finalize()))
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new(64 * 1024)
    }
}
