//! # Error Module
//!
//! User-friendly error types for the duplicate file cleaner.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Per-file failures stay local** - the scan and delete loops convert them
//!   into recorded outcomes; only configuration problems and a missing scan
//!   root propagate out as hard errors

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum DedupError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Deletion error: {0}")]
    Delete(#[from] DeleteError),

    #[error("Report generation error: {0}")]
    Report(#[from] ReportError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors that occur during directory scanning
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Scan root not found: {path}")]
    RootNotFound { path: PathBuf },

    #[error("Scan root is not a directory: {path}")]
    RootNotADirectory { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while fingerprinting file content
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while moving a file to the recycle bin
#[derive(Error, Debug)]
pub enum DeleteError {
    #[error("Failed to move {path} to the recycle bin: {reason}")]
    Trash { path: PathBuf, reason: String },

    #[error("Permission denied removing: {path}")]
    PermissionDenied { path: PathBuf },
}

/// Errors that occur during report generation
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while building a scan configuration.
///
/// These fail fast, before any scan begins.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Minimum file size ({min} bytes) exceeds maximum ({max} bytes)")]
    SizeBounds { min: u64, max: u64 },

    #[error("Hash chunk size must be greater than zero")]
    ZeroChunkSize,
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, DedupError>;
