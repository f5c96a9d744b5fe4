//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the dedup engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Scanning phase events
    Scan(ScanEvent),
    /// Deletion phase events
    Delete(DeleteEvent),
}

/// Events during the scanning phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning has started
    Started { root: PathBuf },
    /// Periodic statistics snapshot
    Snapshot(ScanSnapshot),
    /// A file could not be processed; scanning continues
    FileError { path: PathBuf, message: String },
    /// The wall-clock budget expired; partial results follow
    TimedOut { elapsed_secs: u64 },
    /// The scan was cancelled by the caller; partial results follow
    Cancelled,
    /// Scanning completed
    Completed {
        total_scanned: usize,
        duplicate_groups: usize,
    },
}

/// Statistics snapshot emitted periodically during a scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSnapshot {
    /// Number of files fingerprinted so far
    pub files_scanned: usize,
    /// Number of per-file errors so far
    pub errors: usize,
    /// Number of duplicate groups discovered so far
    pub duplicate_groups: usize,
    /// Directory currently being walked
    pub current_dir: PathBuf,
}

/// Events during the deletion phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DeleteEvent {
    /// Deletion has started
    Started { total: usize },
    /// A file was moved to the recycle bin
    Deleted { path: PathBuf, size: u64 },
    /// A file was skipped by a safety check
    Skipped { path: PathBuf, reason: String },
    /// Removal of a file failed; the batch continues
    Failed { path: PathBuf, message: String },
    /// The deletion pass was cancelled by the caller
    Cancelled,
    /// Deletion completed
    Completed {
        deleted: usize,
        skipped: usize,
        errors: usize,
        space_reclaimed_bytes: u64,
    },
}
