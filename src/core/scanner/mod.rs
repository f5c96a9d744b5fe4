//! # Scanner Module
//!
//! Walks a directory tree and groups files by content fingerprint.
//!
//! ## Flow
//! 1. Priority subtrees are walked first, highest weight first
//! 2. The [`FileClassifier`] filters out excluded and out-of-bounds files
//! 3. Surviving files are fingerprinted and grouped by digest
//! 4. Fingerprints shared by two or more paths become [`DuplicateGroup`]s
//!
//! ## Example
//! ```rust,ignore
//! use duplicate_file_cleaner::core::{DuplicateScanner, ScanConfig};
//!
//! let config = ScanConfig::builder("/data").build()?;
//! let result = DuplicateScanner::new(config).scan()?;
//! ```

mod classifier;
mod walker;

pub use classifier::FileClassifier;
pub use walker::DuplicateScanner;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// What the deletion pass should do with a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileAction {
    Keep,
    Delete,
}

impl std::fmt::Display for FileAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileAction::Keep => write!(f, "keep"),
            FileAction::Delete => write!(f, "delete"),
        }
    }
}

/// One filesystem object discovered during a scan.
///
/// Created with fingerprint and size only; the scoring fields are filled
/// in by the priority engine, then the entry is read-only for the
/// reporter and the deleter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    /// Absolute path
    pub path: PathBuf,
    /// Hex content fingerprint
    pub hash: String,
    /// Size in bytes
    pub size: u64,
    /// Keep or delete; defaults to keep until a keeper is chosen
    pub action: FileAction,
    /// Total priority score
    pub priority_score: i32,
    /// Human-readable scoring rationale
    pub reason: String,
    /// Image resolution as "WxH", when readable
    pub resolution: Option<String>,
    /// EXIF original capture date, when readable
    pub exif_date: Option<String>,
    /// Filename-quality sub-score
    pub filename_score: i32,
}

impl FileEntry {
    pub fn new(path: PathBuf, hash: String, size: u64) -> Self {
        Self {
            path,
            hash,
            size,
            action: FileAction::Keep,
            priority_score: 0,
            reason: String::new(),
            resolution: None,
            exif_date: None,
            filename_score: 0,
        }
    }

    /// Size in megabytes, for display
    pub fn size_mb(&self) -> f64 {
        self.size as f64 / (1024.0 * 1024.0)
    }
}

/// All files sharing one content fingerprint.
///
/// After the priority engine runs, exactly one member is the keeper and
/// every other member's path appears in `to_delete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Unique identifier for this group
    pub id: Uuid,
    /// Fingerprint shared by every member
    pub hash: String,
    /// Member files in discovery order
    pub files: Vec<FileEntry>,
    /// Path of the file selected for retention; None until scored
    pub keeper: Option<PathBuf>,
    /// Paths marked for deletion
    pub to_delete: Vec<PathBuf>,
}

impl DuplicateGroup {
    pub fn new(hash: String, files: Vec<FileEntry>) -> Self {
        Self {
            id: Uuid::new_v4(),
            hash,
            files,
            keeper: None,
            to_delete: Vec::new(),
        }
    }

    /// Number of members beyond the one that would be kept
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Bytes freed if every member but the first were removed.
    ///
    /// This is the scan-time estimate; the true figure depends on which
    /// member the priority engine keeps and is reported by the deleter.
    pub fn wasted_bytes(&self) -> u64 {
        self.files.iter().skip(1).map(|f| f.size).sum()
    }
}

/// How a scan ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanOutcome {
    /// The walk covered everything under the root
    Completed,
    /// The caller cancelled; results are partial
    Cancelled,
    /// The wall-clock budget expired; results are partial
    TimedOut,
}

/// The output of one full scan. Immutable once returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// When the scan started
    pub timestamp: DateTime<Local>,
    /// Files fingerprinted
    pub total_scanned: usize,
    /// Duplicate (non-keeper) file count across all groups
    pub total_duplicates: usize,
    /// Scan-time estimate of reclaimable bytes
    pub reclaimable_bytes: u64,
    /// All duplicate groups found
    pub groups: Vec<DuplicateGroup>,
    /// Non-fatal per-file error messages
    pub errors: Vec<String>,
    /// Terminal state of the scan
    pub outcome: ScanOutcome,
}

impl ScanResult {
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn reclaimable_gb(&self) -> f64 {
        self.reclaimable_bytes as f64 / (1024.0 * 1024.0 * 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, size: u64) -> FileEntry {
        FileEntry::new(PathBuf::from(path), "abc123".to_string(), size)
    }

    #[test]
    fn new_entry_defaults_to_keep() {
        let e = entry("/data/a.txt", 10);
        assert_eq!(e.action, FileAction::Keep);
        assert_eq!(e.priority_score, 0);
    }

    #[test]
    fn action_displays_lowercase() {
        assert_eq!(FileAction::Keep.to_string(), "keep");
        assert_eq!(FileAction::Delete.to_string(), "delete");
    }

    #[test]
    fn wasted_bytes_skips_first_member() {
        let group = DuplicateGroup::new(
            "abc123".to_string(),
            vec![
                entry("/data/a.txt", 100),
                entry("/data/b.txt", 100),
                entry("/data/c.txt", 100),
            ],
        );

        assert_eq!(group.wasted_bytes(), 200);
        assert_eq!(group.duplicate_count(), 2);
    }

    #[test]
    fn size_mb_converts() {
        let e = entry("/data/a.bin", 2 * 1024 * 1024);
        assert!((e.size_mb() - 2.0).abs() < f64::EPSILON);
    }
}
