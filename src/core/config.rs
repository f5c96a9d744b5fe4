//! Scan configuration with fail-fast validation.
//!
//! A [`ScanConfig`] is immutable once built. All name/extension sets are
//! lower-cased at construction so the classifier can compare without
//! re-normalizing on every file.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Filename prefix used by office suites for temporary lock files
pub const OFFICE_LOCK_PREFIX: &str = "~$";

/// Default folder names excluded from scanning
const DEFAULT_EXCLUDED_FOLDERS: &[&str] = &[
    "$recycle.bin",
    "system volume information",
    ".trash",
    ".trashes",
    "appdata",
    "tmp",
    "temp",
    ".cache",
];

/// Version-control and dependency-cache folders; never worth scanning
const DEFAULT_DEV_FOLDERS: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    "node_modules",
    "__pycache__",
    ".venv",
    "venv",
    "target",
    ".idea",
    ".vscode",
];

/// Extensions for transient or generated files
const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] = &["tmp", "temp", "part", "crdownload", "swp", "lock"];

/// Exact filenames that are OS noise, not user data
const DEFAULT_EXCLUDED_FILENAMES: &[&str] = &["thumbs.db", "desktop.ini", ".ds_store"];

/// Immutable input to one scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Directory the scan starts from
    pub root: PathBuf,
    /// Path fragment -> priority weight; higher weights are walked first
    /// and favored when choosing a keeper
    pub priority_paths: Vec<(String, i32)>,
    /// Folder names excluded wherever they appear in a path
    pub excluded_folders: HashSet<String>,
    /// Development-tool folder names matched as exact path segments
    pub dev_folders: HashSet<String>,
    /// File extensions excluded from scanning
    pub excluded_extensions: HashSet<String>,
    /// Exact filenames excluded from scanning
    pub excluded_filenames: HashSet<String>,
    /// Minimum file size in bytes (inclusive)
    pub min_file_size: u64,
    /// Maximum file size in bytes (inclusive)
    pub max_file_size: u64,
    /// Chunk size for content hashing, in bytes
    pub hash_chunk_size: usize,
    /// Wall-clock budget for one scan
    pub scan_timeout: Duration,
    /// Emit a progress snapshot every this many fingerprinted files
    pub progress_interval: usize,
}

impl ScanConfig {
    /// Start building a configuration rooted at `root`.
    pub fn builder(root: impl Into<PathBuf>) -> ScanConfigBuilder {
        ScanConfigBuilder {
            root: root.into(),
            priority_paths: Vec::new(),
            extra_excluded_folders: Vec::new(),
            min_file_size: 1024,
            max_file_size: 5 * 1024 * 1024 * 1024,
            hash_chunk_size: 64 * 1024,
            scan_timeout: Duration::from_secs(300),
            progress_interval: 100,
        }
    }
}

/// Builder for [`ScanConfig`]; `build` validates and normalizes.
#[derive(Debug, Clone)]
pub struct ScanConfigBuilder {
    root: PathBuf,
    priority_paths: Vec<(String, i32)>,
    extra_excluded_folders: Vec<String>,
    min_file_size: u64,
    max_file_size: u64,
    hash_chunk_size: usize,
    scan_timeout: Duration,
    progress_interval: usize,
}

impl ScanConfigBuilder {
    /// Associate a path fragment with a priority weight.
    ///
    /// Files whose path contains the fragment inherit the weight when the
    /// keeper is chosen; the matching subtree is also walked first.
    pub fn priority_path(mut self, fragment: impl Into<String>, weight: i32) -> Self {
        self.priority_paths.push((fragment.into(), weight));
        self
    }

    /// Exclude an additional folder name from scanning.
    pub fn exclude_folder(mut self, name: impl Into<String>) -> Self {
        self.extra_excluded_folders.push(name.into());
        self
    }

    /// Set the inclusive file size bounds.
    pub fn size_bounds(mut self, min: u64, max: u64) -> Self {
        self.min_file_size = min;
        self.max_file_size = max;
        self
    }

    /// Set the hashing chunk size in bytes.
    pub fn hash_chunk_size(mut self, bytes: usize) -> Self {
        self.hash_chunk_size = bytes;
        self
    }

    /// Set the wall-clock budget for the scan.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = timeout;
        self
    }

    /// Emit a progress snapshot every `files` fingerprinted files.
    pub fn progress_interval(mut self, files: usize) -> Self {
        self.progress_interval = files.max(1);
        self
    }

    /// Validate and produce the immutable configuration.
    pub fn build(self) -> Result<ScanConfig, ConfigError> {
        if self.min_file_size > self.max_file_size {
            return Err(ConfigError::SizeBounds {
                min: self.min_file_size,
                max: self.max_file_size,
            });
        }
        if self.hash_chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }

        let mut excluded_folders: HashSet<String> = DEFAULT_EXCLUDED_FOLDERS
            .iter()
            .map(|s| s.to_string())
            .collect();
        excluded_folders.extend(
            self.extra_excluded_folders
                .into_iter()
                .map(|s| s.to_lowercase()),
        );

        Ok(ScanConfig {
            root: self.root,
            priority_paths: self
                .priority_paths
                .into_iter()
                .map(|(fragment, weight)| (fragment.to_lowercase(), weight))
                .collect(),
            excluded_folders,
            dev_folders: DEFAULT_DEV_FOLDERS.iter().map(|s| s.to_string()).collect(),
            excluded_extensions: DEFAULT_EXCLUDED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            excluded_filenames: DEFAULT_EXCLUDED_FILENAMES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_file_size: self.min_file_size,
            max_file_size: self.max_file_size,
            hash_chunk_size: self.hash_chunk_size,
            scan_timeout: self.scan_timeout,
            progress_interval: self.progress_interval,
        })
    }
}
