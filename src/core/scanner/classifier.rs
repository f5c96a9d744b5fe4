//! Exclusion rules applied to every file before it is fingerprinted.

use std::fs;
use std::path::{Component, Path};

use crate::core::config::{ScanConfig, OFFICE_LOCK_PREFIX};

/// Decides whether a filesystem entry should be scanned at all.
///
/// Pure predicate over one path and the immutable configuration; a file
/// that cannot be verified (failed stat) is excluded.
pub struct FileClassifier {
    config: ScanConfig,
}

impl FileClassifier {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Check whether a file passes every exclusion rule.
    ///
    /// Folder rules are evaluated on the path relative to the scan root,
    /// so a root that itself lives under e.g. `/tmp` is not excluded.
    pub fn should_scan(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.config.root).unwrap_or(path);
        let relative_lower = relative.to_string_lossy().to_lowercase();

        // Excluded folders match as path segments or as a path prefix;
        // development-tool folders match as exact segments only.
        for component in relative.components() {
            if let Component::Normal(segment) = component {
                let segment = segment.to_string_lossy().to_lowercase();
                if self.config.excluded_folders.contains(&segment)
                    || self.config.dev_folders.contains(&segment)
                {
                    return false;
                }
            }
        }
        if self
            .config
            .excluded_folders
            .iter()
            .any(|fragment| relative_lower.starts_with(fragment.as_str()))
        {
            return false;
        }

        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if self.config.excluded_extensions.contains(&ext.to_lowercase()) {
                return false;
            }
        }

        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };
        if self
            .config
            .excluded_filenames
            .contains(&file_name.to_lowercase())
        {
            return false;
        }
        if file_name.starts_with(OFFICE_LOCK_PREFIX) {
            return false;
        }

        // Symlinks are never scanned; their targets are reached directly
        match path.symlink_metadata() {
            Ok(meta) if meta.file_type().is_symlink() => return false,
            Ok(_) => {}
            Err(_) => return false,
        }

        // Size bounds, inclusive at both ends; stat failure excludes
        match fs::metadata(path) {
            Ok(meta) => {
                let size = meta.len();
                size >= self.config.min_file_size && size <= self.config.max_file_size
            }
            Err(_) => false,
        }
    }
}
