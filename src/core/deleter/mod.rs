//! # Deleter Module
//!
//! Safety-checked, reversible deletion of scored duplicate groups.
//!
//! ## Safety Checks
//! Every candidate is re-validated immediately before removal:
//! 1. The file must still exist
//! 2. Its content fingerprint must match the one recorded at scan time
//! 3. Its path must not fall under an excluded folder
//! 4. The group's keeper must still exist on disk
//!
//! Files that pass are moved to the recycle bin, never unlinked, so a
//! whole batch can be rolled back through normal OS trash restore.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Component, Path, PathBuf};

use crate::core::cancel::CancelToken;
use crate::core::config::ScanConfig;
use crate::core::hasher::ContentHasher;
use crate::core::scanner::{DuplicateGroup, FileAction};
use crate::error::DeleteError;
use crate::events::{null_sender, DeleteEvent, Event, EventSender};

const REASON_MISSING: &str = "file no longer exists";
const REASON_HASH: &str = "hash mismatch or unreadable";
const REASON_EXCLUDED: &str = "path is under an excluded folder";
const REASON_KEEPER: &str = "keeper no longer exists";

/// Mechanism that removes a file reversibly.
///
/// The default sends files to the platform recycle bin; tests substitute
/// a holding directory.
pub trait Disposal: Send + Sync {
    fn dispose(&self, path: &Path) -> Result<(), DeleteError>;
}

/// Moves files to the OS trash via the `trash` crate.
pub struct SystemTrash;

impl Disposal for SystemTrash {
    fn dispose(&self, path: &Path) -> Result<(), DeleteError> {
        trash::delete(path).map_err(|e| DeleteError::Trash {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Accumulated outcome of one deletion run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeletionResult {
    /// Candidates considered
    pub attempted: usize,
    /// Files moved to the recycle bin
    pub deleted: usize,
    /// Files skipped by a safety check
    pub skipped: usize,
    /// Files whose removal failed
    pub errors: usize,
    /// Bytes reclaimed by successful removals
    pub space_reclaimed_bytes: u64,
    /// (path, skip reason) for every skipped file
    pub skipped_files: Vec<(PathBuf, String)>,
    /// (path, error detail) for every failed removal
    pub failed_files: Vec<(PathBuf, String)>,
    /// Paths successfully moved to the recycle bin
    pub deleted_paths: Vec<PathBuf>,
    /// True when the run was cancelled before finishing
    pub cancelled: bool,
}

impl DeletionResult {
    /// Skip reasons grouped for display: "3 files skipped: hash mismatch..."
    pub fn skip_summary(&self) -> Vec<String> {
        let mut by_reason: BTreeMap<&str, usize> = BTreeMap::new();
        for (_, reason) in &self.skipped_files {
            *by_reason.entry(reason.as_str()).or_default() += 1;
        }
        by_reason
            .into_iter()
            .map(|(reason, count)| format!("{count} files skipped: {reason}"))
            .collect()
    }
}

/// Deletes scored duplicates after re-validating each one.
///
/// Holds its own exclusion set, independent of the scan-time classifier,
/// since scan and deletion may run at different times with different
/// configurations.
pub struct SafeDeleter {
    root: PathBuf,
    excluded_folders: HashSet<String>,
    hasher: ContentHasher,
    disposal: Box<dyn Disposal>,
    cancel: CancelToken,
}

impl SafeDeleter {
    pub fn new(config: &ScanConfig) -> Self {
        Self::with_disposal(config, Box::new(SystemTrash))
    }

    /// Use a custom disposal mechanism (tests, dry-run holding area).
    pub fn with_disposal(config: &ScanConfig, disposal: Box<dyn Disposal>) -> Self {
        let mut excluded_folders = config.excluded_folders.clone();
        excluded_folders.extend(config.dev_folders.iter().cloned());
        Self {
            root: config.root.clone(),
            excluded_folders,
            hasher: ContentHasher::new(config.hash_chunk_size),
            disposal,
            cancel: CancelToken::new(),
        }
    }

    /// Handle for cancelling a deletion run from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Delete every file marked `delete` without progress events.
    pub fn delete_duplicates(&self, groups: &[DuplicateGroup]) -> DeletionResult {
        self.delete_with_events(groups, &null_sender())
    }

    /// Delete every file marked `delete`, emitting an event per outcome.
    ///
    /// One file's failure never aborts the batch; a skipped or errored
    /// file is final for this run.
    pub fn delete_with_events(
        &self,
        groups: &[DuplicateGroup],
        events: &EventSender,
    ) -> DeletionResult {
        let total: usize = groups
            .iter()
            .map(|g| {
                g.files
                    .iter()
                    .filter(|f| f.action == FileAction::Delete)
                    .count()
            })
            .sum();
        events.send(Event::Delete(DeleteEvent::Started { total }));

        let mut result = DeletionResult::default();

        'groups: for group in groups {
            for file in group.files.iter().filter(|f| f.action == FileAction::Delete) {
                if self.cancel.is_cancelled() {
                    result.cancelled = true;
                    events.send(Event::Delete(DeleteEvent::Cancelled));
                    tracing::info!("deletion cancelled");
                    break 'groups;
                }

                result.attempted += 1;

                if let Some(reason) = self.safety_check(group, &file.path, &file.hash) {
                    result.skipped += 1;
                    result.skipped_files.push((file.path.clone(), reason.to_string()));
                    tracing::debug!(path = %file.path.display(), reason, "skipped");
                    events.send(Event::Delete(DeleteEvent::Skipped {
                        path: file.path.clone(),
                        reason: reason.to_string(),
                    }));
                    continue;
                }

                match self.disposal.dispose(&file.path) {
                    Ok(()) => {
                        result.deleted += 1;
                        result.space_reclaimed_bytes += file.size;
                        result.deleted_paths.push(file.path.clone());
                        events.send(Event::Delete(DeleteEvent::Deleted {
                            path: file.path.clone(),
                            size: file.size,
                        }));
                    }
                    Err(e) => {
                        let message = e.to_string();
                        result.errors += 1;
                        result.failed_files.push((file.path.clone(), message.clone()));
                        tracing::warn!(path = %file.path.display(), %message, "removal failed");
                        events.send(Event::Delete(DeleteEvent::Failed {
                            path: file.path.clone(),
                            message,
                        }));
                    }
                }
            }
        }

        if !result.cancelled {
            events.send(Event::Delete(DeleteEvent::Completed {
                deleted: result.deleted,
                skipped: result.skipped,
                errors: result.errors,
                space_reclaimed_bytes: result.space_reclaimed_bytes,
            }));
        }
        result
    }

    /// Run the four safety checks; Some(reason) means skip.
    fn safety_check(
        &self,
        group: &DuplicateGroup,
        path: &Path,
        recorded_hash: &str,
    ) -> Option<&'static str> {
        if !path.exists() {
            return Some(REASON_MISSING);
        }

        match self.hasher.hash_file(path) {
            Ok(current) if current == recorded_hash => {}
            _ => return Some(REASON_HASH),
        }

        if self.in_excluded_zone(path) {
            return Some(REASON_EXCLUDED);
        }

        match &group.keeper {
            Some(keeper) if keeper.exists() => {}
            _ => return Some(REASON_KEEPER),
        }

        None
    }

    /// Folder rules apply to the path relative to the scan root, matching
    /// the classifier's interpretation.
    fn in_excluded_zone(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative.components().any(|component| match component {
            Component::Normal(segment) => self
                .excluded_folders
                .contains(&segment.to_string_lossy().to_lowercase()),
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scanner::FileEntry;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Disposal that moves files into a holding directory
    struct HoldingArea {
        dir: PathBuf,
        counter: AtomicUsize,
    }

    impl HoldingArea {
        fn new(dir: &Path) -> Self {
            Self {
                dir: dir.to_path_buf(),
                counter: AtomicUsize::new(0),
            }
        }
    }

    impl Disposal for HoldingArea {
        fn dispose(&self, path: &Path) -> Result<(), DeleteError> {
            let n = self.counter.fetch_add(1, Ordering::SeqCst);
            let name = path.file_name().unwrap_or_default().to_string_lossy();
            let dest = self.dir.join(format!("{n}_{name}"));
            fs::rename(path, dest).map_err(|source| DeleteError::Trash {
                path: path.to_path_buf(),
                reason: source.to_string(),
            })
        }
    }

    /// Disposal that always fails
    struct BrokenDisposal;

    impl Disposal for BrokenDisposal {
        fn dispose(&self, path: &Path) -> Result<(), DeleteError> {
            Err(DeleteError::Trash {
                path: path.to_path_buf(),
                reason: "disposal unavailable".to_string(),
            })
        }
    }

    fn config(root: &Path) -> ScanConfig {
        ScanConfig::builder(root).size_bounds(1, 1024).build().unwrap()
    }

    fn holding_deleter(root: &Path, holding: &Path) -> SafeDeleter {
        SafeDeleter::with_disposal(&config(root), Box::new(HoldingArea::new(holding)))
    }

    /// Build a scored two-member group: keeper plus one delete candidate
    fn scored_group(root: &Path, content: &[u8]) -> (DuplicateGroup, PathBuf, PathBuf) {
        let keeper_path = root.join("keeper.txt");
        let dupe_path = root.join("dupe.txt");
        fs::write(&keeper_path, content).unwrap();
        fs::write(&dupe_path, content).unwrap();

        let hash = ContentHasher::default().hash_file(&keeper_path).unwrap();
        let mut keeper = FileEntry::new(keeper_path.clone(), hash.clone(), content.len() as u64);
        keeper.action = FileAction::Keep;
        let mut dupe = FileEntry::new(dupe_path.clone(), hash.clone(), content.len() as u64);
        dupe.action = FileAction::Delete;

        let mut group = DuplicateGroup::new(hash, vec![keeper, dupe]);
        group.keeper = Some(keeper_path.clone());
        group.to_delete = vec![dupe_path.clone()];
        (group, keeper_path, dupe_path)
    }

    #[test]
    fn valid_candidate_is_removed_reversibly() {
        let root = TempDir::new().unwrap();
        let holding = TempDir::new().unwrap();
        let (group, keeper_path, dupe_path) = scored_group(root.path(), b"shared body");

        let deleter = holding_deleter(root.path(), holding.path());
        let result = deleter.delete_duplicates(&[group]);

        assert_eq!(result.attempted, 1);
        assert_eq!(result.deleted, 1);
        assert_eq!(result.skipped, 0);
        assert_eq!(result.errors, 0);
        assert_eq!(result.space_reclaimed_bytes, 11);
        assert!(!dupe_path.exists());
        assert!(keeper_path.exists());
        // Reversible: the file is in the holding area, not gone
        assert_eq!(fs::read_dir(holding.path()).unwrap().count(), 1);
    }

    #[test]
    fn missing_file_is_skipped() {
        let root = TempDir::new().unwrap();
        let holding = TempDir::new().unwrap();
        let (group, _, dupe_path) = scored_group(root.path(), b"shared body");
        fs::remove_file(&dupe_path).unwrap();

        let result = holding_deleter(root.path(), holding.path()).delete_duplicates(&[group]);

        assert_eq!(result.deleted, 0);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.skipped_files[0].1, REASON_MISSING);
    }

    #[test]
    fn modified_file_is_never_deleted() {
        let root = TempDir::new().unwrap();
        let holding = TempDir::new().unwrap();
        let (group, _, dupe_path) = scored_group(root.path(), b"shared body");
        fs::write(&dupe_path, b"changed after scan").unwrap();

        let result = holding_deleter(root.path(), holding.path()).delete_duplicates(&[group]);

        assert_eq!(result.deleted, 0);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.skipped_files[0].1, REASON_HASH);
        assert!(dupe_path.exists());
    }

    #[test]
    fn vanished_keeper_blocks_the_whole_group() {
        let root = TempDir::new().unwrap();
        let holding = TempDir::new().unwrap();
        let (group, keeper_path, dupe_path) = scored_group(root.path(), b"shared body");
        fs::remove_file(&keeper_path).unwrap();

        let result = holding_deleter(root.path(), holding.path()).delete_duplicates(&[group]);

        assert_eq!(result.deleted, 0);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.skipped_files[0].1, REASON_KEEPER);
        assert!(dupe_path.exists());
    }

    #[test]
    fn excluded_zone_is_respected_at_delete_time() {
        let root = TempDir::new().unwrap();
        let holding = TempDir::new().unwrap();
        let protected = root.path().join("node_modules");
        fs::create_dir(&protected).unwrap();

        let (mut group, _, _) = scored_group(root.path(), b"shared body");
        // Simulate a candidate recorded before the path became excluded
        let moved = protected.join("dupe.txt");
        fs::rename(root.path().join("dupe.txt"), &moved).unwrap();
        group.files[1].path = moved.clone();

        let result = holding_deleter(root.path(), holding.path()).delete_duplicates(&[group]);

        assert_eq!(result.deleted, 0);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.skipped_files[0].1, REASON_EXCLUDED);
        assert!(moved.exists());
    }

    #[test]
    fn disposal_failure_is_recorded_and_batch_continues() {
        let root = TempDir::new().unwrap();
        let (group_a, _, _) = scored_group(root.path(), b"shared body");

        let sub = root.path().join("second");
        fs::create_dir(&sub).unwrap();
        let (group_b, _, _) = scored_group(&sub, b"other body!");

        let deleter = SafeDeleter::with_disposal(&config(root.path()), Box::new(BrokenDisposal));
        let result = deleter.delete_duplicates(&[group_a, group_b]);

        assert_eq!(result.attempted, 2);
        assert_eq!(result.errors, 2);
        assert_eq!(result.deleted, 0);
        assert!(result.failed_files[0].1.contains("disposal unavailable"));
    }

    #[test]
    fn cancellation_stops_before_the_next_file() {
        let root = TempDir::new().unwrap();
        let holding = TempDir::new().unwrap();
        let (group, _, dupe_path) = scored_group(root.path(), b"shared body");

        let deleter = holding_deleter(root.path(), holding.path());
        deleter.cancel_token().cancel();
        let result = deleter.delete_duplicates(&[group]);

        assert!(result.cancelled);
        assert_eq!(result.attempted, 0);
        assert!(dupe_path.exists());
    }

    #[test]
    fn skip_summary_groups_reasons() {
        let result = DeletionResult {
            skipped: 3,
            skipped_files: vec![
                (PathBuf::from("/a"), REASON_HASH.to_string()),
                (PathBuf::from("/b"), REASON_HASH.to_string()),
                (PathBuf::from("/c"), REASON_MISSING.to_string()),
            ],
            ..Default::default()
        };

        let summary = result.skip_summary();
        assert!(summary.contains(&format!("2 files skipped: {REASON_HASH}")));
        assert!(summary.contains(&format!("1 files skipped: {REASON_MISSING}")));
    }
}
