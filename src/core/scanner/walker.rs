//! Directory walking and fingerprint grouping.

use chrono::Local;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

use super::{DuplicateGroup, FileClassifier, FileEntry, ScanOutcome, ScanResult};
use crate::core::cancel::CancelToken;
use crate::core::config::ScanConfig;
use crate::core::hasher::ContentHasher;
use crate::error::{HashError, ScanError};
use crate::events::{null_sender, Event, EventSender, ScanEvent, ScanSnapshot};

/// Files accumulated before a hashing fan-out
const HASH_BATCH: usize = 32;

/// Walks a directory tree and groups files by content fingerprint.
///
/// One instance owns its index maps exclusively for the duration of one
/// `scan` call; run scans sequentially per instance.
pub struct DuplicateScanner {
    config: ScanConfig,
    classifier: FileClassifier,
    hasher: ContentHasher,
    cancel: CancelToken,
    yield_point: Box<dyn Fn() + Send + Sync>,
}

/// Mutable state threaded through one scan call
struct ScanState {
    by_hash: HashMap<String, Vec<FileEntry>>,
    visited_dirs: HashSet<PathBuf>,
    visited_files: HashSet<PathBuf>,
    pending: Vec<(PathBuf, u64)>,
    total_scanned: usize,
    group_count: usize,
    errors: Vec<String>,
    last_snapshot: usize,
    current_dir: PathBuf,
    started: Instant,
    outcome: ScanOutcome,
}

impl ScanState {
    fn new(root: PathBuf) -> Self {
        Self {
            by_hash: HashMap::new(),
            visited_dirs: HashSet::new(),
            visited_files: HashSet::new(),
            pending: Vec::with_capacity(HASH_BATCH),
            total_scanned: 0,
            group_count: 0,
            errors: Vec::new(),
            last_snapshot: 0,
            current_dir: root,
            started: Instant::now(),
            outcome: ScanOutcome::Completed,
        }
    }
}

impl DuplicateScanner {
    pub fn new(config: ScanConfig) -> Self {
        let classifier = FileClassifier::new(&config);
        let hasher = ContentHasher::new(config.hash_chunk_size);
        Self {
            config,
            classifier,
            hasher,
            cancel: CancelToken::new(),
            yield_point: Box::new(std::thread::yield_now),
        }
    }

    /// Replace the cooperative yield called between hashing batches.
    ///
    /// The default yields the current thread; a host embedding the scanner
    /// in its own scheduler can substitute whatever "let others run" means
    /// there.
    pub fn with_yield_point(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.yield_point = Box::new(hook);
        self
    }

    /// Handle for cancelling a scan in progress from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run a scan without progress events.
    pub fn scan(&self) -> Result<ScanResult, ScanError> {
        self.scan_with_events(&null_sender())
    }

    /// Run a scan, emitting progress events along the way.
    ///
    /// Priority subtrees are walked to completion first, highest weight
    /// first; the rest of the root follows. Per-file failures are counted
    /// and skipped, never fatal. Timeout and cancellation end the walk at
    /// the next checkpoint and return partial results.
    pub fn scan_with_events(&self, events: &EventSender) -> Result<ScanResult, ScanError> {
        let root = &self.config.root;
        if !root.exists() {
            return Err(ScanError::RootNotFound { path: root.clone() });
        }
        if !root.is_dir() {
            return Err(ScanError::RootNotADirectory { path: root.clone() });
        }

        let timestamp = Local::now();
        events.send(Event::Scan(ScanEvent::Started { root: root.clone() }));
        tracing::debug!(root = %root.display(), "scan started");

        let mut state = ScanState::new(root.clone());

        let mut ordered = self.config.priority_paths.clone();
        ordered.sort_by(|a, b| b.1.cmp(&a.1));

        let mut stopped = false;
        for (fragment, _) in &ordered {
            let subtree = root.join(fragment);
            if subtree.is_dir() {
                stopped = self.walk_tree(&subtree, &mut state, events);
                if stopped {
                    break;
                }
            }
        }
        if !stopped {
            self.walk_tree(root, &mut state, events);
        }

        let by_hash = std::mem::take(&mut state.by_hash);
        let mut groups: Vec<DuplicateGroup> = by_hash
            .into_iter()
            .filter(|(_, files)| files.len() >= 2)
            .map(|(hash, files)| DuplicateGroup::new(hash, files))
            .collect();
        // HashMap iteration order is arbitrary; fix the output order
        groups.sort_by(|a, b| a.hash.cmp(&b.hash));

        let total_duplicates = groups.iter().map(|g| g.duplicate_count()).sum();
        let reclaimable_bytes = groups.iter().map(|g| g.wasted_bytes()).sum();

        if state.outcome == ScanOutcome::Completed {
            events.send(Event::Scan(ScanEvent::Completed {
                total_scanned: state.total_scanned,
                duplicate_groups: groups.len(),
            }));
        }
        tracing::debug!(
            total_scanned = state.total_scanned,
            groups = groups.len(),
            errors = state.errors.len(),
            outcome = ?state.outcome,
            "scan finished"
        );

        Ok(ScanResult {
            timestamp,
            total_scanned: state.total_scanned,
            total_duplicates,
            reclaimable_bytes,
            groups,
            errors: state.errors,
            outcome: state.outcome,
        })
    }

    /// Walk one subtree. Returns true if the scan should stop entirely.
    fn walk_tree(&self, dir: &Path, state: &mut ScanState, events: &EventSender) -> bool {
        let mut it = WalkDir::new(dir).follow_links(false).into_iter();
        loop {
            if self.check_stop(state, events) {
                return true;
            }
            let entry = match it.next() {
                None => break,
                Some(entry) => entry,
            };
            match entry {
                Err(e) => {
                    // A directory-level error skips that subtree only
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    let message = if e.io_error().map(|io| io.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        ScanError::PermissionDenied { path: path.clone() }.to_string()
                    } else {
                        e.to_string()
                    };
                    tracing::warn!(path = %path.display(), %message, "walk error");
                    events.send(Event::Scan(ScanEvent::FileError {
                        path,
                        message: message.clone(),
                    }));
                    state.errors.push(message);
                }
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_dir() {
                        let canonical =
                            fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
                        if !state.visited_dirs.insert(canonical) {
                            // Already covered by a priority walk
                            it.skip_current_dir();
                            continue;
                        }
                        state.current_dir = path.to_path_buf();
                        continue;
                    }
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    if !self.classifier.should_scan(path) {
                        continue;
                    }
                    let size = match entry.metadata() {
                        Ok(meta) => meta.len(),
                        Err(e) => {
                            let message = e.to_string();
                            events.send(Event::Scan(ScanEvent::FileError {
                                path: path.to_path_buf(),
                                message: message.clone(),
                            }));
                            state.errors.push(message);
                            continue;
                        }
                    };
                    state.pending.push((path.to_path_buf(), size));
                    if state.pending.len() >= HASH_BATCH {
                        self.flush_pending(state, events);
                    }
                }
            }
        }
        self.flush_pending(state, events);
        false
    }

    /// Check cancellation and the wall-clock budget at a loop boundary.
    fn check_stop(&self, state: &mut ScanState, events: &EventSender) -> bool {
        if self.cancel.is_cancelled() {
            state.outcome = ScanOutcome::Cancelled;
            events.send(Event::Scan(ScanEvent::Cancelled));
            tracing::info!("scan cancelled");
            return true;
        }
        let elapsed = state.started.elapsed();
        if elapsed > self.config.scan_timeout {
            state.outcome = ScanOutcome::TimedOut;
            events.send(Event::Scan(ScanEvent::TimedOut {
                elapsed_secs: elapsed.as_secs(),
            }));
            tracing::warn!(elapsed_secs = elapsed.as_secs(), "scan timed out");
            return true;
        }
        false
    }

    /// Fingerprint the pending batch on the rayon pool, then merge the
    /// results into the index sequentially so the group counter stays
    /// consistent with the map.
    fn flush_pending(&self, state: &mut ScanState, events: &EventSender) {
        if state.pending.is_empty() {
            return;
        }
        let batch = std::mem::take(&mut state.pending);
        state.pending = Vec::with_capacity(HASH_BATCH);

        let hashed: Vec<(PathBuf, u64, Result<String, HashError>)> = batch
            .into_par_iter()
            .map(|(path, size)| {
                let digest = self.hasher.hash_file(&path);
                (path, size, digest)
            })
            .collect();

        for (path, size, digest) in hashed {
            match digest {
                Ok(hash) => {
                    let canonical = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
                    if !state.visited_files.insert(canonical) {
                        continue;
                    }
                    state.total_scanned += 1;
                    let members = state.by_hash.entry(hash.clone()).or_default();
                    members.push(FileEntry::new(path, hash, size));
                    if members.len() == 2 {
                        state.group_count += 1;
                    }
                }
                Err(e) => {
                    let message = e.to_string();
                    tracing::warn!(path = %path.display(), %message, "hash failed");
                    events.send(Event::Scan(ScanEvent::FileError {
                        path,
                        message: message.clone(),
                    }));
                    state.errors.push(message);
                }
            }
        }

        if state.total_scanned - state.last_snapshot >= self.config.progress_interval {
            state.last_snapshot = state.total_scanned;
            events.send(Event::Scan(ScanEvent::Snapshot(ScanSnapshot {
                files_scanned: state.total_scanned,
                errors: state.errors.len(),
                duplicate_groups: state.group_count,
                current_dir: state.current_dir.clone(),
            })));
        }

        // Let a host event loop breathe between batches
        (self.yield_point)();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write_file(dir: &Path, rel: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        path
    }

    fn small_files_config(root: &Path) -> ScanConfig {
        ScanConfig::builder(root).size_bounds(1, 1024).build().unwrap()
    }

    #[test]
    fn identical_files_share_one_group() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a/one.txt", b"duplicate content");
        write_file(dir.path(), "b/two.txt", b"duplicate content");
        write_file(dir.path(), "c/three.txt", b"duplicate content");

        let scanner = DuplicateScanner::new(small_files_config(dir.path()));
        let result = scanner.scan().unwrap();

        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].files.len(), 3);
        assert_eq!(result.total_scanned, 3);
        assert_eq!(result.outcome, ScanOutcome::Completed);
    }

    #[test]
    fn unique_files_produce_no_groups() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "one.txt", b"alpha content");
        write_file(dir.path(), "two.txt", b"beta content!");

        let scanner = DuplicateScanner::new(small_files_config(dir.path()));
        let result = scanner.scan().unwrap();

        assert!(result.groups.is_empty());
        assert_eq!(result.total_scanned, 2);
    }

    #[test]
    fn different_content_never_lands_in_same_group() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.txt", b"payload one");
        write_file(dir.path(), "b.txt", b"payload one");
        write_file(dir.path(), "c.txt", b"payload two");
        write_file(dir.path(), "d.txt", b"payload two");

        let scanner = DuplicateScanner::new(small_files_config(dir.path()));
        let result = scanner.scan().unwrap();

        assert_eq!(result.groups.len(), 2);
        for group in &result.groups {
            let first = &group.files[0].hash;
            assert!(group.files.iter().all(|f| &f.hash == first));
        }
    }

    #[test]
    fn priority_subtree_is_discovered_first() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "misc/copy.txt", b"shared bytes");
        write_file(dir.path(), "archive/original.txt", b"shared bytes");

        let config = ScanConfig::builder(dir.path())
            .size_bounds(1, 1024)
            .priority_path("archive", 100)
            .build()
            .unwrap();
        let result = DuplicateScanner::new(config).scan().unwrap();

        assert_eq!(result.groups.len(), 1);
        // Discovery order puts the priority subtree's file first
        assert!(result.groups[0].files[0]
            .path
            .to_string_lossy()
            .contains("archive"));
    }

    #[test]
    fn rescan_of_unmodified_tree_groups_identically() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "x/a.txt", b"same");
        write_file(dir.path(), "y/b.txt", b"same");
        write_file(dir.path(), "z/c.txt", b"lonely");

        let scanner = DuplicateScanner::new(small_files_config(dir.path()));
        let first = scanner.scan().unwrap();
        let second = scanner.scan().unwrap();

        let fingerprint = |result: &ScanResult| -> Vec<(String, Vec<PathBuf>)> {
            result
                .groups
                .iter()
                .map(|g| {
                    let mut paths: Vec<PathBuf> =
                        g.files.iter().map(|f| f.path.clone()).collect();
                    paths.sort();
                    (g.hash.clone(), paths)
                })
                .collect()
        };
        assert_eq!(fingerprint(&first), fingerprint(&second));
    }

    #[test]
    fn zero_timeout_returns_partial_result_with_indicator() {
        let dir = TempDir::new().unwrap();
        for i in 0..20 {
            write_file(dir.path(), &format!("f{i}.txt"), format!("body {i}").as_bytes());
        }

        let config = ScanConfig::builder(dir.path())
            .size_bounds(1, 1024)
            .timeout(Duration::ZERO)
            .build()
            .unwrap();
        let result = DuplicateScanner::new(config).scan().unwrap();

        assert_eq!(result.outcome, ScanOutcome::TimedOut);
        assert!(result.total_scanned < 20);
    }

    #[test]
    fn cancelled_before_start_returns_cancelled_outcome() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.txt", b"data here");

        let scanner = DuplicateScanner::new(small_files_config(dir.path()));
        scanner.cancel_token().cancel();
        let result = scanner.scan().unwrap();

        assert_eq!(result.outcome, ScanOutcome::Cancelled);
        assert_eq!(result.total_scanned, 0);
    }

    #[test]
    fn missing_root_is_a_hard_error() {
        let config = ScanConfig::builder("/nonexistent/root/dir").build().unwrap();
        let result = DuplicateScanner::new(config).scan();
        assert!(matches!(result, Err(ScanError::RootNotFound { .. })));
    }

    #[test]
    fn excluded_files_never_reach_groups() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "keep/data.txt", b"shared payload");
        write_file(dir.path(), ".git/config", b"shared payload");
        write_file(dir.path(), "keep/thumbs.db", b"shared payload");

        let scanner = DuplicateScanner::new(small_files_config(dir.path()));
        let result = scanner.scan().unwrap();

        assert!(result.groups.is_empty());
        assert_eq!(result.total_scanned, 1);
    }

    #[test]
    fn custom_yield_point_runs_between_batches() {
        let dir = TempDir::new().unwrap();
        for i in 0..5 {
            write_file(dir.path(), &format!("f{i}.txt"), format!("body {i}").as_bytes());
        }

        let calls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let observed = calls.clone();
        let scanner = DuplicateScanner::new(small_files_config(dir.path()))
            .with_yield_point(move || {
                calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            });

        scanner.scan().unwrap();

        assert!(observed.load(std::sync::atomic::Ordering::SeqCst) >= 1);
    }

    #[test]
    fn scan_estimate_counts_all_but_first_member() {
        let dir = TempDir::new().unwrap();
        let body = vec![0x42u8; 100];
        write_file(dir.path(), "a.bin", &body);
        write_file(dir.path(), "b.bin", &body);
        write_file(dir.path(), "c.bin", &body);

        let scanner = DuplicateScanner::new(small_files_config(dir.path()));
        let result = scanner.scan().unwrap();

        assert_eq!(result.total_duplicates, 2);
        assert_eq!(result.reclaimable_bytes, 200);
    }
}
