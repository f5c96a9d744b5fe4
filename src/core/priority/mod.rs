//! # Priority Module
//!
//! Scores every member of a duplicate group and selects the keeper.
//!
//! ## Scoring Signals
//! Four independent signals are summed per file:
//! - **Path priority** (0-100): highest configured fragment weight found in the path
//! - **Resolution bonus** (0-50): megapixel tiers, images only
//! - **Capture-date bonus** (0 or 20): readable EXIF original date, camera formats only
//! - **Filename quality** (-10 to 30): duplicate-suffix penalty, generic-name
//!   neutrality, descriptive-length reward
//!
//! Selection is deterministic: stable sort by total score, descending, so a
//! tie goes to the first-discovered file.

mod filename;

pub use filename::FilenameScorer;

use std::path::Path;

use crate::core::config::ScanConfig;
use crate::core::metadata::{ExifProber, MediaProber};
use crate::core::scanner::{DuplicateGroup, FileAction, FileEntry, ScanResult};

/// Extensions we attempt to read pixel dimensions from
const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "heic", "heif", "gif", "bmp", "tiff", "tif",
];

/// Camera-origin formats that can carry an EXIF capture date
const CAMERA_EXTENSIONS: &[&str] = &["jpg", "jpeg", "tiff", "tif", "heic", "heif"];

/// Chooses which member of each duplicate group survives.
///
/// Pure function of file content, path and metadata at call time; no state
/// is carried between groups.
pub struct PriorityEngine {
    priority_paths: Vec<(String, i32)>,
    prober: Box<dyn MediaProber>,
    filename: FilenameScorer,
}

impl PriorityEngine {
    pub fn new(config: &ScanConfig) -> Self {
        Self::with_prober(config, Box::new(ExifProber))
    }

    /// Use a custom metadata prober (tests, alternative decoder stacks).
    pub fn with_prober(config: &ScanConfig, prober: Box<dyn MediaProber>) -> Self {
        Self {
            priority_paths: config.priority_paths.clone(),
            prober,
            filename: FilenameScorer::new(),
        }
    }

    /// Score and select a keeper for every group in a scan result.
    pub fn score_result(&self, result: &mut ScanResult) {
        for group in &mut result.groups {
            self.select_keeper(group);
        }
    }

    /// Score all members of a group and designate exactly one keeper.
    ///
    /// Groups with fewer than two members short-circuit: the lone file (if
    /// any) is kept unscored and nothing is marked for deletion.
    pub fn select_keeper<'a>(&self, group: &'a mut DuplicateGroup) -> &'a mut DuplicateGroup {
        if group.files.len() < 2 {
            if let Some(only) = group.files.first_mut() {
                only.action = FileAction::Keep;
                group.keeper = Some(only.path.clone());
            }
            group.to_delete.clear();
            return group;
        }

        for entry in group.files.iter_mut() {
            self.score_entry(entry);
        }

        // Stable sort: ties keep discovery order, so the first-encountered
        // file wins among equals
        group.files.sort_by(|a, b| b.priority_score.cmp(&a.priority_score));

        group.files[0].action = FileAction::Keep;
        group.keeper = Some(group.files[0].path.clone());
        group.to_delete = group
            .files
            .iter_mut()
            .skip(1)
            .map(|entry| {
                entry.action = FileAction::Delete;
                entry.path.clone()
            })
            .collect();
        group
    }

    fn score_entry(&self, entry: &mut FileEntry) {
        let mut reasons: Vec<String> = Vec::new();

        let path_score = self.path_priority(&entry.path);
        if path_score > 0 {
            reasons.push(format!("path +{path_score}"));
        }

        let ext = entry
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        let mut resolution_score = 0;
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            if let Some((width, height)) = self.prober.dimensions(&entry.path) {
                entry.resolution = Some(format!("{width}x{height}"));
                resolution_score = resolution_bonus(width as u64 * height as u64);
                if resolution_score > 0 {
                    reasons.push(format!("resolution +{resolution_score}"));
                }
            }
        }

        let mut exif_score = 0;
        if CAMERA_EXTENSIONS.contains(&ext.as_str()) {
            if let Some(date) = self.prober.capture_date(&entry.path) {
                entry.exif_date = Some(date);
                exif_score = 20;
                reasons.push("exif +20".to_string());
            }
        }

        let stem = entry.path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        let name_score = self.filename.score(stem);
        reasons.push(format!("name {name_score:+}"));

        entry.filename_score = name_score;
        entry.priority_score = path_score + resolution_score + exif_score + name_score;
        entry.reason = reasons.join(", ");
    }

    /// Highest weight among configured fragments appearing in the path.
    fn path_priority(&self, path: &Path) -> i32 {
        let path_lower = path.to_string_lossy().to_lowercase();
        self.priority_paths
            .iter()
            .filter(|(fragment, _)| path_lower.contains(fragment.as_str()))
            .map(|(_, weight)| *weight)
            .max()
            .unwrap_or(0)
    }
}

fn resolution_bonus(pixels: u64) -> i32 {
    if pixels >= 8_000_000 {
        50
    } else if pixels >= 2_000_000 {
        30
    } else if pixels >= 900_000 {
        10
    } else {
        0
    }
}
