//! Integration tests for the scan -> score -> report half of the pipeline.
//!
//! These build real directory trees and verify:
//! - grouping and singleton exclusion
//! - keeper selection across priority-weighted paths
//! - exclusion rules end to end
//! - timeout behavior
//! - report completeness

use assert_fs::prelude::*;
use assert_fs::TempDir;
use duplicate_file_cleaner::core::{
    DuplicateScanner, FileAction, PriorityEngine, ReportGenerator, ScanConfig, ScanOutcome,
};
use std::time::Duration;

fn base_config(root: &std::path::Path) -> ScanConfig {
    ScanConfig::builder(root).size_bounds(1, 1024 * 1024).build().unwrap()
}

#[test]
fn identical_content_lands_in_exactly_one_group() {
    let temp = TempDir::new().unwrap();
    temp.child("a/report.txt").write_str("same content").unwrap();
    temp.child("b/report.txt").write_str("same content").unwrap();
    temp.child("c/deep/nested/report.txt")
        .write_str("same content")
        .unwrap();
    temp.child("unique.txt").write_str("something else").unwrap();

    let result = DuplicateScanner::new(base_config(temp.path())).scan().unwrap();

    assert_eq!(result.group_count(), 1);
    assert_eq!(result.groups[0].files.len(), 3);
    assert_eq!(result.total_scanned, 4);

    // The unique file appears in no group
    let grouped_paths: Vec<_> = result.groups[0]
        .files
        .iter()
        .map(|f| f.path.clone())
        .collect();
    assert!(grouped_paths.iter().all(|p| !p.ends_with("unique.txt")));
}

#[test]
fn keeper_follows_priority_weights() {
    let temp = TempDir::new().unwrap();
    temp.child("archive/report.txt").write_str("payload").unwrap();
    temp.child("downloads/report.txt").write_str("payload").unwrap();
    temp.child("misc/report.txt").write_str("payload").unwrap();

    let config = ScanConfig::builder(temp.path())
        .size_bounds(1, 1024)
        .priority_path("archive", 100)
        .priority_path("downloads", 50)
        .build()
        .unwrap();

    let mut result = DuplicateScanner::new(config.clone()).scan().unwrap();
    PriorityEngine::new(&config).score_result(&mut result);

    let group = &result.groups[0];
    assert!(group
        .keeper
        .as_ref()
        .unwrap()
        .to_string_lossy()
        .contains("archive"));
    assert_eq!(group.to_delete.len(), 2);

    let keepers = group
        .files
        .iter()
        .filter(|f| f.action == FileAction::Keep)
        .count();
    assert_eq!(keepers, 1);
    assert_eq!(group.files.len(), 1 + group.to_delete.len());
}

#[test]
fn excluded_locations_never_appear_in_results() {
    let temp = TempDir::new().unwrap();
    temp.child("docs/readme.txt").write_str("shared bytes").unwrap();
    temp.child(".git/config").write_str("shared bytes").unwrap();
    temp.child("docs/thumbs.db").write_str("shared bytes").unwrap();
    temp.child("app/node_modules/lib/index.js")
        .write_str("shared bytes")
        .unwrap();

    let result = DuplicateScanner::new(base_config(temp.path())).scan().unwrap();

    // Only docs/readme.txt survives the classifier, so no duplicates exist
    assert_eq!(result.total_scanned, 1);
    assert!(result.groups.is_empty());
}

#[test]
fn zero_timeout_yields_partial_result_not_an_error() {
    let temp = TempDir::new().unwrap();
    for i in 0..50 {
        temp.child(format!("file_{i}.txt"))
            .write_str(&format!("content {i}"))
            .unwrap();
    }

    let config = ScanConfig::builder(temp.path())
        .size_bounds(1, 1024)
        .timeout(Duration::ZERO)
        .build()
        .unwrap();

    let result = DuplicateScanner::new(config).scan().unwrap();

    assert_eq!(result.outcome, ScanOutcome::TimedOut);
    assert!(result.total_scanned < 50);
}

#[test]
fn report_lists_every_grouped_file_once() {
    let temp = TempDir::new().unwrap();
    temp.child("one/holiday_photos.txt").write_str("alpha").unwrap();
    temp.child("two/holiday_photos.txt").write_str("alpha").unwrap();
    temp.child("three/статья копия.txt").write_str("beta!").unwrap();
    temp.child("four/статья копия.txt").write_str("beta!").unwrap();

    let config = base_config(temp.path());
    let mut result = DuplicateScanner::new(config.clone()).scan().unwrap();
    PriorityEngine::new(&config).score_result(&mut result);

    let report = ReportGenerator.generate(&result);

    let data_rows = report
        .lines()
        .filter(|l| !l.starts_with('#') && !l.starts_with("group_id"))
        .count();
    let total_files: usize = result.groups.iter().map(|g| g.files.len()).sum();
    assert_eq!(data_rows, total_files);

    // Non-ASCII names survive intact
    assert!(report.contains("статья копия.txt"));
    // Actions are populated after scoring
    assert!(report.contains(",keep,"));
    assert!(report.contains(",delete,"));
}

#[test]
fn rescanning_an_unmodified_tree_is_stable() {
    let temp = TempDir::new().unwrap();
    temp.child("x/a.bin").write_str("dup body").unwrap();
    temp.child("y/b.bin").write_str("dup body").unwrap();
    temp.child("z/c.bin").write_str("dup body").unwrap();

    let scanner = DuplicateScanner::new(base_config(temp.path()));
    let first = scanner.scan().unwrap();
    let second = scanner.scan().unwrap();

    let shape = |r: &duplicate_file_cleaner::core::ScanResult| {
        let mut groups: Vec<(String, Vec<String>)> = r
            .groups
            .iter()
            .map(|g| {
                let mut members: Vec<String> = g
                    .files
                    .iter()
                    .map(|f| f.path.to_string_lossy().into_owned())
                    .collect();
                members.sort();
                (g.hash.clone(), members)
            })
            .collect();
        groups.sort();
        groups
    };

    assert_eq!(shape(&first), shape(&second));
    assert_eq!(first.total_scanned, second.total_scanned);
}
