//! Filename-quality scoring.
//!
//! A name that looks like a duplicate artifact ("report (2)", "photo - Copy")
//! is penalized; a generic camera or screenshot name is neutral; anything
//! else scores by how descriptive it is.

use regex::Regex;

/// Default naming conventions from cameras, screenshots and scanners
const GENERIC_PREFIXES: &[&str] = &[
    "img", "image", "dsc", "dcim", "screenshot", "scan", "photo", "pxl",
];

/// Scores a filename stem (extension already stripped).
pub struct FilenameScorer {
    duplicate_suffix: Regex,
}

impl FilenameScorer {
    pub fn new() -> Self {
        // Trailing numeric parenthetical, or a copy/duplicate marker with
        // optional trailing digits: "x (3)", "x - Copy", "x_copy2", "x копия"
        let duplicate_suffix =
            Regex::new(r"(?i)(\(\d+\)|[\s_.-](copy|duplicate|копия)\s*\d*)\s*$")
                .expect("duplicate-suffix pattern is valid");
        Self { duplicate_suffix }
    }

    pub fn score(&self, stem: &str) -> i32 {
        if self.duplicate_suffix.is_match(stem) {
            return -10;
        }
        let lower = stem.to_lowercase();
        if GENERIC_PREFIXES.iter().any(|p| lower.starts_with(p)) {
            return 0;
        }
        let len = stem.chars().count();
        if len > 20 {
            30
        } else if len > 10 {
            15
        } else {
            5
        }
    }
}

impl Default for FilenameScorer {
    fn default() -> Self {
        Self::new()
    }
}
