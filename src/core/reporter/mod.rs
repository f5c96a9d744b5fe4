//! # Reporter Module
//!
//! Renders a scan result to a delimited tabular report for human review.
//!
//! The report is the trust boundary before anything destructive happens:
//! a user reads scores and rationales here, then separately confirms the
//! deletion pass. Summary statistics lead as `#`-prefixed comment lines so
//! spreadsheet imports can skip them; one data row follows per file.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::core::scanner::ScanResult;
use crate::error::ReportError;

/// How many hex characters of the fingerprint the report shows
const HASH_PREVIEW_LEN: usize = 12;

/// Placeholder for signals that do not apply to a file
const NOT_APPLICABLE: &str = "-";

/// Renders scan results to a reviewable report. Read-only over its input.
pub struct ReportGenerator;

impl ReportGenerator {
    /// Render the report to an in-memory string.
    pub fn generate(&self, result: &ScanResult) -> String {
        let mut out = String::new();

        let dupe_gb = result.reclaimable_bytes as f64 / (1024.0 * 1024.0 * 1024.0);
        out.push_str(&format!(
            "# Scan date: {}\n",
            result.timestamp.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str(&format!(
            "# Files scanned: {}\n",
            group_thousands(result.total_scanned)
        ));
        out.push_str(&format!(
            "# Duplicate groups: {}\n",
            group_thousands(result.group_count())
        ));
        out.push_str(&format!(
            "# Duplicates: {} files ({:.1} GB)\n",
            group_thousands(result.total_duplicates),
            dupe_gb
        ));
        out.push_str(&format!("# Reclaimable: {:.1} GB\n", result.reclaimable_gb()));

        out.push_str(
            "group_id,hash,file_path,size_bytes,size_mb,action,priority_score,reason,resolution,exif_date,filename_score\n",
        );

        for (index, group) in result.groups.iter().enumerate() {
            let group_id = index + 1;
            let hash_preview: String = group.hash.chars().take(HASH_PREVIEW_LEN).collect();
            for file in &group.files {
                out.push_str(&format!(
                    "{},{}...,{},{},{:.2},{},{},{},{},{},{}\n",
                    group_id,
                    hash_preview,
                    csv_field(&file.path.to_string_lossy()),
                    file.size,
                    file.size_mb(),
                    file.action,
                    file.priority_score,
                    csv_field(&file.reason),
                    csv_field(file.resolution.as_deref().unwrap_or(NOT_APPLICABLE)),
                    csv_field(file.exif_date.as_deref().unwrap_or(NOT_APPLICABLE)),
                    file.filename_score,
                ));
            }
        }

        out
    }

    /// Render the report and write it to a file.
    pub fn write_to_file(&self, result: &ScanResult, path: &Path) -> Result<(), ReportError> {
        let rendered = self.generate(result);
        let mut file = File::create(path).map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        file.write_all(rendered.as_bytes())
            .map_err(|source| ReportError::Write {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Quote a CSV field if it contains a delimiter, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Format a count with thousands separators: 1234567 -> "1,234,567"
fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
