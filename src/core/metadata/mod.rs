//! # Metadata Module
//!
//! Best-effort probing of image dimensions and EXIF capture dates.
//!
//! The priority engine treats both as optional scoring signals: a probe
//! that fails for any reason (corrupt file, unsupported format, missing
//! decoder) yields `None` and the corresponding bonus is simply zero.

use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Pluggable reader for image metadata.
///
/// Implement this to swap in a different decoder stack, or a stub in tests.
pub trait MediaProber: Send + Sync {
    /// Pixel dimensions as (width, height), if readable.
    fn dimensions(&self, path: &Path) -> Option<(u32, u32)>;

    /// Embedded original capture date, if present and readable.
    ///
    /// Returned in the raw EXIF form, `YYYY:MM:DD HH:MM:SS`.
    fn capture_date(&self, path: &Path) -> Option<String>;
}

/// Default prober built on the `image` and `kamadak-exif` crates.
pub struct ExifProber;

impl MediaProber for ExifProber {
    fn dimensions(&self, path: &Path) -> Option<(u32, u32)> {
        image::image_dimensions(path).ok()
    }

    fn capture_date(&self, path: &Path) -> Option<String> {
        let file = File::open(path).ok()?;
        let mut bufreader = BufReader::new(&file);
        let exif_reader = Reader::new().read_from_container(&mut bufreader).ok()?;

        let field = exif_reader.get_field(Tag::DateTimeOriginal, In::PRIMARY)?;
        if let Value::Ascii(ref vec) = field.value {
            let bytes = vec.first()?;
            let s = std::str::from_utf8(bytes).ok()?;
            let trimmed = s.trim_end_matches('\0').trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        None
    }
}
