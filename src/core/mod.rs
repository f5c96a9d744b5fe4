//! # Core Module
//!
//! The UI-agnostic deduplication engine.
//!
//! ## Modules
//! - `config` - scan configuration with fail-fast validation
//! - `scanner` - walks directories and groups files by content fingerprint
//! - `hasher` - chunked SHA-256 content fingerprinting
//! - `metadata` - image dimension and EXIF capture-date probing
//! - `priority` - scores duplicate groups and selects the keeper
//! - `reporter` - renders a scan result to a reviewable tabular report
//! - `deleter` - safety-checked, reversible deletion
//! - `cancel` - cooperative cancellation handle shared by long loops

pub mod cancel;
pub mod config;
pub mod deleter;
pub mod hasher;
pub mod metadata;
pub mod priority;
pub mod reporter;
pub mod scanner;

// Re-export commonly used types
pub use cancel::CancelToken;
pub use config::ScanConfig;
pub use deleter::{DeletionResult, SafeDeleter};
pub use hasher::ContentHasher;
pub use priority::PriorityEngine;
pub use reporter::ReportGenerator;
pub use scanner::{DuplicateGroup, DuplicateScanner, FileAction, FileEntry, ScanOutcome, ScanResult};
