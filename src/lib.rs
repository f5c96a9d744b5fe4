//! # Duplicate File Cleaner
//!
//! A cautious duplicate file cleaner that explains which copy it keeps and why.
//!
//! ## Core Philosophy
//! - **Never delete blind** - every removal is re-verified against the file on disk
//! - **Show WHY** - every keeper choice comes with a scoring rationale
//! - **Always reversible** - files go to the recycle bin, never straight to oblivion
//!
//! ## Architecture
//! The library is split into a core engine (UI-agnostic) and presentation layers:
//! - `core` - scanning, grouping, keeper selection, reporting, safe deletion
//! - `events` - event-driven progress reporting (GUI-ready)
//! - `error` - user-friendly error types
//! - `cli` - command-line interface

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{DedupError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default tracing subscriber");
}
