//! Cooperative cancellation for long-running loops.
//!
//! Both the scanner and the deleter check the flag at loop boundaries and
//! return whatever partial result has accumulated. Cancellation is prompt,
//! not instantaneous; a file mid-removal is always finished first.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable cancellation handle.
///
/// Hand a clone to the UI thread; the engine polls `is_cancelled()`.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
