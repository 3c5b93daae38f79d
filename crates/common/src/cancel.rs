//! Cooperative cancellation.
//!
//! Long-running work (document scans) polls a [`CancellationToken`] at
//! loop boundaries. Cancelling never interrupts a unit of work midway;
//! it only prevents the next one from starting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Clear a previous cancellation so the token can drive a new run.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
