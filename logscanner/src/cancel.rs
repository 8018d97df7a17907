use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag for soft cancellation.
///
/// Setting it stops the worker pool from taking new jobs off the queue.
/// Jobs already running are never interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Returns true for the first request only
    pub fn cancel(&self) -> bool {
        !self.flag.swap(true, Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
