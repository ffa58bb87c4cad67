//! Cooperative cancellation for rule evaluation.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering}
    },
    time::{Duration, Instant}
};

/// A cancellation token that can be shared across threads.
///
/// The engine checks it before every rule. A token with a deadline reports
/// itself cancelled once the deadline has passed.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    deadline:  Option<Instant>
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token that expires `timeout` from now.
    pub fn with_deadline(timeout: Duration) -> Self {
        Self {
            cancelled: Arc::default(),
            deadline:  Instant::now().checked_add(timeout)
        }
    }

    /// Signal cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
            || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}
