//! Mock time provider for testing.

use crate::traits::TimeProvider;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Mock time provider with controllable time value.
#[derive(Debug, Clone)]
pub struct MockTime {
    current_millis: Arc<AtomicU64>,
}

impl MockTime {
    /// Create a new mock time provider starting at the specified Unix second.
    pub fn new(initial_time: u64) -> Self {
        Self {
            current_millis: Arc::new(AtomicU64::new(initial_time * 1000)),
        }
    }

    /// Create a mock time provider starting at a reasonable default (2024-01-01).
    pub fn default_time() -> Self {
        Self::new(1_704_067_200) // 2024-01-01 00:00:00 UTC
    }

    /// Set the current time to a specific Unix second.
    pub fn set(&self, timestamp: u64) {
        self.current_millis.store(timestamp * 1000, Ordering::SeqCst);
    }

    /// Advance time by the specified number of seconds.
    pub fn advance(&self, seconds: u64) {
        self.advance_millis(seconds * 1000);
    }

    /// Advance time by the specified number of milliseconds.
    pub fn advance_millis(&self, millis: u64) {
        self.current_millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Default for MockTime {
    fn default() -> Self {
        Self::default_time()
    }
}

impl TimeProvider for MockTime {
    fn now_millis(&self) -> u64 {
        self.current_millis.load(Ordering::SeqCst)
    }
}
