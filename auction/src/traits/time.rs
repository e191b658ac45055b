//! Time provider abstraction for testable time-dependent code.

use std::time::{SystemTime, UNIX_EPOCH};

/// Trait for providing the current wall-clock time.
///
/// This abstraction allows code that depends on the current time to be
/// tested with deterministic, controllable time values.
pub trait TimeProvider: Send + Sync {
    /// Returns the current Unix timestamp in milliseconds.
    fn now_millis(&self) -> u64;

    /// Returns the current Unix timestamp in seconds.
    fn now_unix(&self) -> u64 {
        self.now_millis() / 1000
    }
}

/// Production implementation that uses the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

impl SystemTimeProvider {
    pub const fn new() -> Self {
        Self
    }
}
