//! Live host time source

use std::time::Duration;

use tokio::time::Instant;

/// Monotonic, nanosecond-resolution time since an origin
///
/// Backed by [`tokio::time::Instant`] so that hosts under a paused test
/// runtime see the same virtual time their sleeps do.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Start a clock at the current instant
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Time elapsed since the origin
    pub fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    /// Instant corresponding to a clock offset
    pub fn instant_at(&self, offset: Duration) -> Instant {
        self.origin + offset
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}
