//! Fixed-step simulation clock
//!
//! The sampling window, the input gate and the fixed-step budget are all
//! measured on one clock: a [`Duration`] offset from a monotonic origin.
//! Live hosts read it from [`crate::host::MonotonicClock`]; simulations
//! hand the engine virtual offsets directly.

use std::time::Duration;

use super::state::MomentumParams;

/// Fixed-step time budget
///
/// Real time is fed in per pass and consumed one `time_step` at a time.
/// A pass never accrues more than `max_slice` of real time, so a stall
/// (suspended process, minimized window) cannot trigger a burst of
/// catch-up steps.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    time_step: Duration,
    max_slice: Duration,
    last_pass: Option<Duration>,
    leftover: Duration,
}

impl SimulationClock {
    /// Create a paused clock
    pub fn new(params: &MomentumParams) -> Self {
        Self {
            time_step: params.time_step,
            max_slice: params.max_slice(),
            last_pass: None,
            leftover: Duration::ZERO,
        }
    }

    /// Credit the real time elapsed since the previous pass
    ///
    /// The first pass after [`pause`](Self::pause) only records `now`.
    /// Returns the credited (clamped) slice.
    pub fn begin_pass(&mut self, now: Duration) -> Duration {
        let slice = match self.last_pass {
            Some(last) => now.saturating_sub(last).min(self.max_slice),
            None => Duration::ZERO,
        };
        self.last_pass = Some(now);
        self.leftover += slice;
        slice
    }

    /// Consume one step from the budget if a whole step is available
    pub fn take_step(&mut self) -> bool {
        if self.leftover >= self.time_step {
            self.leftover -= self.time_step;
            true
        } else {
            false
        }
    }

    /// Forget the previous pass and drop any leftover budget
    pub fn pause(&mut self) {
        self.last_pass = None;
        self.leftover = Duration::ZERO;
    }

    /// True when no pass has been recorded since the last pause
    pub fn is_paused(&self) -> bool {
        self.last_pass.is_none()
    }

    /// Unspent budget, always below one step between passes
    pub fn leftover(&self) -> Duration {
        self.leftover
    }
}
