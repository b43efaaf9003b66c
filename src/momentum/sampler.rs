//! Windowed sampling estimator
//!
//! Raw relative motion arrives in irregular micro-bursts. Rather than
//! deriving a velocity per event, samples are summed over a short fixed
//! window and turned into one estimate when the window closes:
//!
//! ```text
//! len       = |sum|                      (0 when below the noise threshold or not finite)
//! speed     = len / sample_count * gain
//! direction = sum / |sum|                (0 when len is 0)
//! ```
//!
//! # Window boundary
//!
//! A window closes when a sample arrives more than `window` after the
//! window opened. That sample is *not* part of the closing window: the
//! accumulated window is flushed first and the sample opens the next one.

use std::time::Duration;

use tracing::{debug, trace};

use super::state::{DisplacementSample, MomentumEstimate, MomentumParams, MomentumState};
use super::vec2::Vec2;

/// What a single sample did to the state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleOutcome {
    /// Zero displacement, nothing changed
    Ignored,
    /// Folded into the open window
    Accumulated,
    /// Closed the previous window, producing this estimate, then opened a new one
    Flushed(MomentumEstimate),
}

/// Converts raw displacement samples into momentum estimates
#[derive(Debug, Clone)]
pub struct Sampler {
    params: MomentumParams,
}

impl Sampler {
    /// Create a sampler with the given tuning
    pub fn new(params: MomentumParams) -> Self {
        Self { params }
    }

    /// Tuning in use
    pub fn params(&self) -> &MomentumParams {
        &self.params
    }

    /// Fold one raw input event into the state
    pub fn on_sample(&self, state: &mut MomentumState, sample: DisplacementSample) -> SampleOutcome {
        let delta = sample.delta();
        if delta.is_zero() {
            trace!("Ignoring zero displacement at {:?}", sample.t);
            return SampleOutcome::Ignored;
        }

        let since_open = sample.t.saturating_sub(state.accumulator.window_start);
        if since_open <= self.params.window {
            let acc = &mut state.accumulator;
            acc.sum += delta;
            acc.sample_count += 1;
            trace!(
                "Sample ({}, {}) -> window sum ({:.1}, {:.1}) n={}",
                sample.dx,
                sample.dy,
                acc.sum.x,
                acc.sum.y,
                acc.sample_count
            );
            return SampleOutcome::Accumulated;
        }

        let estimate = self.flush(state, sample.t);
        state.accumulator.sum = delta;
        state.accumulator.sample_count = 1;
        SampleOutcome::Flushed(estimate)
    }

    /// Close the open window, replace the estimate, and start an empty window at `now`
    ///
    /// An empty window yields a zero estimate.
    pub fn flush(&self, state: &mut MomentumState, now: Duration) -> MomentumEstimate {
        let acc = state.accumulator;

        // an overflowed sum is treated like noise: no glide, no direction
        let mut len = acc.sum.length();
        if !len.is_finite() || len < self.params.length_threshold {
            len = 0.0;
        }

        let mut speed = if acc.sample_count > 0 {
            len / acc.sample_count as f32 * self.params.speed_gain
        } else {
            0.0
        };
        if !speed.is_finite() {
            speed = 0.0;
        }

        let direction = if len > 0.0 { acc.sum.normalized() } else { Vec2::ZERO };

        let estimate = MomentumEstimate {
            direction,
            speed,
            last_update: now,
        };

        debug!(
            "Flush at {:?}: accumulated=({:.1}, {:.1}) len={:.2} samples={} speed={:.2}",
            now,
            acc.sum.x,
            acc.sum.y,
            len,
            acc.sample_count,
            speed
        );

        state.estimate = estimate;
        state.accumulator.sum = Vec2::ZERO;
        state.accumulator.sample_count = 0;
        state.accumulator.window_start = now;

        estimate
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new(MomentumParams::default())
    }
}
