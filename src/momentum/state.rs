//! Momentum state shared by the sampler and the integrator
//!
//! Everything the estimator and the decay loop touch lives in one owned
//! [`MomentumState`]. The host loop holds it and lends `&mut` access to
//! [`Sampler`](super::Sampler) and [`DecayIntegrator`](super::DecayIntegrator)
//! in turn, so there is no ambient global state and no locking.

use std::time::Duration;

use super::vec2::Vec2;
use super::{
    DECAY_FACTOR, GATE, IDLE_SPEED, LENGTH_THRESHOLD, MAX_STEPS_PER_SLICE, SPEED_GAIN, TIME_STEP,
    WINDOW,
};

/// One raw relative-motion event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplacementSample {
    /// Horizontal displacement in device counts
    pub dx: f32,
    /// Vertical displacement in device counts
    pub dy: f32,
    /// Arrival time on the host's monotonic clock
    pub t: Duration,
}

impl DisplacementSample {
    /// Create a sample
    pub fn new(dx: f32, dy: f32, t: Duration) -> Self {
        Self { dx, dy, t }
    }

    /// Displacement as a vector
    pub fn delta(&self) -> Vec2 {
        Vec2::new(self.dx, self.dy)
    }
}

/// Running sum of displacements since the last flush
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Accumulator {
    /// Sum of all displacements folded into the current window
    pub sum: Vec2,
    /// Number of samples folded into the current window
    pub sample_count: u32,
    /// When the current window opened
    pub window_start: Duration,
}

impl Accumulator {
    /// True when no sample has been folded since the last flush
    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }
}

/// Decayable momentum driving cursor motion
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MomentumEstimate {
    /// Unit direction, or zero when the last window summed to zero
    pub direction: Vec2,
    /// Non-negative speed in pixels per tick
    pub speed: f32,
    /// When the estimate was last refreshed by real input
    pub last_update: Duration,
}

impl MomentumEstimate {
    /// Velocity for the next tick
    pub fn velocity(&self) -> Vec2 {
        self.direction.scale(self.speed)
    }
}

/// Tuning for estimation and decay
///
/// These are fixed for the life of the process; [`Default`] carries the
/// shipped values. Tests construct variants directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MomentumParams {
    /// Sampling window length
    pub window: Duration,
    /// Window displacement below which the window counts as noise
    pub length_threshold: f32,
    /// Multiplier from mean per-sample displacement to initial speed
    pub speed_gain: f32,
    /// Per-step multiplicative speed decay
    pub decay_factor: f32,
    /// Speed below which the glide is at rest
    pub idle_speed: f32,
    /// Quiet period after real input before the glide may move the cursor
    pub gate: Duration,
    /// Fixed simulation step
    pub time_step: Duration,
    /// Most steps a single real-time slice may catch up
    pub max_steps_per_slice: u32,
}

impl Default for MomentumParams {
    fn default() -> Self {
        Self {
            window: WINDOW,
            length_threshold: LENGTH_THRESHOLD,
            speed_gain: SPEED_GAIN,
            decay_factor: DECAY_FACTOR,
            idle_speed: IDLE_SPEED,
            gate: GATE,
            time_step: TIME_STEP,
            max_steps_per_slice: MAX_STEPS_PER_SLICE,
        }
    }
}

impl MomentumParams {
    /// Longest slice of real time one integration pass will simulate
    pub fn max_slice(&self) -> Duration {
        self.time_step * self.max_steps_per_slice
    }
}

/// Integrator phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// At rest; no cursor writes, the host may block
    Idle,
    /// Gliding; the host must keep ticking
    Active,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Active => write!(f, "Active"),
        }
    }
}

/// Accumulator and estimate, owned by the host loop
#[derive(Debug, Clone, Default)]
pub struct MomentumState {
    /// Samples of the window in progress
    pub accumulator: Accumulator,
    /// Latest flushed estimate, decayed in place by the integrator
    pub estimate: MomentumEstimate,
}

impl MomentumState {
    /// Zeroed state, as at process start
    pub fn new() -> Self {
        Self::default()
    }

    /// Phase implied by the current estimate
    pub fn phase(&self, params: &MomentumParams) -> Phase {
        if self.estimate.speed >= params.idle_speed {
            Phase::Active
        } else {
            Phase::Idle
        }
    }

    /// Drop any remaining momentum, leaving the accumulator untouched
    pub fn halt(&mut self) {
        self.estimate.speed = 0.0;
        self.estimate.direction = Vec2::ZERO;
    }
}
