//! Momentum estimation and decay
//!
//! The core of the glide. Two cooperating halves share one
//! [`MomentumState`]:
//!
//! - [`Sampler`] folds raw relative motion into short windows and turns
//!   each closed window into a [`MomentumEstimate`] (unit direction +
//!   speed).
//! - [`DecayIntegrator`] runs on a fixed 120 Hz step, decaying that speed
//!   and moving the pointer by `direction * speed`, but only once real
//!   input has been quiet for the gate period.
//!
//! # Data Flow
//!
//! ```text
//! DisplacementSample ──> Sampler ──flush──> MomentumEstimate
//!                                              │ direction, speed, last_update
//!                                              ▼
//!                 SimulationClock ──> DecayIntegrator ──> PointerDevice
//! ```
//!
//! # Phases
//!
//! | Phase  | Condition         | Host behaviour                |
//! |--------|-------------------|-------------------------------|
//! | Idle   | `speed < 1.0`     | block until the next event    |
//! | Active | `speed >= 1.0`    | tick every `time_step`        |
//!
//! A flush with enough speed re-arms `Active` at any time. Decay ends in
//! `Idle` after a bounded number of steps since `0.94^n` falls below
//! `1 / speed` for finite `n`.
//!
//! # Timing
//!
//! Every timestamp is a [`Duration`](std::time::Duration) on one
//! monotonic, nanosecond-resolution clock
//! ([`MonotonicClock`](crate::host::MonotonicClock) for live hosts).
//! Window length and gate are 24 ms and 32 ms.

mod clock;
mod engine;
mod integrator;
mod sampler;
mod state;
mod vec2;

use std::time::Duration;

pub use clock::SimulationClock;
pub use engine::{EngineStats, MomentumEngine};
pub use integrator::{DecayIntegrator, PassReport};
pub use sampler::{SampleOutcome, Sampler};
pub use state::{
    Accumulator, DisplacementSample, MomentumEstimate, MomentumParams, MomentumState, Phase,
};
pub use vec2::{Point, Vec2};

/// Sampling window; samples within this span of the window start are summed
pub const WINDOW: Duration = Duration::from_millis(24);

/// Window displacement (pixels) below which a window is treated as noise
pub const LENGTH_THRESHOLD: f32 = 6.0;

/// Gain from mean per-sample displacement to initial glide speed
pub const SPEED_GAIN: f32 = 4.0;

/// Per-step speed multiplier
pub const DECAY_FACTOR: f32 = 0.94;

/// Speed (pixels per step) below which the glide is at rest
pub const IDLE_SPEED: f32 = 1.0;

/// Quiet period after the last flush before the glide may move the pointer
pub const GATE: Duration = Duration::from_millis(32);

/// Fixed simulation step (120 Hz)
pub const TIME_STEP: Duration = Duration::from_nanos(1_000_000_000 / 120);

/// Most fixed steps a single pass may catch up after a stall
pub const MAX_STEPS_PER_SLICE: u32 = 4;
