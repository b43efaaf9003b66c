//! # cursor-momentum
//!
//! Inertial cursor glide. Raw relative pointer motion is sampled into short
//! windows, turned into a direction and speed, and once the hand stops the
//! pointer keeps coasting on that momentum with exponential decay.
//!
//! # Architecture
//!
//! ```text
//! cursor-momentum
//!   ├─> Momentum (sampler + decay integrator, shared state)
//!   ├─> Pointer (device seam, clamped virtual pointer)
//!   ├─> Host (tokio event loop, motion sources, trace simulation)
//!   └─> Config (TOML + CLI overrides)
//! ```
//!
//! # Data Flow
//!
//! **Input Path:** Source → HostEvent channel → Sampler → MomentumEstimate
//!
//! **Glide Path:** Clock → DecayIntegrator → PointerDevice → path output

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Configuration
pub mod config;

/// Host loop, motion sources and simulation
pub mod host;

/// Windowed momentum estimation and fixed-step decay
pub mod momentum;

/// Pointer device abstraction
pub mod pointer;

/// Utility functions
pub mod utils;

pub use config::Config;
pub use momentum::{MomentumEngine, MomentumParams, Phase};
