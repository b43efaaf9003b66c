//! Sampler + integrator behind one owner
//!
//! Hosts (the live loop and the simulator) drive the glide through
//! [`MomentumEngine`]: fold every pending sample with [`ingest`], then run
//! one integration pass with [`tick`]. Keeping that order inside one type
//! guarantees a flush is visible to the very next pass.
//!
//! [`ingest`]: MomentumEngine::ingest
//! [`tick`]: MomentumEngine::tick

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use super::integrator::{DecayIntegrator, PassReport};
use super::sampler::{SampleOutcome, Sampler};
use super::state::{DisplacementSample, MomentumParams, MomentumState, Phase};
use crate::pointer::{PointerDevice, PointerError};

/// Running totals for one engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EngineStats {
    /// Non-zero samples folded
    pub samples: u64,
    /// Zero samples dropped
    pub ignored: u64,
    /// Windows flushed
    pub flushes: u64,
    /// Idle -> Active transitions
    pub glides: u64,
    /// Fixed steps consumed
    pub steps: u64,
    /// Steps held back by the input gate
    pub gated_steps: u64,
    /// Pointer writes
    pub writes: u64,
    /// Integration passes aborted by pointer errors
    pub pointer_errors: u64,
}

/// Owns the momentum state and both halves of the simulation
#[derive(Debug, Clone)]
pub struct MomentumEngine {
    state: MomentumState,
    sampler: Sampler,
    integrator: DecayIntegrator,
    stats: EngineStats,
}

impl MomentumEngine {
    /// Create an engine at rest
    pub fn new(params: MomentumParams) -> Self {
        Self {
            state: MomentumState::new(),
            sampler: Sampler::new(params),
            integrator: DecayIntegrator::new(params),
            stats: EngineStats::default(),
        }
    }

    /// Fold one raw sample
    pub fn ingest(&mut self, sample: DisplacementSample) -> SampleOutcome {
        let was = self.phase();
        let outcome = self.sampler.on_sample(&mut self.state, sample);

        match outcome {
            SampleOutcome::Ignored => self.stats.ignored += 1,
            SampleOutcome::Accumulated => self.stats.samples += 1,
            SampleOutcome::Flushed(estimate) => {
                self.stats.samples += 1;
                self.stats.flushes += 1;
                if was == Phase::Idle && self.phase() == Phase::Active {
                    self.stats.glides += 1;
                    info!(
                        "Glide armed: speed={:.1} dir=({:.2}, {:.2})",
                        estimate.speed, estimate.direction.x, estimate.direction.y
                    );
                }
            }
        }

        outcome
    }

    /// Run one integration pass at `now`
    pub fn tick<P>(&mut self, now: Duration, pointer: &mut P) -> Result<PassReport, PointerError>
    where
        P: PointerDevice + ?Sized,
    {
        let result = self.integrator.advance(&mut self.state, now, pointer);

        match &result {
            Ok(report) => {
                self.stats.steps += report.steps as u64;
                self.stats.gated_steps += report.gated as u64;
                self.stats.writes += report.writes as u64;
                if report.settled && report.steps > 0 {
                    debug!("Glide at rest after {} writes", self.stats.writes);
                }
            }
            Err(_) => self.stats.pointer_errors += 1,
        }

        result
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.state.phase(self.integrator.params())
    }

    /// Momentum state
    pub fn state(&self) -> &MomentumState {
        &self.state
    }

    /// Tuning in use
    pub fn params(&self) -> &MomentumParams {
        self.integrator.params()
    }

    /// Running totals
    pub fn stats(&self) -> EngineStats {
        self.stats
    }
}

impl Default for MomentumEngine {
    fn default() -> Self {
        Self::new(MomentumParams::default())
    }
}
