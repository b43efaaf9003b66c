//! Fixed-timestep decay integrator
//!
//! While the estimate carries enough speed, every `time_step` of real time
//! the integrator shrinks the speed geometrically and nudges the pointer by
//! `direction * speed`:
//!
//! ```text
//! speed    = speed * decay_factor
//! position = round(position + direction * speed)
//! ```
//!
//! # Gate
//!
//! Steps taken within `gate` of the last real-input flush are consumed
//! without moving anything. While the user's hand is on the device the
//! sampler keeps refreshing `last_update`, so the glide only starts once
//! input has gone quiet.
//!
//! # Rest
//!
//! Decay never reaches zero on its own. A step that drops speed below
//! `idle_speed` settles the integrator instead of writing, and the
//! simulation clock is paused until the next estimate revives it.

use std::time::Duration;

use tracing::{debug, trace, warn};

use super::clock::SimulationClock;
use super::state::{MomentumParams, MomentumState, Phase};
use crate::pointer::{PointerDevice, PointerError};

/// What one integration pass did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassReport {
    /// Fixed steps consumed from the time budget
    pub steps: u32,
    /// Steps skipped because real input was too recent
    pub gated: u32,
    /// Pointer writes performed
    pub writes: u32,
    /// The pass ended with the glide at rest
    pub settled: bool,
}

/// Decays momentum and moves the pointer on a fixed timestep
#[derive(Debug, Clone)]
pub struct DecayIntegrator {
    params: MomentumParams,
    clock: SimulationClock,
}

impl DecayIntegrator {
    /// Create an integrator at rest
    pub fn new(params: MomentumParams) -> Self {
        Self {
            clock: SimulationClock::new(&params),
            params,
        }
    }

    /// Tuning in use
    pub fn params(&self) -> &MomentumParams {
        &self.params
    }

    /// Fixed-step budget
    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Run every whole step of real time elapsed since the previous pass
    ///
    /// Idle state is a no-op that keeps the clock paused. On a pointer
    /// error the glide is halted and the error returned; the state is left
    /// at rest.
    pub fn advance<P>(
        &mut self,
        state: &mut MomentumState,
        now: Duration,
        pointer: &mut P,
    ) -> Result<PassReport, PointerError>
    where
        P: PointerDevice + ?Sized,
    {
        let mut report = PassReport::default();

        if state.phase(&self.params) == Phase::Idle {
            self.clock.pause();
            report.settled = true;
            return Ok(report);
        }

        self.clock.begin_pass(now);
        let quiet = now.saturating_sub(state.estimate.last_update);

        while self.clock.take_step() {
            report.steps += 1;

            if quiet < self.params.gate {
                report.gated += 1;
                continue;
            }

            state.estimate.speed *= self.params.decay_factor;
            if state.estimate.speed < self.params.idle_speed {
                debug!("Glide settled at speed {:.3}", state.estimate.speed);
                self.clock.pause();
                report.settled = true;
                return Ok(report);
            }

            if let Err(e) = self.step_pointer(state, pointer) {
                warn!("Pointer I/O failed, halting glide: {}", e);
                state.halt();
                self.clock.pause();
                return Err(e);
            }
            report.writes += 1;
        }

        Ok(report)
    }

    fn step_pointer<P>(&self, state: &MomentumState, pointer: &mut P) -> Result<(), PointerError>
    where
        P: PointerDevice + ?Sized,
    {
        let velocity = state.estimate.velocity();
        let current = pointer.position()?;
        let next = current.offset(velocity);

        trace!(
            "Decay step: speed={:.2} vel=({:.2}, {:.2}) ({}, {}) -> ({}, {})",
            state.estimate.speed,
            velocity.x,
            velocity.y,
            current.x,
            current.y,
            next.x,
            next.y
        );

        pointer.set_position(next)
    }
}

impl Default for DecayIntegrator {
    fn default() -> Self {
        Self::new(MomentumParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::momentum::{Point, Vec2};
    use crate::pointer::{ScreenBounds, VirtualPointer};
    use mockall::mock;

    mock! {
        Pointer {}
        impl PointerDevice for Pointer {
            fn position(&mut self) -> crate::pointer::Result<Point>;
            fn set_position(&mut self, position: Point) -> crate::pointer::Result<()>;
        }
    }

    fn gliding_state(speed: f32) -> MomentumState {
        let mut state = MomentumState::new();
        state.estimate.direction = Vec2::new(1.0, 0.0);
        state.estimate.speed = speed;
        state.estimate.last_update = Duration::ZERO;
        state
    }

    fn pointer() -> VirtualPointer {
        VirtualPointer::new(ScreenBounds::new(100_000, 1080), Point::new(500, 500))
    }

    /// Runs one pass per step, starting well past the gate
    fn run_steps(
        integrator: &mut DecayIntegrator,
        state: &mut MomentumState,
        pointer: &mut VirtualPointer,
        passes: u32,
    ) -> PassReport {
        let step = integrator.params().time_step;
        let start = Duration::from_secs(1);
        let mut total = PassReport::default();
        integrator.advance(state, start, pointer).unwrap();
        for i in 1..=passes {
            let report = integrator.advance(state, start + step * i, pointer).unwrap();
            total.steps += report.steps;
            total.gated += report.gated;
            total.writes += report.writes;
            total.settled = report.settled;
        }
        total
    }

    #[test]
    fn test_single_step_decays_and_moves() {
        let mut integrator = DecayIntegrator::default();
        let mut state = gliding_state(40.0);
        let mut pointer = pointer();

        let report = run_steps(&mut integrator, &mut state, &mut pointer, 1);

        assert_eq!(report.writes, 1);
        assert!((state.estimate.speed - 37.6).abs() < 1e-4);
        assert_eq!(pointer.current(), Point::new(538, 500));
    }

    #[test]
    fn test_glide_settles_within_sixty_steps() {
        let mut integrator = DecayIntegrator::default();
        let mut state = gliding_state(40.0);
        let mut pointer = pointer();

        let report = run_steps(&mut integrator, &mut state, &mut pointer, 80);

        // 40 * 0.94^59 >= 1.0 > 40 * 0.94^60
        assert_eq!(report.writes, 59);
        assert_eq!(report.steps, 60);
        assert_eq!(state.phase(integrator.params()), Phase::Idle);
        assert!(integrator.clock().is_paused());
    }

    #[test]
    fn test_no_writes_after_settling() {
        let mut integrator = DecayIntegrator::default();
        let mut state = gliding_state(40.0);
        let mut pointer = pointer();

        run_steps(&mut integrator, &mut state, &mut pointer, 80);
        let resting = pointer.current();
        let writes = pointer.write_count();

        let report = integrator
            .advance(&mut state, Duration::from_secs(10), &mut pointer)
            .unwrap();

        assert_eq!(report, PassReport { settled: true, ..PassReport::default() });
        assert_eq!(pointer.current(), resting);
        assert_eq!(pointer.write_count(), writes);
    }

    #[test]
    fn test_gate_blocks_steps_after_recent_input() {
        let mut integrator = DecayIntegrator::default();
        let mut state = gliding_state(40.0);
        let mut pointer = pointer();
        let step = integrator.params().time_step;

        state.estimate.last_update = Duration::from_millis(1000);
        integrator
            .advance(&mut state, Duration::from_millis(1000), &mut pointer)
            .unwrap();
        let report = integrator
            .advance(&mut state, Duration::from_millis(1000) + step * 3, &mut pointer)
            .unwrap();

        assert_eq!(report.steps, 3);
        assert_eq!(report.gated, 3);
        assert_eq!(report.writes, 0);
        assert_eq!(state.estimate.speed, 40.0);
        assert_eq!(pointer.write_count(), 0);
    }

    #[test]
    fn test_gate_opens_after_quiet_period() {
        let mut integrator = DecayIntegrator::default();
        let mut state = gliding_state(40.0);
        let mut pointer = pointer();
        let gate = integrator.params().gate;

        state.estimate.last_update = Duration::from_millis(1000);
        integrator
            .advance(&mut state, Duration::from_millis(1000) + gate, &mut pointer)
            .unwrap();
        let report = integrator
            .advance(
                &mut state,
                Duration::from_millis(1000) + gate + integrator.params().time_step,
                &mut pointer,
            )
            .unwrap();

        assert_eq!(report.gated, 0);
        assert_eq!(report.writes, 1);
    }

    #[test]
    fn test_stall_runs_at_most_four_steps() {
        let mut integrator = DecayIntegrator::default();
        let mut state = gliding_state(400.0);
        let mut pointer = pointer();

        integrator
            .advance(&mut state, Duration::from_secs(1), &mut pointer)
            .unwrap();
        let report = integrator
            .advance(&mut state, Duration::from_secs(3), &mut pointer)
            .unwrap();

        assert_eq!(report.steps, 4);
        assert_eq!(report.writes, 4);
        assert!(integrator.clock().leftover() < integrator.params().time_step);
    }

    #[test]
    fn test_zero_speed_never_touches_pointer() {
        let mut integrator = DecayIntegrator::default();
        let mut state = MomentumState::new();
        let mut mock = MockPointer::new();
        mock.expect_position().never();
        mock.expect_set_position().never();

        for i in 0..10 {
            let report = integrator
                .advance(&mut state, Duration::from_millis(100 * i), &mut mock)
                .unwrap();
            assert!(report.settled);
        }
    }

    #[test]
    fn test_pointer_failure_halts_glide() {
        let mut integrator = DecayIntegrator::default();
        let mut state = gliding_state(40.0);
        let mut mock = MockPointer::new();
        mock.expect_position()
            .times(1)
            .returning(|| Err(PointerError::Unavailable("display gone".to_string())));
        mock.expect_set_position().never();

        let step = integrator.params().time_step;
        integrator
            .advance(&mut state, Duration::from_secs(1), &mut mock)
            .unwrap();
        let result = integrator.advance(&mut state, Duration::from_secs(1) + step * 2, &mut mock);

        assert!(matches!(result, Err(PointerError::Unavailable(_))));
        assert_eq!(state.estimate.speed, 0.0);
        assert_eq!(state.phase(integrator.params()), Phase::Idle);
        assert!(integrator.clock().is_paused());
    }

    #[test]
    fn test_refresh_keeps_step_phase() {
        let mut integrator = DecayIntegrator::default();
        let mut state = gliding_state(40.0);
        let mut pointer = pointer();
        let step = integrator.params().time_step;
        let start = Duration::from_secs(1);

        integrator.advance(&mut state, start, &mut pointer).unwrap();
        integrator
            .advance(&mut state, start + step + step / 2, &mut pointer)
            .unwrap();
        let leftover = integrator.clock().leftover();

        state.estimate.speed = 50.0;
        state.estimate.direction = Vec2::new(0.0, 1.0);
        assert_eq!(integrator.clock().leftover(), leftover);

        // half a step carried over plus half a step of new time
        let report = integrator
            .advance(&mut state, start + step * 2, &mut pointer)
            .unwrap();

        assert_eq!(report.writes, 1);
        assert_eq!(pointer.current(), Point::new(538, 547));
    }
}
