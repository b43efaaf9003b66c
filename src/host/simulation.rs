//! Deterministic trace simulation
//!
//! Runs the same engine as the live loop against a recorded trace on a
//! virtual clock. Virtual time advances one host iteration at a time while
//! the glide is active and jumps straight to the next sample while it is
//! idle, mirroring the live loop blocking on its event channel.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use super::output::{PathKind, PathRecord};
use super::source::TraceRecord;
use crate::momentum::{EngineStats, MomentumEngine, Phase, Point};
use crate::pointer::PointerDevice;

/// Default cap on virtual time spent after the last sample
pub const DEFAULT_SETTLE_LIMIT: Duration = Duration::from_secs(5);

/// Result of one simulation
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    /// Pointer path, input and glide moves in time order
    pub path: Vec<PathRecord>,
    /// Engine totals
    pub stats: EngineStats,
    /// Pointer position when the simulation ended
    pub final_position: Option<Point>,
    /// Virtual time at the end
    pub elapsed: Duration,
    /// The glide was still active when the settle limit hit
    pub truncated: bool,
}

/// Virtual-clock driver for a [`MomentumEngine`]
#[derive(Debug)]
pub struct Simulation<P> {
    engine: MomentumEngine,
    pointer: P,
    iteration: Duration,
    settle_limit: Duration,
}

impl<P: PointerDevice> Simulation<P> {
    /// Create a simulation advancing `iteration` of virtual time per active host iteration
    pub fn new(engine: MomentumEngine, pointer: P, iteration: Duration) -> Self {
        Self {
            engine,
            pointer,
            iteration: iteration.max(Duration::from_micros(1)),
            settle_limit: DEFAULT_SETTLE_LIMIT,
        }
    }

    /// Stop this long after the last sample even if the glide is still active
    pub fn with_settle_limit(mut self, limit: Duration) -> Self {
        self.settle_limit = limit;
        self
    }

    /// Replay `records` (ordered by time) and return the resulting path
    pub fn run(mut self, records: &[TraceRecord]) -> SimulationReport {
        let deadline = records
            .last()
            .map(TraceRecord::timestamp)
            .unwrap_or_default()
            + self.settle_limit;

        let mut path = Vec::new();
        let mut next = 0;
        let mut now = records.first().map(TraceRecord::timestamp).unwrap_or_default();
        let mut truncated = false;

        loop {
            while let Some(record) = records.get(next).filter(|r| r.timestamp() <= now) {
                let sample = record.sample();
                self.pointer.follow_input(sample.delta());
                self.engine.ingest(sample);
                if let Ok(position) = self.pointer.position() {
                    path.push(PathRecord::new(sample.t, position, PathKind::Input));
                }
                next += 1;
            }

            if self.engine.phase() == Phase::Active {
                match self.engine.tick(now, &mut self.pointer) {
                    Ok(report) if report.writes > 0 => {
                        if let Ok(position) = self.pointer.position() {
                            path.push(PathRecord::new(now, position, PathKind::Glide));
                        }
                    }
                    Ok(_) => {}
                    Err(e) => debug!("Glide pass aborted at {:?}: {}", now, e),
                }
            }

            match (self.engine.phase(), records.get(next)) {
                (Phase::Idle, None) => break,
                (Phase::Idle, Some(record)) => now = now.max(record.timestamp()),
                (Phase::Active, _) => now += self.iteration,
            }

            if now > deadline {
                warn!("Simulation hit the settle limit with the glide still active");
                truncated = true;
                break;
            }
        }

        let stats = self.engine.stats();
        debug!(
            "Simulation done at {:?}: {} samples, {} writes",
            now, stats.samples, stats.writes
        );

        SimulationReport {
            path,
            stats,
            final_position: self.pointer.position().ok(),
            elapsed: now,
            truncated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::momentum::TIME_STEP;
    use crate::pointer::{ScreenBounds, VirtualPointer};

    fn record(dx: f32, dy: f32, t_ms: f64) -> TraceRecord {
        TraceRecord { dx, dy, t_ms }
    }

    fn simulation() -> Simulation<VirtualPointer> {
        let pointer = VirtualPointer::new(ScreenBounds::new(10_000, 10_000), Point::new(5000, 5000));
        Simulation::new(MomentumEngine::default(), pointer, TIME_STEP)
    }

    #[test]
    fn test_empty_trace() {
        let report = simulation().run(&[]);
        assert!(report.path.is_empty());
        assert_eq!(report.final_position, Some(Point::new(5000, 5000)));
        assert!(!report.truncated);
    }

    #[test]
    fn test_slow_drag_does_not_glide() {
        // 1 px per 10 ms stays under the noise threshold in every window
        let records: Vec<_> = (0..30).map(|i| record(1.0, 0.0, i as f64 * 10.0)).collect();

        let report = simulation().run(&records);

        assert_eq!(report.stats.writes, 0);
        assert_eq!(report.stats.glides, 0);
        assert_eq!(report.final_position, Some(Point::new(5030, 5000)));
        assert!(report.path.iter().all(|r| r.kind == PathKind::Input));
    }

    #[test]
    fn test_flick_glides_then_rests() {
        let records: Vec<_> = (0..12)
            .map(|i| record(0.0, -20.0, i as f64 * 4.0))
            .collect();

        let report = simulation().run(&records);

        assert!(!report.truncated);
        assert!(report.stats.writes > 0);
        let end = report.final_position.unwrap();
        assert!(end.y < 5000 - 240, "glide did not carry: {:?}", end);
        assert_eq!(end.x, 5000);

        // glide moves come after the last input, and monotonically upward
        let glide: Vec<_> = report
            .path
            .iter()
            .filter(|r| r.kind == PathKind::Glide)
            .collect();
        assert!(glide.first().unwrap().t_ms >= 44.0);
        assert!(glide.windows(2).all(|w| w[1].y <= w[0].y));
    }

    #[test]
    fn test_settle_limit_truncates() {
        let records: Vec<_> = (0..12)
            .map(|i| record(40.0, 0.0, i as f64 * 4.0))
            .collect();

        let report = simulation()
            .with_settle_limit(Duration::from_millis(50))
            .run(&records);

        assert!(report.truncated);
        assert!(report.elapsed <= Duration::from_millis(44 + 50) + TIME_STEP);
    }
}
