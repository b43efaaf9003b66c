//! Live host loop
//!
//! One cooperative loop owns the [`MomentumEngine`] and the pointer:
//!
//! ```text
//! loop {
//!     drain pending events (non-blocking)  ── Quit ──> exit
//!     Active: run one integration pass, then wait for an event or one step
//!     Idle:   block until the next event
//! }
//! ```
//!
//! Motion is folded into the sampler before the next pass runs, so a
//! flush is always visible to the integrator on the following iteration.

use std::ops::ControlFlow;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{debug, info};

use super::clock::MonotonicClock;
use super::error::Result;
use super::output::{PathKind, PathRecord, PathWriter};
use super::source::HostEvent;
use crate::momentum::{EngineStats, MomentumEngine, Phase, Point};
use crate::pointer::PointerDevice;

/// Totals reported when the loop exits
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Wall time the loop ran
    pub elapsed: Duration,
    /// Engine totals
    pub stats: EngineStats,
    /// Pointer position at exit, if readable
    pub final_position: Option<Point>,
    /// Path records written
    pub path_records: u64,
}

/// Drives a [`MomentumEngine`] from live events
#[derive(Debug)]
pub struct HostRunner<P> {
    engine: MomentumEngine,
    pointer: P,
    clock: MonotonicClock,
    path: Option<PathWriter>,
}

impl<P: PointerDevice> HostRunner<P> {
    /// Create a runner
    pub fn new(engine: MomentumEngine, pointer: P, clock: MonotonicClock) -> Self {
        Self {
            engine,
            pointer,
            clock,
            path: None,
        }
    }

    /// Record the pointer path
    pub fn with_path_writer(mut self, writer: PathWriter) -> Self {
        self.path = Some(writer);
        self
    }

    /// Run until a quit event, or until every sender is gone and the glide has settled
    pub async fn run(mut self, mut events: mpsc::Receiver<HostEvent>) -> Result<RunSummary> {
        info!("Host loop started");
        let step = self.engine.params().time_step;
        let mut open = true;

        'outer: loop {
            loop {
                match events.try_recv() {
                    Ok(event) => {
                        if self.handle(event)?.is_break() {
                            break 'outer;
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        open = false;
                        break;
                    }
                }
            }

            match self.engine.phase() {
                Phase::Active => {
                    self.tick()?;

                    if open {
                        tokio::select! {
                            event = events.recv() => match event {
                                Some(event) => {
                                    if self.handle(event)?.is_break() {
                                        break 'outer;
                                    }
                                }
                                None => open = false,
                            },
                            _ = tokio::time::sleep(step) => {}
                        }
                    } else {
                        tokio::time::sleep(step).await;
                    }
                }
                Phase::Idle => {
                    if !open {
                        debug!("All sources closed and glide at rest");
                        break;
                    }
                    match events.recv().await {
                        Some(event) => {
                            if self.handle(event)?.is_break() {
                                break;
                            }
                        }
                        None => open = false,
                    }
                }
            }
        }

        self.finish()
    }

    fn handle(&mut self, event: HostEvent) -> Result<ControlFlow<()>> {
        match event {
            HostEvent::Motion(sample) => {
                self.pointer.follow_input(sample.delta());
                self.engine.ingest(sample);
                self.record(sample.t, PathKind::Input)?;
                Ok(ControlFlow::Continue(()))
            }
            HostEvent::Quit => {
                info!("Quit requested");
                Ok(ControlFlow::Break(()))
            }
        }
    }

    fn tick(&mut self) -> Result<()> {
        let now = self.clock.now();
        match self.engine.tick(now, &mut self.pointer) {
            Ok(report) if report.writes > 0 => self.record(now, PathKind::Glide),
            Ok(_) => Ok(()),
            // already logged and halted by the integrator; keep serving input
            Err(e) => {
                debug!("Glide pass aborted: {}", e);
                Ok(())
            }
        }
    }

    fn record(&mut self, t: Duration, kind: PathKind) -> Result<()> {
        let Some(writer) = self.path.as_mut() else {
            return Ok(());
        };
        if let Ok(position) = self.pointer.position() {
            writer.write(&PathRecord::new(t, position, kind))?;
        }
        Ok(())
    }

    fn finish(mut self) -> Result<RunSummary> {
        let path_records = match self.path.take() {
            Some(writer) => writer.finish()?,
            None => 0,
        };

        let summary = RunSummary {
            elapsed: self.clock.now(),
            stats: self.engine.stats(),
            final_position: self.pointer.position().ok(),
            path_records,
        };

        info!(
            "Host loop stopped: {} samples, {} flushes, {} glides, {} pointer writes",
            summary.stats.samples, summary.stats.flushes, summary.stats.glides, summary.stats.writes
        );
        Ok(summary)
    }
}
