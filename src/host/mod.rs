//! Host environment around the momentum core
//!
//! Everything that touches the outside world lives here: the live event
//! loop, the motion sources that feed it, the monotonic clock, pointer
//! path output, and the deterministic trace simulator.
//!
//! # Architecture
//!
//! ```text
//! stdin / trace replay / Ctrl-C
//!   └─> mpsc<HostEvent>
//!       └─> HostRunner (single task, owns all state)
//!           ├─> MomentumEngine (sampler + integrator)
//!           ├─> PointerDevice
//!           └─> PathWriter
//! ```

mod clock;
mod error;
mod output;
mod runner;
mod simulation;
mod source;

pub use clock::MonotonicClock;
pub use error::{HostError, Result};
pub use output::{PathKind, PathRecord, PathWriter};
pub use runner::{HostRunner, RunSummary};
pub use simulation::{Simulation, SimulationReport, DEFAULT_SETTLE_LIMIT};
pub use source::{
    load_trace, parse_motion_line, parse_trace, spawn_line_source, spawn_shutdown_signal,
    spawn_stdin_source, spawn_trace_source, HostEvent, MotionLine, TraceRecord, MAX_MOTION_DELTA,
    MAX_TRACE_OFFSET,
};

/// Capacity of the host event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;
