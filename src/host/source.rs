//! Motion sources
//!
//! Each source runs as a tokio task and feeds [`HostEvent`]s into the host
//! loop's channel. Samples are stamped on the host's [`MonotonicClock`] as
//! they are delivered, so the sampler and the integrator agree on time.
//!
//! # Line format (stdin)
//!
//! ```text
//! 3 -1        # dx dy, whitespace separated
//! 4,0         # or comma separated
//! quit        # request shutdown
//! ```
//!
//! # Trace format
//!
//! JSON lines, timestamps relative to the start of the replay:
//!
//! ```text
//! {"dx": 10, "dy": 0, "t_ms": 0}
//! {"dx": 10, "dy": 0, "t_ms": 8}
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::clock::MonotonicClock;
use super::error::{HostError, Result};
use crate::momentum::DisplacementSample;

/// Event delivered to the host loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// One raw relative-motion event
    Motion(DisplacementSample),
    /// Shutdown requested
    Quit,
}

/// One recorded motion event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    /// Horizontal displacement
    pub dx: f32,
    /// Vertical displacement
    pub dy: f32,
    /// Milliseconds since the start of the trace
    pub t_ms: f64,
}

/// Largest displacement accepted from one motion event, per axis
pub const MAX_MOTION_DELTA: f32 = 1_000_000.0;

/// Latest timestamp accepted in a trace
pub const MAX_TRACE_OFFSET: Duration = Duration::from_secs(24 * 60 * 60);

fn delta_in_range(v: f32) -> bool {
    v.is_finite() && v.abs() <= MAX_MOTION_DELTA
}

impl TraceRecord {
    /// Offset from the start of the trace, clamped to `0..=MAX_TRACE_OFFSET`
    pub fn timestamp(&self) -> Duration {
        Duration::try_from_secs_f64(self.t_ms.max(0.0) / 1000.0)
            .unwrap_or(MAX_TRACE_OFFSET)
            .min(MAX_TRACE_OFFSET)
    }

    fn check(&self) -> std::result::Result<(), String> {
        if !delta_in_range(self.dx) || !delta_in_range(self.dy) {
            return Err(format!(
                "displacement ({}, {}) exceeds {} per axis",
                self.dx, self.dy, MAX_MOTION_DELTA
            ));
        }
        match Duration::try_from_secs_f64(self.t_ms / 1000.0) {
            Ok(offset) if offset <= MAX_TRACE_OFFSET => Ok(()),
            _ => Err(format!(
                "t_ms {} is outside 0..={}",
                self.t_ms,
                MAX_TRACE_OFFSET.as_millis()
            )),
        }
    }

    /// Sample stamped with the recorded time
    pub fn sample(&self) -> DisplacementSample {
        DisplacementSample::new(self.dx, self.dy, self.timestamp())
    }
}

/// Parse a JSON-lines trace, ordered by timestamp
///
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_trace(text: &str) -> Result<Vec<TraceRecord>> {
    let mut records = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let record: TraceRecord = serde_json::from_str(line).map_err(|source| {
            HostError::TraceParse {
                line: index + 1,
                source,
            }
        })?;
        record
            .check()
            .map_err(|reason| HostError::InvalidTraceRecord {
                line: index + 1,
                reason,
            })?;
        records.push(record);
    }

    records.sort_by(|a, b| a.t_ms.total_cmp(&b.t_ms));
    Ok(records)
}

/// Read and parse a trace file
pub fn load_trace(path: &Path) -> Result<Vec<TraceRecord>> {
    let text = std::fs::read_to_string(path).map_err(|source| HostError::TraceOpen {
        path: path.to_path_buf(),
        source,
    })?;

    let records = parse_trace(&text)?;
    info!("Loaded {} trace records from {}", records.len(), path.display());
    Ok(records)
}

/// One parsed input line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionLine {
    /// Relative displacement
    Motion(f32, f32),
    /// Shutdown request
    Quit,
    /// Nothing to do (blank or comment)
    Blank,
}

/// Parse one `dx dy` / `quit` line
pub fn parse_motion_line(text: &str, line: usize) -> Result<MotionLine> {
    let content = text.split('#').next().unwrap_or_default().trim();
    if content.is_empty() {
        return Ok(MotionLine::Blank);
    }
    if content.eq_ignore_ascii_case("quit") || content.eq_ignore_ascii_case("exit") {
        return Ok(MotionLine::Quit);
    }

    let invalid = || HostError::InvalidMotionLine {
        line,
        text: text.to_string(),
    };

    let mut fields = content
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|f| !f.is_empty());

    let dx = fields.next().and_then(|f| f.parse::<f32>().ok());
    let dy = fields.next().and_then(|f| f.parse::<f32>().ok());

    match (dx, dy, fields.next()) {
        (Some(dx), Some(dy), None) if delta_in_range(dx) && delta_in_range(dy) => {
            Ok(MotionLine::Motion(dx, dy))
        }
        _ => Err(invalid()),
    }
}

/// Feed motion lines from any async reader
///
/// Malformed lines are logged and skipped. End of input requests shutdown.
pub fn spawn_line_source<R>(
    reader: R,
    clock: MonotonicClock,
    tx: mpsc::Sender<HostEvent>,
) -> JoinHandle<Result<()>>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = reader.lines();
        let mut line_no = 0;

        while let Some(line) = lines.next_line().await? {
            line_no += 1;
            let event = match parse_motion_line(&line, line_no) {
                Ok(MotionLine::Motion(dx, dy)) => {
                    HostEvent::Motion(DisplacementSample::new(dx, dy, clock.now()))
                }
                Ok(MotionLine::Quit) => HostEvent::Quit,
                Ok(MotionLine::Blank) => continue,
                Err(e) => {
                    warn!("Skipping input: {}", e);
                    continue;
                }
            };

            tx.send(event).await.map_err(|_| HostError::ChannelClosed)?;
            if event == HostEvent::Quit {
                return Ok(());
            }
        }

        debug!("Input ended after {} lines", line_no);
        tx.send(HostEvent::Quit)
            .await
            .map_err(|_| HostError::ChannelClosed)
    })
}

/// Feed motion lines from standard input
pub fn spawn_stdin_source(clock: MonotonicClock, tx: mpsc::Sender<HostEvent>) -> JoinHandle<Result<()>> {
    spawn_line_source(BufReader::new(tokio::io::stdin()), clock, tx)
}

/// Replay a trace in real time, then request shutdown after `linger`
pub fn spawn_trace_source(
    records: Vec<TraceRecord>,
    clock: MonotonicClock,
    linger: Duration,
    tx: mpsc::Sender<HostEvent>,
) -> JoinHandle<Result<()>> {
    tokio::spawn(async move {
        for record in &records {
            tokio::time::sleep_until(clock.instant_at(record.timestamp())).await;
            let sample = DisplacementSample::new(record.dx, record.dy, clock.now());
            tx.send(HostEvent::Motion(sample))
                .await
                .map_err(|_| HostError::ChannelClosed)?;
        }

        debug!("Trace replay finished, lingering {:?}", linger);
        tokio::time::sleep(linger).await;
        tx.send(HostEvent::Quit)
            .await
            .map_err(|_| HostError::ChannelClosed)
    })
}

/// Turn Ctrl-C into a [`HostEvent::Quit`]
pub fn spawn_shutdown_signal(tx: mpsc::Sender<HostEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received shutdown signal");
                let _ = tx.send(HostEvent::Quit).await;
            }
            Err(e) => warn!("Cannot listen for Ctrl-C: {}", e),
        }
    })
}
