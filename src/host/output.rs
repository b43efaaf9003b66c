//! Pointer path output
//!
//! One JSON object per line:
//!
//! ```text
//! {"t_ms":1012.0,"x":968,"y":540,"kind":"input"}
//! {"t_ms":1075.3,"x":1006,"y":540,"kind":"glide"}
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::Result;
use crate::config::OutputConfig;
use crate::momentum::Point;

/// What moved the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    /// The user's own motion
    Input,
    /// A glide pass
    Glide,
}

/// Pointer position at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathRecord {
    /// Clock offset in milliseconds
    pub t_ms: f64,
    /// X coordinate
    pub x: i32,
    /// Y coordinate
    pub y: i32,
    /// What moved the pointer
    pub kind: PathKind,
}

impl PathRecord {
    /// Create a record at clock offset `t`
    pub fn new(t: Duration, position: Point, kind: PathKind) -> Self {
        Self {
            t_ms: t.as_nanos() as f64 / 1_000_000.0,
            x: position.x,
            y: position.y,
            kind,
        }
    }

    /// Position as a point
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// JSON-lines sink for path records
pub struct PathWriter {
    out: Box<dyn Write + Send>,
    written: u64,
}

impl PathWriter {
    /// Write to standard output
    pub fn stdout() -> Self {
        Self::from_writer(std::io::stdout())
    }

    /// Create (or truncate) a file
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::from_writer(file))
    }

    /// Writer for the configured path output
    ///
    /// `None` when `record_path` is off. Without a `path_file` records go
    /// to standard output.
    pub fn from_config(config: &OutputConfig) -> Result<Option<Self>> {
        if !config.record_path {
            return Ok(None);
        }
        match &config.path_file {
            Some(path) => Ok(Some(Self::create(path)?)),
            None => Ok(Some(Self::stdout())),
        }
    }

    /// Wrap any writer
    pub fn from_writer(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Box::new(BufWriter::new(out)),
            written: 0,
        }
    }

    /// Append one record
    pub fn write(&mut self, record: &PathRecord) -> Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Flush and return the number of records written
    pub fn finish(mut self) -> Result<u64> {
        self.out.flush()?;
        Ok(self.written)
    }
}

impl std::fmt::Debug for PathWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathWriter")
            .field("written", &self.written)
            .finish()
    }
}
