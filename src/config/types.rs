//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level ("trace", "debug", "info", "warn", "error")
    pub level: String,

    /// Log format ("pretty", "compact", "json")
    pub format: String,

    /// Also write logs to this file (None = console only)
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            log_file: None,
        }
    }
}

/// Virtual pointer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    /// Initial X position (pixels)
    pub start_x: i32,

    /// Initial Y position (pixels)
    pub start_y: i32,

    /// Screen width (pixels)
    pub screen_width: u32,

    /// Screen height (pixels)
    pub screen_height: u32,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            start_x: 960,
            start_y: 540,
            screen_width: 1920,
            screen_height: 1080,
        }
    }
}

/// Where raw motion comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    /// `dx dy` lines on standard input, stamped on arrival
    #[default]
    Stdin,

    /// Recorded JSON-lines trace replayed in real time
    Trace,
}

impl InputSource {
    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Stdin => "Live motion lines from standard input",
            Self::Trace => "Recorded trace replayed in real time",
        }
    }
}

impl std::fmt::Display for InputSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdin => write!(f, "stdin"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

impl std::str::FromStr for InputSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stdin" | "-" | "live" => Ok(Self::Stdin),
            "trace" | "replay" | "file" => Ok(Self::Trace),
            _ => Err(format!("Unknown input source: {}", s)),
        }
    }
}

/// Input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Motion source
    pub source: InputSource,

    /// Trace file for the trace source
    pub trace_path: Option<PathBuf>,

    /// How long to keep running after a trace ends (ms), so the glide can settle
    pub linger_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            source: InputSource::Stdin,
            trace_path: None,
            linger_ms: 1000,
        }
    }
}

/// Pointer path output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Write the pointer path here (None = standard output)
    pub path_file: Option<PathBuf>,

    /// Emit pointer path records at all
    pub record_path: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path_file: None,
            record_path: true,
        }
    }
}
