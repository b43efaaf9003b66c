//! Host error types

use std::path::PathBuf;

use thiserror::Error;

/// Result type for host operations
pub type Result<T> = std::result::Result<T, HostError>;

/// Failures at the host boundary (input sources, output, pointer)
#[derive(Error, Debug)]
pub enum HostError {
    /// Trace file could not be opened
    #[error("Failed to open trace {}: {source}", .path.display())]
    TraceOpen {
        /// Trace path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Trace record could not be parsed
    #[error("Invalid trace record on line {line}: {source}")]
    TraceParse {
        /// 1-based line number
        line: usize,
        /// Underlying error
        source: serde_json::Error,
    },

    /// Trace record parsed but holds values the glide cannot use
    #[error("Invalid trace record on line {line}: {reason}")]
    InvalidTraceRecord {
        /// 1-based line number
        line: usize,
        /// What is wrong with it
        reason: String,
    },

    /// Motion line was neither `dx dy` nor a command
    #[error("Invalid motion line {line}: {text:?}")]
    InvalidMotionLine {
        /// 1-based line number
        line: usize,
        /// Offending text
        text: String,
    },

    /// Path record could not be encoded
    #[error("Failed to encode path record: {0}")]
    Encode(#[from] serde_json::Error),

    /// Event channel closed while sending
    #[error("Event channel closed")]
    ChannelClosed,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
