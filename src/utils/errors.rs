//! User-Friendly Error Formatting
//!
//! Turns startup failures into a message with likely causes and what to
//! try next, followed by the full error chain.

use std::fmt::Write;

use crate::host::HostError;
use crate::pointer::PointerError;

/// Broad failure area, used to pick the troubleshooting text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Config file missing, unreadable, or invalid
    Config,
    /// Trace file missing or malformed
    Trace,
    /// Pointer backend unavailable
    Pointer,
    /// Output path could not be written
    Output,
    /// Anything else
    Other,
}

/// Classify an error by walking its chain
pub fn classify_error(error: &anyhow::Error) -> ErrorCategory {
    for cause in error.chain() {
        if let Some(host) = cause.downcast_ref::<HostError>() {
            return match host {
                HostError::TraceOpen { .. }
                | HostError::TraceParse { .. }
                | HostError::InvalidTraceRecord { .. } => ErrorCategory::Trace,
                HostError::Encode(_) | HostError::Io(_) => ErrorCategory::Output,
                HostError::InvalidMotionLine { .. } | HostError::ChannelClosed => {
                    ErrorCategory::Other
                }
            };
        }
        if cause.downcast_ref::<PointerError>().is_some() {
            return ErrorCategory::Pointer;
        }
    }

    let message = format!("{:#}", error).to_lowercase();
    if message.contains("config") {
        ErrorCategory::Config
    } else if message.contains("trace") {
        ErrorCategory::Trace
    } else if message.contains("pointer") {
        ErrorCategory::Pointer
    } else {
        ErrorCategory::Other
    }
}

/// Format error for user consumption
pub fn format_user_error(error: &anyhow::Error) -> String {
    let mut output = String::new();

    writeln!(output).ok();
    writeln!(output, "╔════════════════════════════════════════════════════════════╗").ok();
    writeln!(output, "║  cursor-momentum could not start                           ║").ok();
    writeln!(output, "╚════════════════════════════════════════════════════════════╝").ok();
    writeln!(output).ok();

    match classify_error(error) {
        ErrorCategory::Config => format_config_error(&mut output),
        ErrorCategory::Trace => format_trace_error(&mut output),
        ErrorCategory::Pointer => format_pointer_error(&mut output),
        ErrorCategory::Output => format_output_error(&mut output),
        ErrorCategory::Other => {
            writeln!(output, "An unexpected error occurred.").ok();
        }
    }

    writeln!(output).ok();
    writeln!(output, "Technical Details:").ok();
    writeln!(output, "  {:#}", error).ok();
    writeln!(output).ok();
    writeln!(output, "Run with -vv for detailed logs.").ok();

    output
}

fn format_config_error(output: &mut String) {
    writeln!(output, "Configuration Error").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output, "  1. Config file path is wrong").ok();
    writeln!(output, "     → Pass it explicitly: cursor-momentum -c /path/to/config.toml").ok();
    writeln!(output, "  2. TOML syntax error").ok();
    writeln!(output, "     → Sections are [logging], [pointer], [input], [output]").ok();
    writeln!(output, "  3. Value out of range").ok();
    writeln!(output, "     → pointer.start_x/start_y must lie inside the screen").ok();
    writeln!(output, "     → input.source = \"trace\" needs input.trace_path").ok();
}

fn format_trace_error(output: &mut String) {
    writeln!(output, "Trace Error").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output, "  1. Trace file does not exist or is not readable").ok();
    writeln!(output, "  2. A line is not a motion record").ok();
    writeln!(output, "     → Expected one JSON object per line:").ok();
    writeln!(output, "       {{\"dx\": 10, \"dy\": 0, \"t_ms\": 8}}").ok();
    writeln!(output, "  3. A record is out of range").ok();
    writeln!(output, "     → |dx|, |dy| at most 1000000; t_ms between 0 and one day").ok();
}

fn format_pointer_error(output: &mut String) {
    writeln!(output, "Pointer Error").ok();
    writeln!(output).ok();
    writeln!(output, "The pointer could not be read or moved.").ok();
    writeln!(output, "  → Without pointer access the glide stays at rest").ok();
}

fn format_output_error(output: &mut String) {
    writeln!(output, "Output Error").ok();
    writeln!(output).ok();
    writeln!(output, "The pointer path could not be written.").ok();
    writeln!(output, "  → Check the directory of --output / output.path_file exists").ok();
}
