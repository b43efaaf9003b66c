//! Pointer I/O error types

use thiserror::Error;

/// Result type for pointer operations
pub type Result<T> = std::result::Result<T, PointerError>;

/// Failures reading or moving the system pointer
#[derive(Error, Debug)]
pub enum PointerError {
    /// Pointer backend not available (no display, permission denied)
    #[error("Pointer unavailable: {0}")]
    Unavailable(String),
}
