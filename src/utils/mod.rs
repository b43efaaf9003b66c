//! Utility Functions
//!
//! User-friendly error formatting for startup failures.

pub mod errors;

pub use errors::{classify_error, format_user_error, ErrorCategory};
