//! Pointer I/O boundary
//!
//! The glide only ever needs two things from the platform: where the
//! pointer is now, and a way to put it somewhere else. [`PointerDevice`]
//! is that seam. Platform backends live outside this crate; the crate
//! ships [`VirtualPointer`], an in-memory desktop used by the simulator,
//! the live host, and the tests.

mod error;
mod virtual_pointer;

pub use error::{PointerError, Result};
pub use virtual_pointer::{ScreenBounds, VirtualPointer};

use crate::momentum::{Point, Vec2};

/// Absolute pointer read/write in integer screen pixels
pub trait PointerDevice {
    /// Current pointer position
    fn position(&mut self) -> Result<Point>;

    /// Move the pointer to an absolute position
    fn set_position(&mut self, position: Point) -> Result<()>;

    /// Physical motion the user just made
    ///
    /// A platform pointer has already been moved by the OS, so the default
    /// does nothing. Virtual pointers apply the delta themselves.
    fn follow_input(&mut self, _delta: Vec2) {}
}
