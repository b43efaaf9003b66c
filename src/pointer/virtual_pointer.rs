//! In-memory pointer
//!
//! Behaves like a single-monitor desktop cursor: positions are clamped to
//! the screen the same way the OS clamps a cursor to the desktop, and
//! physical motion moves it with sub-pixel accumulation.

use tracing::trace;

use super::{PointerDevice, Result};
use crate::momentum::{Point, Vec2};

/// Screen rectangle anchored at the origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenBounds {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl ScreenBounds {
    /// Create bounds for a `width` x `height` screen
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Check if a point is on screen
    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as i64) < self.width as i64 && (p.y as i64) < self.height as i64
    }

    /// Nearest on-screen point
    pub fn clamp(&self, p: Point) -> Point {
        let max_x = i32::try_from(self.width.saturating_sub(1)).unwrap_or(i32::MAX);
        let max_y = i32::try_from(self.height.saturating_sub(1)).unwrap_or(i32::MAX);
        Point::new(p.x.clamp(0, max_x), p.y.clamp(0, max_y))
    }
}

/// Pointer that lives entirely in memory
#[derive(Debug, Clone)]
pub struct VirtualPointer {
    bounds: ScreenBounds,
    position: Point,
    /// Sub-pixel remainder of physical motion not yet applied
    motion_remainder: Vec2,
    /// Absolute writes received
    writes: u64,
}

impl VirtualPointer {
    /// Create a pointer at `start`, clamped to `bounds`
    pub fn new(bounds: ScreenBounds, start: Point) -> Self {
        Self {
            bounds,
            position: bounds.clamp(start),
            motion_remainder: Vec2::ZERO,
            writes: 0,
        }
    }

    /// Current position without going through the trait
    pub fn current(&self) -> Point {
        self.position
    }

    /// Number of absolute writes received so far
    pub fn write_count(&self) -> u64 {
        self.writes
    }
}

impl PointerDevice for VirtualPointer {
    fn position(&mut self) -> Result<Point> {
        Ok(self.position)
    }

    fn set_position(&mut self, position: Point) -> Result<()> {
        let clamped = self.bounds.clamp(position);
        trace!(
            "Pointer set ({}, {}) -> ({}, {})",
            position.x,
            position.y,
            clamped.x,
            clamped.y
        );
        self.position = clamped;
        self.motion_remainder = Vec2::ZERO;
        self.writes += 1;
        Ok(())
    }

    fn follow_input(&mut self, delta: Vec2) {
        let total = self.motion_remainder + delta;
        let whole = Point::new(0, 0).offset(total);
        // keep only the fractional part, even when the whole part saturated
        let remainder = Vec2::new(total.x - total.x.round(), total.y - total.y.round());
        self.motion_remainder = if remainder.x.is_finite() && remainder.y.is_finite() {
            remainder
        } else {
            Vec2::ZERO
        };
        self.position = self.bounds.clamp(Point::new(
            self.position.x.saturating_add(whole.x),
            self.position.y.saturating_add(whole.y),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> ScreenBounds {
        ScreenBounds::new(1920, 1080)
    }

    #[test]
    fn test_start_is_clamped() {
        let pointer = VirtualPointer::new(screen(), Point::new(5000, -20));
        assert_eq!(pointer.current(), Point::new(1919, 0));
    }

    #[test]
    fn test_set_position_clamps_and_counts() {
        let mut pointer = VirtualPointer::new(screen(), Point::new(100, 100));

        pointer.set_position(Point::new(110, 100)).unwrap();
        assert_eq!(pointer.current(), Point::new(110, 100));
        pointer.set_position(Point::new(-50, 2000)).unwrap();

        assert_eq!(pointer.position().unwrap(), Point::new(0, 1079));
        assert_eq!(pointer.write_count(), 2);
    }

    #[test]
    fn test_follow_input_is_not_a_write() {
        let mut pointer = VirtualPointer::new(screen(), Point::new(10, 10));
        pointer.follow_input(Vec2::new(5.0, 5.0));
        assert_eq!(pointer.current(), Point::new(15, 15));
        assert_eq!(pointer.write_count(), 0);
    }

    #[test]
    fn test_follow_input_accumulates_subpixel_motion() {
        let mut pointer = VirtualPointer::new(screen(), Point::new(100, 100));

        pointer.follow_input(Vec2::new(0.4, 0.0));
        assert_eq!(pointer.current(), Point::new(100, 100));
        pointer.follow_input(Vec2::new(0.4, 0.0));
        assert_eq!(pointer.current(), Point::new(101, 100));
        pointer.follow_input(Vec2::new(3.0, -2.0));
        assert_eq!(pointer.current(), Point::new(104, 98));
    }

    #[test]
    fn test_bounds_contains() {
        let bounds = screen();
        assert!(bounds.contains(Point::new(0, 0)));
        assert!(bounds.contains(Point::new(1919, 1079)));
        assert!(!bounds.contains(Point::new(1920, 0)));
        assert!(!bounds.contains(Point::new(0, -1)));
    }

    #[test]
    fn test_huge_input_saturates_at_edge() {
        let mut pointer = VirtualPointer::new(screen(), Point::new(1900, 10));

        // offset saturates to i32::MAX; adding the position must not overflow
        pointer.follow_input(Vec2::new(3_000_000_000.0, 0.0));
        assert_eq!(pointer.current(), Point::new(1919, 10));

        pointer.follow_input(Vec2::new(-3_000_000_000.0, -3_000_000_000.0));
        assert_eq!(pointer.current(), Point::new(0, 0));

        // nothing of the saturated motion is carried over
        pointer.follow_input(Vec2::new(2.0, 3.0));
        assert_eq!(pointer.current(), Point::new(2, 3));
    }

    #[test]
    fn test_clamp_on_oversized_screen() {
        let bounds = ScreenBounds::new(3_000_000_000, u32::MAX);
        assert_eq!(
            bounds.clamp(Point::new(i32::MAX, -5)),
            Point::new(i32::MAX, 0)
        );

        let pointer = VirtualPointer::new(bounds, Point::new(5000, 5000));
        assert_eq!(pointer.current(), Point::new(5000, 5000));
    }
}
