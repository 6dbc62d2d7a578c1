//! Screen-space geometry
//!
//! All engine geometry lives in screen pixels with the origin at the top-left
//! of the viewport and y growing downward.

use serde::{Deserialize, Serialize};

/// A coordinate on screen, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    /// Create a new screen point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point, in pixels
    pub fn distance_to(&self, other: &ScreenPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// This point shifted by a screen-space delta
    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Size of the visible camera/image area, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        // Portrait phone in logical pixels
        Self {
            width: 390.0,
            height: 844.0,
        }
    }
}

impl Viewport {
    /// Create a viewport of the given size
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Center of the viewport
    pub fn center(&self) -> ScreenPoint {
        ScreenPoint::new(self.width / 2.0, self.height / 2.0)
    }

    /// Point at fractional offsets of the viewport size
    pub fn at_fraction(&self, fx: f64, fy: f64) -> ScreenPoint {
        ScreenPoint::new(self.width * fx, self.height * fy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = ScreenPoint::new(0.0, 0.0);
        let b = ScreenPoint::new(30.0, 40.0);
        assert_eq!(a.distance_to(&b), 50.0);
        assert_eq!(b.distance_to(&a), 50.0);
    }

    #[test]
    fn test_translate() {
        let p = ScreenPoint::new(10.0, 20.0).translated(-15.0, 5.0);
        assert_eq!(p, ScreenPoint::new(-5.0, 25.0));
    }

    #[test]
    fn test_viewport_center() {
        let viewport = Viewport::new(400.0, 800.0);
        assert_eq!(viewport.center(), ScreenPoint::new(200.0, 400.0));
        assert_eq!(viewport.at_fraction(0.3, 0.4), ScreenPoint::new(120.0, 320.0));
    }
}
