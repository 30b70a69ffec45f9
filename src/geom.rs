//! Geometric primitives used by the plotting pipeline.
//!
//! Data-space points carry `f64` values straight from aggregation. Screen-space
//! types are what the excluded drawing layer consumes, so they serialize.

use serde::{Deserialize, Serialize};

/// A point in data space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// X value in data coordinates.
    pub x: f64,
    /// Y value in data coordinates.
    pub y: f64,
}

impl Point {
    /// Create a new data point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A point in screen space (pixel coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScreenPoint {
    /// X value in screen pixels.
    pub x: f32,
    /// Y value in screen pixels.
    pub y: f32,
}

impl ScreenPoint {
    /// Create a new screen point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangle in screen space (pixel coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScreenRect {
    /// Top-left corner.
    pub min: ScreenPoint,
    /// Bottom-right corner.
    pub max: ScreenPoint,
}

impl ScreenRect {
    /// Create a new screen rectangle from corners.
    pub fn new(min: ScreenPoint, max: ScreenPoint) -> Self {
        Self { min, max }
    }

    /// Create a rectangle from an origin and a size.
    pub fn from_origin_size(origin: ScreenPoint, width: f32, height: f32) -> Self {
        Self::new(origin, ScreenPoint::new(origin.x + width, origin.y + height))
    }

    /// Rectangle width in pixels.
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Rectangle height in pixels.
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Check whether the rectangle contains a point (edges inclusive).
    pub fn contains(&self, point: ScreenPoint) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

/// Space reserved around a plot area for axes and labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    /// Top margin in pixels.
    pub top: f32,
    /// Right margin in pixels.
    pub right: f32,
    /// Bottom margin in pixels.
    pub bottom: f32,
    /// Left margin in pixels.
    pub left: f32,
}

impl Margin {
    /// Create a margin from its four sides.
    pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Width left for the plot area, never negative.
    pub fn inner_width(&self, outer_width: f32) -> f32 {
        (outer_width - self.left - self.right).max(0.0)
    }

    /// Height left for the plot area, never negative.
    pub fn inner_height(&self, outer_height: f32) -> f32 {
        (outer_height - self.top - self.bottom).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_contains_edges() {
        let rect = ScreenRect::from_origin_size(ScreenPoint::new(10.0, 10.0), 20.0, 5.0);
        assert!(rect.contains(ScreenPoint::new(10.0, 10.0)));
        assert!(rect.contains(ScreenPoint::new(30.0, 15.0)));
        assert!(!rect.contains(ScreenPoint::new(30.1, 12.0)));
    }

    #[test]
    fn margin_inner_size_is_clamped() {
        let margin = Margin::new(20.0, 20.0, 40.0, 50.0);
        assert_eq!(margin.inner_width(600.0), 530.0);
        assert_eq!(margin.inner_height(400.0), 340.0);
        assert_eq!(margin.inner_width(10.0), 0.0);
    }
}
