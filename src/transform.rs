//! Coordinate transforms between data and screen space.

use serde::Serialize;

use crate::axis::LinearScale;
use crate::geom::{Point, ScreenPoint};
use crate::view::Domain;

/// Transform from data coordinates into plot-local screen coordinates.
///
/// The origin is the top-left corner of the plot area; margins are applied
/// by whoever draws the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    x: LinearScale,
    y: LinearScale,
}

impl Transform {
    /// Create a transform from a horizontal and a vertical scale.
    pub fn new(x: LinearScale, y: LinearScale) -> Self {
        Self { x, y }
    }

    /// Access the horizontal scale.
    pub fn x_scale(&self) -> &LinearScale {
        &self.x
    }

    /// Access the vertical scale.
    pub fn y_scale(&self) -> &LinearScale {
        &self.y
    }

    /// Data-space domain covered by both scales.
    pub fn domain(&self) -> Domain {
        Domain::new(self.x.domain(), self.y.domain())
    }

    /// Map a data point into screen space.
    ///
    /// Returns `None` for non-finite input.
    pub fn data_to_screen(&self, point: Point) -> Option<ScreenPoint> {
        if !point.x.is_finite() || !point.y.is_finite() {
            return None;
        }
        Some(ScreenPoint::new(
            self.x.map(point.x) as f32,
            self.y.map(point.y) as f32,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Range;

    #[test]
    fn maps_through_both_scales() {
        let transform = Transform::new(
            LinearScale::new(Range::new(0.0, 10.0), 0.0, 100.0),
            LinearScale::new(Range::new(0.0, 10.0), 100.0, 0.0),
        );
        let point = Point::new(5.0, 7.5);
        let screen = transform.data_to_screen(point).unwrap();
        assert_eq!(screen, ScreenPoint::new(50.0, 25.0));
        assert_eq!(transform.domain().y, Range::new(0.0, 10.0));
        assert!((transform.y_scale().invert(screen.y as f64) - point.y).abs() < 1e-6);
    }

    #[test]
    fn rejects_non_finite_points() {
        let transform = Transform::new(
            LinearScale::new(Range::new(0.0, 1.0), 0.0, 1.0),
            LinearScale::new(Range::new(0.0, 1.0), 1.0, 0.0),
        );
        assert!(transform.data_to_screen(Point::new(f64::NAN, 0.0)).is_none());
    }
}
