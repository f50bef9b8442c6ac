use serde::{Deserialize, Serialize};

/// A landmark location in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2d {
    /// Column coordinate.
    pub x: f64,
    /// Row coordinate.
    pub y: f64,
}

impl Point2d {
    /// Create a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation `(1 - alpha) * self + alpha * other`.
    pub fn lerp(&self, other: &Point2d, alpha: f64) -> Point2d {
        Point2d {
            x: (1.0 - alpha) * self.x + alpha * other.x,
            y: (1.0 - alpha) * self.y + alpha * other.y,
        }
    }

    /// Whether both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Point2d {
    fn from(p: [f64; 2]) -> Self {
        Point2d::new(p[0], p[1])
    }
}

impl From<Point2d> for [f64; 2] {
    fn from(p: Point2d) -> Self {
        [p.x, p.y]
    }
}

impl From<(f64, f64)> for Point2d {
    fn from(p: (f64, f64)) -> Self {
        Point2d::new(p.0, p.1)
    }
}

/// Convert a list of raw coordinate pairs into points.
pub fn points_from_arrays(points: &[[f64; 2]]) -> Vec<Point2d> {
    points.iter().copied().map(Point2d::from).collect()
}

/// Convert points into raw coordinate pairs.
pub fn points_to_arrays(points: &[Point2d]) -> Vec<[f64; 2]> {
    points.iter().copied().map(<[f64; 2]>::from).collect()
}
