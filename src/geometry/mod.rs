//! Geometric primitives for text positioning.

use serde::Serialize;

/// A 2D point in user space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_textflow::geometry::Point;
    ///
    /// let point = Point::new(10.0, 20.0);
    /// assert_eq!(point.x, 10.0);
    /// assert_eq!(point.y, 20.0);
    /// ```
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Perpendicular distance from this point to the infinite line through
    /// `start` and `end`.
    ///
    /// Returns `None` when `start` and `end` coincide, since no direction
    /// is defined.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_textflow::geometry::Point;
    ///
    /// let p = Point::new(5.0, 3.0);
    /// let d = p.distance_to_line(&Point::new(0.0, 0.0), &Point::new(10.0, 0.0));
    /// assert_eq!(d, Some(3.0));
    /// ```
    pub fn distance_to_line(&self, start: &Point, end: &Point) -> Option<f32> {
        let dx = end.x - start.x;
        let dy = end.y - start.y;
        let length = dx.hypot(dy);
        if length == 0.0 {
            return None;
        }
        let cross = (self.x - start.x) * dy - (self.y - start.y) * dx;
        Some(cross.abs() / length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance(&b), 5.0);
    }

    #[test]
    fn test_distance_to_line_on_line() {
        let p = Point::new(20.0, 0.0);
        let d = p.distance_to_line(&Point::new(0.0, 0.0), &Point::new(10.0, 0.0));
        assert_eq!(d, Some(0.0));
    }

    #[test]
    fn test_distance_to_diagonal_line() {
        let p = Point::new(0.0, 2.0);
        let d = p
            .distance_to_line(&Point::new(0.0, 0.0), &Point::new(1.0, 1.0))
            .unwrap();
        assert!((d - std::f32::consts::SQRT_2).abs() < 1e-5);
    }

    #[test]
    fn test_distance_to_degenerate_line() {
        let p = Point::new(1.0, 1.0);
        let origin = Point::new(0.0, 0.0);
        assert_eq!(p.distance_to_line(&origin, &origin), None);
    }
}
