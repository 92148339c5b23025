use serde::{Deserialize, Serialize};

/// 2D point with floating point coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point
    pub fn distance(&self, other: &Point) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Calculate squared distance (faster, no sqrt)
    pub fn distance_squared(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Truncate both coordinates toward zero.
    pub fn truncate(&self) -> PointI {
        PointI::new(self.x as i32, self.y as i32)
    }
}

impl From<PointI> for Point {
    fn from(p: PointI) -> Self {
        Self::new(p.x as f64, p.y as f64)
    }
}

/// Integer point in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PointI {
    /// X coordinate (column)
    pub x: i32,
    /// Y coordinate (row)
    pub y: i32,
}

impl PointI {
    /// Create a new integer point
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - other`
    pub fn sub(&self, other: &PointI) -> PointI {
        PointI::new(self.x - other.x, self.y - other.y)
    }

    /// Shift by a pixel offset
    pub fn offset(&self, dx: i32, dy: i32) -> PointI {
        PointI::new(self.x + dx, self.y + dy)
    }

    /// Z component of the cross product of two edge vectors
    pub fn cross(&self, other: &PointI) -> i64 {
        self.x as i64 * other.y as i64 - self.y as i64 * other.x as i64
    }

    /// Dot product of two edge vectors
    pub fn dot(&self, other: &PointI) -> i64 {
        self.x as i64 * other.x as i64 + self.y as i64 * other.y as i64
    }

    /// Euclidean length when treated as a vector
    pub fn norm(&self) -> f64 {
        (self.dot(self) as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_rounds_toward_zero() {
        assert_eq!(Point::new(3.9, -2.7).truncate(), PointI::new(3, -2));
    }

    #[test]
    fn test_vector_ops() {
        let a = PointI::new(3, 0);
        let b = PointI::new(0, 4);
        assert_eq!(a.dot(&b), 0);
        assert_eq!(a.cross(&b), 12);
        assert!((b.sub(&a).norm() - 5.0).abs() < 1e-9);
    }
}
