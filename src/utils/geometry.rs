//! Measurements on integer polygons and point chains

use crate::models::PointI;

/// Enclosed area of a closed polygon (shoelace formula, always non-negative)
pub fn polygon_area(points: &[PointI]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice = 0i64;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        twice += a.cross(&b);
    }
    twice.unsigned_abs() as f64 / 2.0
}

/// Length of a point chain; `closed` adds the segment from last back to first
pub fn arc_length(points: &[PointI], closed: bool) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let mut total: f64 = points.windows(2).map(|w| w[1].sub(&w[0]).norm()).sum();
    if closed {
        total += points[0].sub(&points[points.len() - 1]).norm();
    }
    total
}

/// Inclusive pixel bounds `(x, y, width, height)` of a point set, unclipped
pub fn bounds(points: &[PointI]) -> (i32, i32, i32, i32) {
    let Some(first) = points.first() else {
        return (0, 0, 0, 0);
    };
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
}

/// Angle in degrees at `at` between the edges towards `prev` and `next`.
///
/// Law of cosines on the edge vectors: `acos(v1·v2 / (|v1||v2|))`, cosine
/// clamped to `[-1, 1]`. `None` when either edge has zero length.
pub fn interior_angle_deg(prev: &PointI, at: &PointI, next: &PointI) -> Option<f64> {
    let v1 = prev.sub(at);
    let v2 = next.sub(at);
    let n1 = v1.norm();
    let n2 = v2.norm();
    if n1 == 0.0 || n2 == 0.0 {
        return None;
    }
    let cos = (v1.dot(&v2) as f64 / (n1 * n2)).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

/// True when every turn of the closed polygon bends the same way.
///
/// Collinear vertices do not break convexity; a polygon with no turn at all
/// is not convex.
pub fn is_convex(points: &[PointI]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut sign = 0i64;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        let turn = b.sub(&a).cross(&c.sub(&b));
        if turn == 0 {
            continue;
        }
        if sign == 0 {
            sign = turn.signum();
        } else if turn.signum() != sign {
            return false;
        }
    }
    sign != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: i32, y: i32, s: i32) -> Vec<PointI> {
        vec![
            PointI::new(x, y),
            PointI::new(x + s, y),
            PointI::new(x + s, y + s),
            PointI::new(x, y + s),
        ]
    }

    #[test]
    fn test_area_and_perimeter() {
        let sq = square(2, 3, 10);
        assert!((polygon_area(&sq) - 100.0).abs() < 1e-9);
        assert!((arc_length(&sq, true) - 40.0).abs() < 1e-9);
        assert!((arc_length(&sq, false) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_area_independent_of_winding() {
        let mut sq = square(0, 0, 4);
        let cw = polygon_area(&sq);
        sq.reverse();
        assert_eq!(cw, polygon_area(&sq));
    }

    #[test]
    fn test_bounds_inclusive() {
        assert_eq!(bounds(&square(2, 3, 10)), (2, 3, 11, 11));
    }

    #[test]
    fn test_angle() {
        let a = interior_angle_deg(&PointI::new(0, 0), &PointI::new(1, 0), &PointI::new(1, 1));
        assert!((a.unwrap() - 90.0).abs() < 1e-9);
        assert!(interior_angle_deg(&PointI::new(1, 0), &PointI::new(1, 0), &PointI::new(2, 2)).is_none());
    }

    #[test]
    fn test_convexity() {
        assert!(is_convex(&square(0, 0, 5)));
        let dart = vec![
            PointI::new(0, 0),
            PointI::new(10, 0),
            PointI::new(3, 3),
            PointI::new(0, 10),
        ];
        assert!(!is_convex(&dart));
        let line = vec![PointI::new(0, 0), PointI::new(1, 1), PointI::new(2, 2)];
        assert!(!is_convex(&line));
    }
}
