//! Shape fitting: convex hull, minimum-area rectangle, polygon simplification.

use crate::models::{Point, PointI};

/// Rotated rectangle enclosing a point set
#[derive(Debug, Clone, PartialEq)]
pub struct RotatedRect {
    /// Corners in winding order
    pub corners: [Point; 4],
    /// Extent along the first edge direction
    pub width: f64,
    /// Extent along the perpendicular direction
    pub height: f64,
}

impl RotatedRect {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Corner coordinates truncated toward zero
    pub fn corners_i(&self) -> [PointI; 4] {
        self.corners.map(|c| c.truncate())
    }
}

/// Convex hull (Andrew's monotone chain) without collinear points.
///
/// Returned counter-clockwise in image coordinates (y down).
pub fn convex_hull(points: &[PointI]) -> Vec<PointI> {
    let mut pts: Vec<PointI> = points.to_vec();
    pts.sort_by_key(|p| (p.x, p.y));
    pts.dedup();
    if pts.len() <= 2 {
        return pts;
    }

    let turn = |o: &PointI, a: &PointI, b: &PointI| a.sub(o).cross(&b.sub(o));

    let mut lower: Vec<PointI> = Vec::with_capacity(pts.len());
    for p in &pts {
        while lower.len() >= 2 && turn(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0 {
            lower.pop();
        }
        lower.push(*p);
    }
    let mut upper: Vec<PointI> = Vec::with_capacity(pts.len());
    for p in pts.iter().rev() {
        while upper.len() >= 2 && turn(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0 {
            upper.pop();
        }
        upper.push(*p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Smallest-area rectangle (any rotation) containing every point.
///
/// Rotating calipers over the hull edges; the first edge reaching the minimum
/// wins. `None` for an empty input.
pub fn min_area_rect(points: &[PointI]) -> Option<RotatedRect> {
    let hull = convex_hull(points);
    match hull.len() {
        0 => return None,
        1 => {
            let p = Point::from(hull[0]);
            return Some(RotatedRect {
                corners: [p; 4],
                width: 0.0,
                height: 0.0,
            });
        }
        2 => {
            let a = Point::from(hull[0]);
            let b = Point::from(hull[1]);
            return Some(RotatedRect {
                corners: [a, b, b, a],
                width: a.distance(&b),
                height: 0.0,
            });
        }
        _ => {}
    }

    let mut best: Option<(f64, RotatedRect)> = None;
    for i in 0..hull.len() {
        let origin = Point::from(hull[i]);
        let edge = hull[(i + 1) % hull.len()].sub(&hull[i]);
        let len = edge.norm();
        if len == 0.0 {
            continue;
        }
        let (ux, uy) = (edge.x as f64 / len, edge.y as f64 / len);
        let (vx, vy) = (-uy, ux);

        let (mut s_min, mut s_max, mut t_min, mut t_max) = (0f64, 0f64, 0f64, 0f64);
        for p in &hull {
            let dx = p.x as f64 - origin.x;
            let dy = p.y as f64 - origin.y;
            let s = dx * ux + dy * uy;
            let t = dx * vx + dy * vy;
            s_min = s_min.min(s);
            s_max = s_max.max(s);
            t_min = t_min.min(t);
            t_max = t_max.max(t);
        }

        let area = (s_max - s_min) * (t_max - t_min);
        if best.as_ref().is_some_and(|(a, _)| area >= *a) {
            continue;
        }
        let at = |s: f64, t: f64| Point::new(origin.x + ux * s + vx * t, origin.y + uy * s + vy * t);
        best = Some((
            area,
            RotatedRect {
                corners: [
                    at(s_min, t_min),
                    at(s_max, t_min),
                    at(s_max, t_max),
                    at(s_min, t_max),
                ],
                width: s_max - s_min,
                height: t_max - t_min,
            },
        ));
    }
    best.map(|(_, rect)| rect)
}

/// Distance from `p` to the line through `a` and `b` (to `a` when they coincide)
fn line_distance(p: &PointI, a: &PointI, b: &PointI) -> f64 {
    let ab = b.sub(a);
    let ap = p.sub(a);
    let len = ab.norm();
    if len == 0.0 {
        return ap.norm();
    }
    ab.cross(&ap).unsigned_abs() as f64 / len
}

/// Douglas–Peucker on an open chain; returns the kept points except the last.
fn simplify_chain(chain: &[PointI], epsilon: f64) -> Vec<PointI> {
    let last = chain.len() - 1;
    let mut keep = vec![false; chain.len()];
    keep[0] = true;
    keep[last] = true;

    let mut stack = vec![(0usize, last)];
    while let Some((s, e)) = stack.pop() {
        if e <= s + 1 {
            continue;
        }
        let mut max_d = -1f64;
        let mut max_i = s;
        for (i, p) in chain.iter().enumerate().take(e).skip(s + 1) {
            let d = line_distance(p, &chain[s], &chain[e]);
            if d > max_d {
                max_d = d;
                max_i = i;
            }
        }
        if max_d > epsilon {
            keep[max_i] = true;
            stack.push((max_i, e));
            stack.push((s, max_i));
        }
    }

    chain[..last]
        .iter()
        .zip(&keep[..last])
        .filter_map(|(p, &k)| k.then_some(*p))
        .collect()
}

/// Simplify a closed contour so no dropped point lies farther than `epsilon`
/// from the kept outline.
///
/// The contour is split at an approximately farthest pair of points and each
/// half is simplified independently.
pub fn approx_poly_closed(points: &[PointI], epsilon: f64) -> Vec<PointI> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let farthest = |from: usize| -> (usize, i64) {
        let mut best = (from, 0i64);
        for (i, p) in points.iter().enumerate() {
            let d = p.sub(&points[from]);
            let d2 = d.dot(&d);
            if d2 > best.1 {
                best = (i, d2);
            }
        }
        best
    };

    let mut a = 0usize;
    let (mut b, mut d2) = farthest(a);
    for _ in 0..2 {
        let (c, dc) = farthest(b);
        a = b;
        b = c;
        d2 = dc;
    }
    if (d2 as f64).sqrt() <= epsilon {
        return vec![points[a]];
    }

    let cyclic = |from: usize, to: usize| -> Vec<PointI> {
        let len = (to + n - from) % n;
        (0..=len).map(|k| points[(from + k) % n]).collect()
    };

    let mut out = simplify_chain(&cyclic(a, b), epsilon);
    out.extend(simplify_chain(&cyclic(b, a), epsilon));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hull_drops_interior_and_collinear() {
        let pts = vec![
            PointI::new(0, 0),
            PointI::new(5, 0),
            PointI::new(10, 0),
            PointI::new(10, 10),
            PointI::new(0, 10),
            PointI::new(4, 6),
        ];
        let hull = convex_hull(&pts);
        assert_eq!(hull.len(), 4);
        assert!(!hull.contains(&PointI::new(5, 0)));
        assert!(!hull.contains(&PointI::new(4, 6)));
    }

    #[test]
    fn test_min_area_rect_axis_aligned() {
        let pts = vec![
            PointI::new(10, 20),
            PointI::new(50, 20),
            PointI::new(50, 40),
            PointI::new(10, 40),
            PointI::new(30, 30),
        ];
        let rect = min_area_rect(&pts).unwrap();
        assert!((rect.area() - 800.0).abs() < 1e-6);
        let mut xs: Vec<i32> = rect.corners_i().iter().map(|c| c.x).collect();
        xs.sort();
        assert_eq!(xs, vec![10, 10, 50, 50]);
    }

    #[test]
    fn test_min_area_rect_rotated_square() {
        // Diamond: the best rectangle follows its edges, area 2 * 10^2 / 2 * 2 = 200
        let pts = vec![
            PointI::new(10, 0),
            PointI::new(20, 10),
            PointI::new(10, 20),
            PointI::new(0, 10),
        ];
        let rect = min_area_rect(&pts).unwrap();
        assert!((rect.area() - 200.0).abs() < 1e-6);
    }

    #[test]
    fn test_min_area_rect_degenerate() {
        assert!(min_area_rect(&[]).is_none());
        let one = min_area_rect(&[PointI::new(3, 4)]).unwrap();
        assert_eq!(one.area(), 0.0);
    }

    #[test]
    fn test_approx_keeps_rectangle_corners() {
        // Dense outline of a 40x20 rectangle
        let mut pts = Vec::new();
        for x in 0..40 {
            pts.push(PointI::new(x, 0));
        }
        for y in 0..20 {
            pts.push(PointI::new(40, y));
        }
        for x in (1..=40).rev() {
            pts.push(PointI::new(x, 20));
        }
        for y in (1..=20).rev() {
            pts.push(PointI::new(0, y));
        }
        let approx = approx_poly_closed(&pts, 2.4);
        assert_eq!(approx.len(), 4);
        for corner in [
            PointI::new(0, 0),
            PointI::new(40, 0),
            PointI::new(40, 20),
            PointI::new(0, 20),
        ] {
            assert!(approx.contains(&corner), "missing {corner:?}");
        }
    }

    #[test]
    fn test_approx_tiny_contour_collapses() {
        let pts = vec![PointI::new(0, 0), PointI::new(1, 0), PointI::new(1, 1)];
        assert_eq!(approx_poly_closed(&pts, 5.0).len(), 1);
    }
}
