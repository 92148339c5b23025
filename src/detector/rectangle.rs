//! Generic rectangle localization by polygon approximation.
//!
//! Local-mean thresholding keeps printed frames and QR borders as crisp
//! outlines under uneven lighting. Every border in the contour hierarchy is a
//! candidate; those within the size band and clear of the frame edge are
//! simplified to polygons, and the near-rectangular quadrilaterals survive.
//! When frames are nested, the innermost one (smallest perimeter) is the
//! marker.

use crate::detector::contour::{Contour, RetrievalMode, find_contours};
use crate::models::{BinaryMask, CandidateRegion, Frame, PointI};
use crate::utils::binarization::adaptive_mean_binarize;
use crate::utils::geometry::{interior_angle_deg, is_convex};
use crate::utils::morphology::{Kernel, close};
use crate::utils::polygon::approx_poly_closed;
use log::debug;
use serde::{Deserialize, Serialize};

/// Tuning for [`RectangleLocalizer`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RectangleParams {
    /// Adaptive threshold neighbourhood (odd, ≥ 3)
    pub block_size: usize,
    /// Constant subtracted from the local mean
    pub offset: f64,
    pub close_kernel: Kernel,
    pub min_area: f64,
    pub max_area: f64,
    /// Contours whose bounds come closer than this to the frame edge are dropped
    pub border_margin: i32,
    /// Polygon tolerance as a fraction of the contour perimeter
    pub epsilon_factor: f64,
    pub min_angle_deg: f64,
    pub max_angle_deg: f64,
}

impl Default for RectangleParams {
    fn default() -> Self {
        Self {
            block_size: 11,
            offset: 2.0,
            close_kernel: Kernel::square3(),
            min_area: 2000.0,
            max_area: 80000.0,
            border_margin: 1,
            epsilon_factor: 0.02,
            min_angle_deg: 80.0,
            max_angle_deg: 100.0,
        }
    }
}

/// Polygon-approximation localizer for rectangular frames
#[derive(Debug, Clone, Default)]
pub struct RectangleLocalizer {
    params: RectangleParams,
}

impl RectangleLocalizer {
    pub fn new(params: RectangleParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &RectangleParams {
        &self.params
    }

    /// Thresholded and closed mask the contours are traced on
    pub fn mask(&self, frame: &Frame) -> BinaryMask {
        let p = &self.params;
        let gray = frame.to_grayscale();
        let binary =
            adaptive_mean_binarize(&gray, frame.width(), frame.height(), p.block_size, p.offset);
        close(&binary, p.close_kernel)
    }

    /// Every accepted rectangle, in contour discovery order
    pub fn candidates(&self, frame: &Frame) -> Vec<CandidateRegion> {
        let (w, h) = (frame.width(), frame.height());
        let mask = self.mask(frame);
        let contours = find_contours(&mask, RetrievalMode::Tree);

        let accepted: Vec<CandidateRegion> = contours
            .iter()
            .filter_map(|c| self.accept(c, w, h))
            .collect();
        debug!(
            "rectangle candidates: {} of {} contours",
            accepted.len(),
            contours.len()
        );
        accepted
    }

    /// The innermost accepted rectangle, if any
    pub fn locate(&self, frame: &Frame) -> Option<CandidateRegion> {
        let candidates = self.candidates(frame);
        let best = select_innermost(&candidates).cloned();
        if let Some(region) = &best {
            debug!(
                "rectangle selected: perimeter={:.1} rect={:?}",
                region.perimeter, region.axis_rect
            );
        }
        best
    }

    fn accept(&self, contour: &Contour, frame_w: usize, frame_h: usize) -> Option<CandidateRegion> {
        let p = &self.params;
        let area = contour.area();
        if area < p.min_area || area > p.max_area {
            return None;
        }
        if touches_border(contour.bounds(), p.border_margin, frame_w, frame_h) {
            return None;
        }
        let perimeter = contour.perimeter();
        let polygon = approx_poly_closed(&contour.points, p.epsilon_factor * perimeter);
        let corners = classify_quad(&polygon, p.min_angle_deg, p.max_angle_deg)?;
        Some(CandidateRegion::new(
            corners, area, perimeter, frame_w, frame_h,
        ))
    }
}

fn touches_border(
    (x, y, w, h): (i32, i32, i32, i32),
    margin: i32,
    frame_w: usize,
    frame_h: usize,
) -> bool {
    let (fw, fh) = (frame_w as i64, frame_h as i64);
    let m = margin as i64;
    let (x, y, w, h) = (x as i64, y as i64, w as i64, h as i64);
    x < m || y < m || x + w > fw - m || y + h > fh - m
}

/// Accept a polygon as a rectangle.
///
/// Exactly four vertices, convex, and every interior angle strictly inside
/// `(min_angle, max_angle)` degrees. A repeated vertex rejects the polygon.
pub fn classify_quad(polygon: &[PointI], min_angle: f64, max_angle: f64) -> Option<[PointI; 4]> {
    let corners: [PointI; 4] = polygon.try_into().ok()?;
    if !is_convex(&corners) {
        return None;
    }
    for i in 0..4 {
        let angle = interior_angle_deg(&corners[(i + 3) % 4], &corners[i], &corners[(i + 1) % 4])?;
        if angle <= min_angle || angle >= max_angle {
            return None;
        }
    }
    Some(corners)
}

/// Smallest perimeter wins; the first one on ties
pub fn select_innermost(candidates: &[CandidateRegion]) -> Option<&CandidateRegion> {
    candidates.iter().fold(None, |best: Option<&CandidateRegion>, c| match best {
        Some(b) if b.perimeter <= c.perimeter => Some(b),
        _ => Some(c),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(pts: [(i32, i32); 4]) -> Vec<PointI> {
        pts.iter().map(|&(x, y)| PointI::new(x, y)).collect()
    }

    fn region(w: i32, h: i32) -> CandidateRegion {
        let corners = [
            PointI::new(0, 0),
            PointI::new(w, 0),
            PointI::new(w, h),
            PointI::new(0, h),
        ];
        CandidateRegion::new(
            corners,
            (w * h) as f64,
            2.0 * (w + h) as f64,
            1000,
            1000,
        )
    }

    #[test]
    fn test_classify_accepts_square() {
        let sq = quad([(0, 0), (50, 0), (50, 50), (0, 50)]);
        assert!(classify_quad(&sq, 80.0, 100.0).is_some());
    }

    #[test]
    fn test_classify_rejects_wrong_vertex_count() {
        let tri = vec![PointI::new(0, 0), PointI::new(10, 0), PointI::new(0, 10)];
        assert!(classify_quad(&tri, 80.0, 100.0).is_none());
        let pent = vec![
            PointI::new(0, 0),
            PointI::new(10, 0),
            PointI::new(15, 8),
            PointI::new(5, 15),
            PointI::new(-5, 8),
        ];
        assert!(classify_quad(&pent, 80.0, 100.0).is_none());
    }

    #[test]
    fn test_classify_rejects_skewed_angles() {
        // Parallelogram with 45 and 135 degree corners
        let par = quad([(0, 0), (40, 0), (60, 20), (20, 20)]);
        assert!(classify_quad(&par, 80.0, 100.0).is_none());
        // Widened band accepts it
        assert!(classify_quad(&par, 40.0, 140.0).is_some());
    }

    #[test]
    fn test_classify_band_is_open() {
        let sq = quad([(0, 0), (50, 0), (50, 50), (0, 50)]);
        assert!(classify_quad(&sq, 90.0, 100.0).is_none());
        assert!(classify_quad(&sq, 80.0, 90.0).is_none());
    }

    #[test]
    fn test_classify_rejects_concave_and_degenerate() {
        let dart = quad([(0, 0), (20, 10), (40, 0), (20, 40)]);
        assert!(classify_quad(&dart, 0.0, 180.0).is_none());
        let repeated = quad([(0, 0), (0, 0), (30, 30), (0, 30)]);
        assert!(classify_quad(&repeated, 0.0, 180.0).is_none());
    }

    #[test]
    fn test_select_ignores_area_order() {
        let thin = region(10, 300);
        let square = region(100, 100);
        assert!(thin.area < square.area);
        assert!(square.perimeter < thin.perimeter);

        let both = [thin.clone(), square.clone()];
        assert_eq!(select_innermost(&both), Some(&square));
        let both = [square.clone(), thin];
        assert_eq!(select_innermost(&both), Some(&square));
    }

    #[test]
    fn test_select_first_on_tie() {
        let a = region(20, 40);
        let mut b = region(40, 20);
        b.corners[0] = PointI::new(1, 1);
        let list = [a.clone(), b];
        assert_eq!(select_innermost(&list), Some(&a));
        assert!(select_innermost(&[]).is_none());
    }

    #[test]
    fn test_touches_border() {
        assert!(touches_border((0, 10, 20, 20), 1, 100, 100));
        assert!(touches_border((10, 10, 90, 20), 1, 100, 100));
        assert!(!touches_border((1, 1, 98, 98), 1, 100, 100));
        assert!(touches_border((1, 1, 99, 98), 1, 100, 100));
    }
}
