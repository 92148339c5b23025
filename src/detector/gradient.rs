//! Linear barcode localization from dense directional gradients.
//!
//! Parallel bars produce a strong, tightly packed response along one axis.
//! Blurring merges neighbouring bar edges into one blob, Otsu separates it
//! from the background, and morphology bridges the gaps between bars and
//! drops isolated specks. The largest surviving blob is boxed with a
//! minimum-area rotated rectangle.

use crate::detector::contour::{Contour, RetrievalMode, find_contours};
use crate::models::{BinaryMask, CandidateRegion, Frame};
use crate::utils::binarization::{otsu_threshold, threshold_binarize};
use crate::utils::filter::{GradientAxis, gaussian_blur, sobel_abs};
use crate::utils::morphology::{Kernel, close, dilate, erode};
use crate::utils::polygon::min_area_rect;
use log::debug;
use serde::{Deserialize, Serialize};

/// Tuning for [`GradientLocalizer`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientParams {
    /// Axis across the bars
    pub axis: GradientAxis,
    /// Gaussian blur kernel size (odd)
    pub blur_size: usize,
    /// Closing kernel that bridges gaps between bars
    pub close_kernel: Kernel,
    /// Kernel for the erode/dilate clean-up
    pub cleanup_kernel: Kernel,
    pub erode_iterations: usize,
    pub dilate_iterations: usize,
}

impl Default for GradientParams {
    fn default() -> Self {
        Self {
            axis: GradientAxis::Horizontal,
            blur_size: 9,
            close_kernel: Kernel::new(21, 7),
            cleanup_kernel: Kernel::square3(),
            erode_iterations: 4,
            dilate_iterations: 4,
        }
    }
}

/// Every intermediate image of one gradient pass, for calibration dumps
#[derive(Debug, Clone)]
pub struct GradientStages {
    pub width: usize,
    pub height: usize,
    pub gray: Vec<u8>,
    pub gradient: Vec<u8>,
    pub blurred: Vec<u8>,
    pub threshold: u8,
    pub binary: BinaryMask,
    pub cleaned: BinaryMask,
}

/// Gradient-texture localizer for 1-D barcodes
#[derive(Debug, Clone, Default)]
pub struct GradientLocalizer {
    params: GradientParams,
}

impl GradientLocalizer {
    pub fn new(params: GradientParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &GradientParams {
        &self.params
    }

    /// Run the filter chain up to the cleaned mask
    pub fn stages(&self, frame: &Frame) -> GradientStages {
        let (w, h) = (frame.width(), frame.height());
        let p = &self.params;

        let gray = frame.to_grayscale();
        let gradient = sobel_abs(&gray, w, h, p.axis);
        let blurred = gaussian_blur(&gradient, w, h, p.blur_size);
        let threshold = otsu_threshold(&blurred);
        let binary = threshold_binarize(&blurred, w, h, threshold);

        let closed = close(&binary, p.close_kernel);
        let eroded = erode(&closed, p.cleanup_kernel, p.erode_iterations);
        let cleaned = dilate(&eroded, p.cleanup_kernel, p.dilate_iterations);

        debug!(
            "gradient stages: otsu={} binary={} cleaned={}",
            threshold,
            binary.count_ones(),
            cleaned.count_ones()
        );

        GradientStages {
            width: w,
            height: h,
            gray,
            gradient,
            blurred,
            threshold,
            binary,
            cleaned,
        }
    }

    /// Locate the most prominent barcode-like region, if any
    pub fn locate(&self, frame: &Frame) -> Option<CandidateRegion> {
        let stages = self.stages(frame);
        region_from_mask(&stages.cleaned)
    }
}

/// Box the largest external blob of a cleaned mask.
///
/// Ties on area keep the contour discovered first in raster order.
pub fn region_from_mask(mask: &BinaryMask) -> Option<CandidateRegion> {
    let contours = find_contours(mask, RetrievalMode::External);
    let best = largest_contour(&contours)?;
    let rect = min_area_rect(&best.points)?;
    let region = CandidateRegion::new(
        rect.corners_i(),
        best.area(),
        best.perimeter(),
        mask.width(),
        mask.height(),
    );
    debug!(
        "gradient region: {} contours, area={:.1} rect={:?}",
        contours.len(),
        region.area,
        region.axis_rect
    );
    Some(region)
}

fn largest_contour(contours: &[Contour]) -> Option<&Contour> {
    let mut best: Option<(&Contour, f64)> = None;
    for c in contours {
        let area = c.area();
        if best.is_none_or(|(_, a)| area > a) {
            best = Some((c, area));
        }
    }
    best.map(|(c, _)| c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_largest_contour_prefers_first_on_tie() {
        let mut mask = BinaryMask::new(40, 20);
        mask.fill_rect(2, 2, 8, 8, true);
        mask.fill_rect(20, 2, 26, 8, true);
        let contours = find_contours(&mask, RetrievalMode::External);
        let best = largest_contour(&contours).unwrap();
        assert_eq!(best.bounds().0, 2);
    }

    #[test]
    fn test_region_from_empty_mask_is_none() {
        assert!(region_from_mask(&BinaryMask::new(16, 16)).is_none());
    }

    #[test]
    fn test_region_from_block() {
        let mut mask = BinaryMask::new(64, 48);
        mask.fill_rect(10, 12, 40, 30, true);
        mask.fill_rect(50, 40, 53, 43, true);
        let region = region_from_mask(&mask).unwrap();
        assert_eq!(region.axis_rect.x, 10);
        assert_eq!(region.axis_rect.y, 12);
        assert_eq!(region.axis_rect.width, 30);
        assert_eq!(region.axis_rect.height, 18);
    }
}
