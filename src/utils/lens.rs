//! Radial barrel-distortion correction for wide-angle camera modules.

use crate::models::Frame;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Correction parameters. `strength` is tuned by eye until straight edges
/// stop bowing; `zoom` > 1 crops in to hide the black corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensCorrection {
    pub strength: f64,
    pub zoom: f64,
}

impl Default for LensCorrection {
    fn default() -> Self {
        Self {
            strength: 1.7,
            zoom: 1.0,
        }
    }
}

impl LensCorrection {
    /// Source-radius scale for a normalised destination radius
    fn radial_scale(&self, r: f64) -> f64 {
        let k = r * self.strength;
        if k == 0.0 { 1.0 } else { k.atan() / k }
    }

    /// Resample `frame` through the inverse distortion model.
    ///
    /// Each output pixel at normalised radius `r` (1.0 = half diagonal) reads
    /// the source at `r * atan(r*s)/(r*s) / zoom`, nearest neighbour.
    /// Samples falling outside the source are black.
    pub fn apply(&self, frame: &Frame) -> Frame {
        let (w, h) = (frame.width(), frame.height());
        let mut out = Frame::new(w, h, frame.format());
        if w == 0 || h == 0 || self.zoom <= 0.0 {
            return out;
        }
        let c = frame.format().channels();
        let cx = (w as f64 - 1.0) / 2.0;
        let cy = (h as f64 - 1.0) / 2.0;
        let half_diag = (cx * cx + cy * cy).sqrt().max(1.0);
        let src = frame.as_bytes();

        out.as_bytes_mut()
            .par_chunks_mut(w * c)
            .enumerate()
            .for_each(|(y, row)| {
                let dy = y as f64 - cy;
                for x in 0..w {
                    let dx = x as f64 - cx;
                    let r = (dx * dx + dy * dy).sqrt() / half_diag;
                    let scale = self.radial_scale(r) / self.zoom;
                    let sx = (cx + dx * scale).round();
                    let sy = (cy + dy * scale).round();
                    if sx < 0.0 || sy < 0.0 || sx >= w as f64 || sy >= h as f64 {
                        continue;
                    }
                    let si = (sy as usize * w + sx as usize) * c;
                    row[x * c..(x + 1) * c].copy_from_slice(&src[si..si + c]);
                }
            });
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PixelFormat;

    #[test]
    fn test_zero_strength_is_identity() {
        let data: Vec<u8> = (0..48).map(|v| v as u8).collect();
        let frame = Frame::from_raw(4, 4, PixelFormat::Bgr8, data).unwrap();
        let lens = LensCorrection {
            strength: 0.0,
            zoom: 1.0,
        };
        assert_eq!(lens.apply(&frame), frame);
    }

    #[test]
    fn test_centre_pixel_is_fixed_point() {
        let mut data = vec![0u8; 9 * 9];
        data[4 * 9 + 4] = 200;
        let frame = Frame::from_raw(9, 9, PixelFormat::Gray8, data).unwrap();
        let out = LensCorrection::default().apply(&frame);
        assert_eq!(out.pixel(4, 4), &[200]);
    }

    #[test]
    fn test_scale_shrinks_with_radius() {
        let lens = LensCorrection::default();
        assert_eq!(lens.radial_scale(0.0), 1.0);
        assert!(lens.radial_scale(0.5) > lens.radial_scale(1.0));
        assert!(lens.radial_scale(1.0) < 1.0);
    }
}
