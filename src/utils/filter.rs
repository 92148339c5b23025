//! Linear filters on 8-bit single-channel images.
//!
//! Borders use reflect-101 extension (`gfedcb|abcdefgh|gfedcba`).

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Direction along which intensity change is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientAxis {
    /// d/dx, responds to vertical bars
    #[default]
    Horizontal,
    /// d/dy, responds to horizontal bars
    Vertical,
}

/// Map an out-of-range index back into `0..n` by reflect-101.
#[inline]
pub(crate) fn reflect101(i: isize, n: usize) -> usize {
    if n == 1 {
        return 0;
    }
    let n = n as isize;
    let mut i = i;
    while i < 0 || i >= n {
        if i < 0 {
            i = -i;
        } else {
            i = 2 * n - 2 - i;
        }
    }
    i as usize
}

/// 3×3 Sobel derivative along `axis`, absolute value saturated to `u8`
pub fn sobel_abs(gray: &[u8], width: usize, height: usize, axis: GradientAxis) -> Vec<u8> {
    let mut out = vec![0u8; width * height];
    if width == 0 || height == 0 {
        return out;
    }

    let at = |x: isize, y: isize| -> i32 {
        gray[reflect101(y, height) * width + reflect101(x, width)] as i32
    };

    out.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let y = y as isize;
        for (x, dst) in row.iter_mut().enumerate() {
            let x = x as isize;
            let g = match axis {
                GradientAxis::Horizontal => {
                    (at(x + 1, y - 1) - at(x - 1, y - 1))
                        + 2 * (at(x + 1, y) - at(x - 1, y))
                        + (at(x + 1, y + 1) - at(x - 1, y + 1))
                }
                GradientAxis::Vertical => {
                    (at(x - 1, y + 1) - at(x - 1, y - 1))
                        + 2 * (at(x, y + 1) - at(x, y - 1))
                        + (at(x + 1, y + 1) - at(x + 1, y - 1))
                }
            };
            *dst = g.unsigned_abs().min(255) as u8;
        }
    });

    out
}

/// Normalised 1-D Gaussian taps for an odd `ksize`.
///
/// Sigma is derived from the kernel size: `0.3 * ((ksize - 1) * 0.5 - 1) + 0.8`.
pub fn gaussian_kernel(ksize: usize) -> Vec<f32> {
    let sigma = 0.3 * ((ksize as f64 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (ksize as f64 - 1.0) / 2.0;
    let scale = -0.5 / (sigma * sigma);
    let taps: Vec<f64> = (0..ksize)
        .map(|i| {
            let d = i as f64 - center;
            (scale * d * d).exp()
        })
        .collect();
    let sum: f64 = taps.iter().sum();
    taps.iter().map(|t| (t / sum) as f32).collect()
}

/// Separable `ksize × ksize` Gaussian blur
pub fn gaussian_blur(src: &[u8], width: usize, height: usize, ksize: usize) -> Vec<u8> {
    if width == 0 || height == 0 || ksize <= 1 {
        return src.to_vec();
    }
    let kernel = gaussian_kernel(ksize);
    let radius = (ksize / 2) as isize;

    let mut horizontal = vec![0f32; width * height];
    horizontal
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let line = &src[y * width..(y + 1) * width];
            for (x, dst) in row.iter_mut().enumerate() {
                let mut acc = 0f32;
                for (k, w) in kernel.iter().enumerate() {
                    let sx = reflect101(x as isize + k as isize - radius, width);
                    acc += w * line[sx] as f32;
                }
                *dst = acc;
            }
        });

    let mut out = vec![0u8; width * height];
    out.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        for (x, dst) in row.iter_mut().enumerate() {
            let mut acc = 0f32;
            for (k, w) in kernel.iter().enumerate() {
                let sy = reflect101(y as isize + k as isize - radius, height);
                acc += w * horizontal[sy * width + x];
            }
            *dst = acc.round().clamp(0.0, 255.0) as u8;
        }
    });

    out
}
