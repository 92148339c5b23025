//! Global and local thresholding.
//!
//! All binarizers mark *bright* pixels as foreground (`value > threshold`).

use crate::models::BinaryMask;
use rayon::prelude::*;

/// Binarize with an automatically chosen global threshold (Otsu's method)
pub fn otsu_binarize(gray: &[u8], width: usize, height: usize) -> BinaryMask {
    let threshold = otsu_threshold(gray);
    threshold_binarize(gray, width, height, threshold)
}

/// Otsu's optimal threshold: maximises between-class variance where the
/// lower class is `value <= t`.
///
/// A constant image returns its single value, so nothing exceeds it.
pub fn otsu_threshold(gray: &[u8]) -> u8 {
    if gray.is_empty() {
        return 0;
    }

    let mut histogram = [0u64; 256];
    for &pixel in gray {
        histogram[pixel as usize] += 1;
    }

    let min_v = histogram.iter().position(|&c| c > 0).unwrap_or(0);
    let max_v = histogram.iter().rposition(|&c| c > 0).unwrap_or(0);
    if min_v == max_v {
        return min_v as u8;
    }

    let total = gray.len() as f64;
    let sum_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &c)| i as f64 * c as f64)
        .sum();

    let mut sum_b = 0f64;
    let mut w_b = 0f64;
    let mut best_var = -1f64;
    let mut best_t = min_v as u8;

    for (t, &count) in histogram.iter().enumerate() {
        w_b += count as f64;
        if w_b == 0.0 {
            continue;
        }
        let w_f = total - w_b;
        if w_f == 0.0 {
            break;
        }

        sum_b += t as f64 * count as f64;
        let m_b = sum_b / w_b;
        let m_f = (sum_total - sum_b) / w_f;

        let var_between = w_b * w_f * (m_b - m_f) * (m_b - m_f);
        if var_between > best_var {
            best_var = var_between;
            best_t = t as u8;
        }
    }

    best_t
}

/// Simple global threshold binarization
pub fn threshold_binarize(gray: &[u8], width: usize, height: usize, threshold: u8) -> BinaryMask {
    BinaryMask::from_fn(width, height, |x, y| gray[y * width + x] > threshold)
}

/// Local mean thresholding.
///
/// A pixel is foreground when it is brighter than the rounded mean of its
/// `block_size × block_size` neighbourhood minus `offset`
/// (`src - mean > -ceil(offset)`). The neighbourhood replicates edge pixels.
pub fn adaptive_mean_binarize(
    gray: &[u8],
    width: usize,
    height: usize,
    block_size: usize,
    offset: f64,
) -> BinaryMask {
    if width == 0 || height == 0 {
        return BinaryMask::new(width, height);
    }
    let radius = (block_size / 2) as isize;
    let clamp = |v: isize, n: usize| v.clamp(0, n as isize - 1) as usize;

    // Horizontal box sums with replicated borders
    let mut row_sums = vec![0u32; width * height];
    row_sums
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let line = &gray[y * width..(y + 1) * width];
            for (x, dst) in row.iter_mut().enumerate() {
                let mut acc = 0u32;
                for k in -radius..=radius {
                    acc += line[clamp(x as isize + k, width)] as u32;
                }
                *dst = acc;
            }
        });

    let area = (block_size * block_size) as f64;
    let delta = offset.ceil() as i32;
    let mut fg = vec![0u8; width * height];
    fg.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        for (x, dst) in row.iter_mut().enumerate() {
            let mut acc = 0u32;
            for k in -radius..=radius {
                acc += row_sums[clamp(y as isize + k, height) * width + x];
            }
            let mean = (acc as f64 / area).round() as i32;
            let src = gray[y * width + x] as i32;
            *dst = u8::from(src - mean > -delta);
        }
    });

    BinaryMask::from_bytes(&fg, width, height)
}
