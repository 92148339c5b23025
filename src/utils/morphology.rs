//! Binary morphology with rectangular structuring elements.
//!
//! Pixels outside the image take no part in either operation: erosion does
//! not eat in from the border and dilation does not grow out of it. Rectangle
//! kernels are separable, so each pass is a 1-D running window.

use crate::models::BinaryMask;
use serde::{Deserialize, Serialize};

/// Rectangular structuring element, anchored at its centre
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kernel {
    pub width: usize,
    pub height: usize,
}

impl Kernel {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// The 3×3 square used when no kernel is specified
    pub const fn square3() -> Self {
        Self::new(3, 3)
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::square3()
    }
}

#[derive(Clone, Copy)]
enum Op {
    Erode,
    Dilate,
}

/// Run the 1-D window over each line of `src` (length `len`, `lines` lines).
/// `at(line, i)` gives the flat index of element `i` of `line`.
fn window_pass<F>(src: &[u8], len: usize, lines: usize, ksize: usize, op: Op, at: F) -> Vec<u8>
where
    F: Fn(usize, usize) -> usize,
{
    let mut out = vec![0u8; src.len()];
    let anchor = ksize / 2;
    let mut prefix = vec![0usize; len + 1];
    for line in 0..lines {
        for i in 0..len {
            prefix[i + 1] = prefix[i] + src[at(line, i)] as usize;
        }
        for i in 0..len {
            let lo = i.saturating_sub(anchor);
            let hi = (i + ksize - anchor).min(len);
            let count = prefix[hi] - prefix[lo];
            let hit = match op {
                Op::Dilate => count > 0,
                Op::Erode => count == hi - lo,
            };
            out[at(line, i)] = u8::from(hit);
        }
    }
    out
}

fn apply(mask: &BinaryMask, kernel: Kernel, op: Op, iterations: usize) -> BinaryMask {
    let (w, h) = (mask.width(), mask.height());
    if w == 0 || h == 0 || kernel.width == 0 || kernel.height == 0 {
        return mask.clone();
    }
    let mut buf = mask.to_bytes();
    for v in buf.iter_mut() {
        *v = u8::from(*v != 0);
    }
    for _ in 0..iterations {
        buf = window_pass(&buf, w, h, kernel.width, op, |y, x| y * w + x);
        buf = window_pass(&buf, h, w, kernel.height, op, |x, y| y * w + x);
    }
    BinaryMask::from_bytes(&buf, w, h)
}

/// Shrink foreground regions
pub fn erode(mask: &BinaryMask, kernel: Kernel, iterations: usize) -> BinaryMask {
    apply(mask, kernel, Op::Erode, iterations)
}

/// Grow foreground regions
pub fn dilate(mask: &BinaryMask, kernel: Kernel, iterations: usize) -> BinaryMask {
    apply(mask, kernel, Op::Dilate, iterations)
}

/// Dilate then erode: bridges gaps narrower than the kernel
pub fn close(mask: &BinaryMask, kernel: Kernel) -> BinaryMask {
    erode(&dilate(mask, kernel, 1), kernel, 1)
}
