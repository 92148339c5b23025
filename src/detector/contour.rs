//! Border following on binary masks (Suzuki & Abe, 1985).
//!
//! Every border between a foreground region and background is traced once,
//! classified as an outer border or a hole border, and linked to the border
//! that immediately encloses it. Traced chains are compressed to their turning
//! points: straight horizontal, vertical and diagonal runs keep only their
//! end pixels.

use crate::models::{BinaryMask, PointI};
use crate::utils::geometry::{arc_length, bounds, polygon_area};

/// Which borders to return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalMode {
    /// Only outer borders not enclosed by any other region
    External,
    /// Every border, with parent links
    Tree,
}

/// One traced border
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    /// Turning points in tracing order, pixel coordinates
    pub points: Vec<PointI>,
    /// True for the inner boundary of a region (around a background hole)
    pub is_hole: bool,
    /// Index of the enclosing contour in the same result, if any
    pub parent: Option<usize>,
}

impl Contour {
    /// Enclosed area of the compressed outline
    pub fn area(&self) -> f64 {
        polygon_area(&self.points)
    }

    /// Closed arc length of the compressed outline
    pub fn perimeter(&self) -> f64 {
        arc_length(&self.points, true)
    }

    /// Inclusive pixel bounds `(x, y, width, height)`
    pub fn bounds(&self) -> (i32, i32, i32, i32) {
        bounds(&self.points)
    }
}

/// Neighbour offsets `(drow, dcol)` in clockwise order on screen, starting east.
const DIRS: [(isize, isize); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

fn direction(from: usize, to: usize, stride: usize) -> usize {
    let d = to as isize - from as isize;
    DIRS.iter()
        .position(|&(dr, dc)| dr * stride as isize + dc == d)
        .unwrap_or(0)
}

#[inline]
fn step(idx: usize, dir: usize, stride: usize) -> usize {
    let (dr, dc) = DIRS[dir];
    (idx as isize + dr * stride as isize + dc) as usize
}

#[derive(Clone, Copy)]
struct BorderInfo {
    is_hole: bool,
    /// Sequential number of the parent border, 0 for none
    parent: i32,
}

/// Follow one border starting at `start`, entering from the zero pixel `from`.
/// Labels visited pixels with `±nbd` and returns the raw pixel chain.
fn follow(labels: &mut [i32], stride: usize, start: usize, from: usize, nbd: i32) -> Vec<usize> {
    let d0 = direction(start, from, stride);
    let first = (0..8)
        .map(|k| step(start, (d0 + k) % 8, stride))
        .find(|&p| labels[p] != 0);

    let Some(first) = first else {
        // Isolated pixel
        labels[start] = -nbd;
        return vec![start];
    };

    let mut chain = Vec::new();
    let mut prev = first;
    let mut cur = start;
    loop {
        let d = direction(cur, prev, stride);
        let mut east_is_zero = false;
        let mut next = prev;
        for k in 1..=8 {
            let dir = (d + 8 - k) % 8;
            let p = step(cur, dir, stride);
            if labels[p] != 0 {
                next = p;
                break;
            }
            if dir == 0 {
                east_is_zero = true;
            }
        }

        if east_is_zero {
            labels[cur] = -nbd;
        } else if labels[cur] == 1 {
            labels[cur] = nbd;
        }
        chain.push(cur);

        if next == start && cur == first {
            break;
        }
        prev = cur;
        cur = next;
    }
    chain
}

/// Keep only the pixels where the chain changes direction
fn compress(points: Vec<PointI>) -> Vec<PointI> {
    let n = points.len();
    if n <= 2 {
        return points;
    }
    (0..n)
        .filter(|&k| {
            let prev = points[(k + n - 1) % n];
            let next = points[(k + 1) % n];
            points[k].sub(&prev) != next.sub(&points[k])
        })
        .map(|k| points[k])
        .collect()
}

/// Trace the borders of `mask` in raster discovery order.
pub fn find_contours(mask: &BinaryMask, mode: RetrievalMode) -> Vec<Contour> {
    let (w, h) = (mask.width(), mask.height());
    // One pixel of background padding so every border is closed
    let stride = w + 2;
    let rows = h + 2;
    let mut labels = vec![0i32; stride * rows];
    for y in 0..h {
        for x in 0..w {
            if mask.get(x, y) {
                labels[(y + 1) * stride + x + 1] = 1;
            }
        }
    }

    // Index = sequential border number; 1 is the virtual frame (a hole).
    let mut info = vec![
        BorderInfo {
            is_hole: false,
            parent: 0,
        },
        BorderInfo {
            is_hole: true,
            parent: 0,
        },
    ];
    let mut contours: Vec<Contour> = Vec::new();
    let mut nbd = 1i32;

    for row in 1..rows - 1 {
        let mut lnbd = 1i32;
        for col in 1..stride - 1 {
            let idx = row * stride + col;
            let v = labels[idx];
            if v == 0 {
                continue;
            }

            let start = if v == 1 && labels[idx - 1] == 0 {
                Some((false, idx - 1))
            } else if v >= 1 && labels[idx + 1] == 0 {
                if v > 1 {
                    lnbd = v;
                }
                Some((true, idx + 1))
            } else {
                None
            };

            if let Some((is_hole, from)) = start {
                nbd += 1;
                let last = info[lnbd as usize];
                let parent = if is_hole == last.is_hole {
                    last.parent
                } else {
                    lnbd
                };
                info.push(BorderInfo { is_hole, parent });

                let chain = follow(&mut labels, stride, idx, from, nbd);
                let points = chain
                    .into_iter()
                    .map(|p| PointI::new((p % stride) as i32 - 1, (p / stride) as i32 - 1))
                    .collect();
                contours.push(Contour {
                    points: compress(points),
                    is_hole,
                    // Border numbers start at 2 for real contours
                    parent: (parent >= 2).then(|| (parent - 2) as usize),
                });
            }

            let v = labels[idx];
            if v != 1 {
                lnbd = v.abs();
            }
        }
    }

    match mode {
        RetrievalMode::Tree => contours,
        RetrievalMode::External => contours
            .into_iter()
            .filter(|c| !c.is_hole && c.parent.is_none())
            .collect(),
    }
}
