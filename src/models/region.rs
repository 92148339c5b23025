use super::PointI;

/// Axis-aligned rectangle in pixel units, `(x, y)` is the top-left pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl AxisRect {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest rectangle covering every point, clipped to a `frame_w × frame_h` frame.
    ///
    /// Point coordinates are pixel indices, so a single point yields a 1×1 rect.
    pub fn enclosing(points: &[PointI], frame_w: usize, frame_h: usize) -> Self {
        if points.is_empty() {
            return Self::default();
        }
        let min_x = points.iter().map(|p| p.x).min().unwrap_or(0) as i64;
        let min_y = points.iter().map(|p| p.y).min().unwrap_or(0) as i64;
        let max_x = points.iter().map(|p| p.x).max().unwrap_or(0) as i64;
        let max_y = points.iter().map(|p| p.y).max().unwrap_or(0) as i64;
        clip_span(min_x, min_y, max_x + 1, max_y + 1, frame_w, frame_h)
    }

    /// Intersection with a `frame_w × frame_h` frame
    pub fn clip(&self, frame_w: usize, frame_h: usize) -> Self {
        clip_span(
            self.x as i64,
            self.y as i64,
            (self.x + self.width) as i64,
            (self.y + self.height) as i64,
            frame_w,
            frame_h,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

fn clip_span(x0: i64, y0: i64, x1: i64, y1: i64, frame_w: usize, frame_h: usize) -> AxisRect {
    let (fw, fh) = (frame_w as i64, frame_h as i64);
    let cx0 = x0.clamp(0, fw);
    let cy0 = y0.clamp(0, fh);
    let cx1 = x1.clamp(0, fw);
    let cy1 = y1.clamp(0, fh);
    if cx1 <= cx0 || cy1 <= cy0 {
        return AxisRect::default();
    }
    AxisRect {
        x: cx0 as usize,
        y: cy0 as usize,
        width: (cx1 - cx0) as usize,
        height: (cy1 - cy0) as usize,
    }
}

/// A located quadrilateral believed to hold a marker.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRegion {
    /// Corner points in polygon winding order
    pub corners: [PointI; 4],
    /// Bounds of `corners`, clipped to the frame
    pub axis_rect: AxisRect,
    /// Enclosed area of the contour the region was fitted to
    pub area: f64,
    /// Closed arc length of that contour
    pub perimeter: f64,
}

impl CandidateRegion {
    pub fn new(
        corners: [PointI; 4],
        area: f64,
        perimeter: f64,
        frame_w: usize,
        frame_h: usize,
    ) -> Self {
        Self {
            corners,
            axis_rect: AxisRect::enclosing(&corners, frame_w, frame_h),
            area,
            perimeter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enclosing_inside_frame() {
        let pts = [
            PointI::new(10, 5),
            PointI::new(20, 5),
            PointI::new(20, 15),
            PointI::new(10, 15),
        ];
        assert_eq!(AxisRect::enclosing(&pts, 100, 100), AxisRect::new(10, 5, 11, 11));
    }

    #[test]
    fn test_enclosing_clips_negative_and_overflow() {
        let pts = [
            PointI::new(-5, -3),
            PointI::new(40, -3),
            PointI::new(40, 50),
            PointI::new(-5, 50),
        ];
        let rect = AxisRect::enclosing(&pts, 32, 24);
        assert_eq!(rect, AxisRect::new(0, 0, 32, 24));
    }

    #[test]
    fn test_fully_outside_is_empty() {
        let pts = [PointI::new(50, 50), PointI::new(60, 60)];
        let rect = AxisRect::enclosing(&pts, 32, 24);
        assert!(rect.is_empty());
        assert_eq!(rect, AxisRect::default());

        // Past the right edge only: x must still be a valid column
        let rect = AxisRect::new(40, 4, 8, 8).clip(32, 24);
        assert_eq!(rect, AxisRect::default());
        let rect = AxisRect::enclosing(&[PointI::new(-9, 3), PointI::new(-2, 9)], 32, 24);
        assert_eq!(rect, AxisRect::default());
        // Touching only the last column is kept
        assert_eq!(AxisRect::new(31, 0, 8, 4).clip(32, 24), AxisRect::new(31, 0, 1, 4));
    }
}
