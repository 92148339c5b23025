//! Annotation drawing on frames.
//!
//! Shapes are rasterised straight into the frame and clip at its edges.
//! Text is not rendered here: captions are collected as [`Label`]s and the
//! display decides how to draw them.

use crate::models::{Color, Frame, PointI};

/// Caption anchored at its top-left pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub origin: PointI,
    pub text: String,
    pub color: Color,
}

impl Label {
    pub fn new(origin: PointI, text: impl Into<String>, color: Color) -> Self {
        Self {
            origin,
            text: text.into(),
            color,
        }
    }

    /// Caption for a region whose top edge is at `top`: 10 px above it,
    /// never above the frame.
    pub fn above(left: i32, top: i32, text: impl Into<String>, color: Color) -> Self {
        Self::new(PointI::new(left, (top - 10).max(0)), text, color)
    }
}

/// Square brush of side `thickness` centred on `(x, y)`
fn stamp(frame: &mut Frame, x: i32, y: i32, thickness: u32, color: Color) {
    let t = thickness.max(1) as i32;
    let lo = -(t - 1) / 2;
    let hi = t / 2;
    for dy in lo..=hi {
        for dx in lo..=hi {
            frame.put_pixel(x + dx, y + dy, color);
        }
    }
}

/// Bresenham line from `a` to `b`, both ends included
pub fn draw_line(frame: &mut Frame, a: PointI, b: PointI, color: Color, thickness: u32) {
    let dx = (b.x - a.x).abs();
    let dy = -(b.y - a.y).abs();
    let sx = if a.x < b.x { 1 } else { -1 };
    let sy = if a.y < b.y { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (a.x, a.y);
    loop {
        stamp(frame, x, y, thickness, color);
        if x == b.x && y == b.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Connected segments through `points`; `closed` joins the last to the first
pub fn draw_polyline(frame: &mut Frame, points: &[PointI], closed: bool, color: Color, thickness: u32) {
    for w in points.windows(2) {
        draw_line(frame, w[0], w[1], color, thickness);
    }
    if closed && points.len() > 2 {
        draw_line(frame, points[points.len() - 1], points[0], color, thickness);
    }
}

/// Solid disc of `radius` pixels around `center`
pub fn fill_circle(frame: &mut Frame, center: PointI, radius: i32, color: Color) {
    let r2 = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= r2 {
                frame.put_pixel(center.x + dx, center.y + dy, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PixelFormat;

    fn lit(frame: &Frame) -> usize {
        frame.as_bytes().iter().filter(|&&v| v != 0).count()
    }

    #[test]
    fn test_line_endpoints_inclusive() {
        let mut frame = Frame::new(10, 10, PixelFormat::Gray8);
        draw_line(&mut frame, PointI::new(1, 1), PointI::new(8, 1), Color::GREEN, 1);
        assert_eq!(lit(&frame), 8);
        assert_ne!(frame.pixel(1, 1)[0], 0);
        assert_ne!(frame.pixel(8, 1)[0], 0);
    }

    #[test]
    fn test_diagonal_and_thickness() {
        let mut frame = Frame::new(10, 10, PixelFormat::Gray8);
        draw_line(&mut frame, PointI::new(0, 0), PointI::new(4, 4), Color::GREEN, 1);
        assert_eq!(lit(&frame), 5);

        let mut thick = Frame::new(10, 10, PixelFormat::Gray8);
        draw_line(&mut thick, PointI::new(2, 5), PointI::new(7, 5), Color::GREEN, 2);
        // 2x2 brush over x = 2..=7 covers x = 2..=8, y = 5..=6
        assert_eq!(lit(&thick), 14);
    }

    #[test]
    fn test_shapes_clip_at_edges() {
        let mut frame = Frame::new(6, 6, PixelFormat::Bgr8);
        fill_circle(&mut frame, PointI::new(0, 0), 5, Color::RED);
        draw_polyline(
            &mut frame,
            &[PointI::new(-3, -3), PointI::new(10, -3), PointI::new(10, 10)],
            true,
            Color::GREEN,
            2,
        );
        assert_eq!(frame.pixel(0, 0), &[0, 0, 255]);
    }

    #[test]
    fn test_closed_polyline_rectangle() {
        let mut frame = Frame::new(20, 20, PixelFormat::Gray8);
        let rect = [
            PointI::new(2, 2),
            PointI::new(12, 2),
            PointI::new(12, 8),
            PointI::new(2, 8),
        ];
        draw_polyline(&mut frame, &rect, true, Color::GREEN, 1);
        // Perimeter of an 11x7 pixel box
        assert_eq!(lit(&frame), 2 * 11 + 2 * 5);
    }

    #[test]
    fn test_label_clamped_to_top() {
        assert_eq!(Label::above(5, 4, "x", Color::RED).origin, PointI::new(5, 0));
        assert_eq!(Label::above(5, 40, "x", Color::RED).origin, PointI::new(5, 30));
    }
}
