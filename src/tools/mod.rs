//! Image file helpers shared by the CLI, the file-backed devices and benches.

use crate::error::SourceError;
use crate::models::{AxisRect, BinaryMask, Color, Frame, PixelFormat};
use crate::utils::grayscale::swap_red_blue;
use image::{GrayImage, ImageResult, RgbImage};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "bmp"];

/// Load an image file as a BGR frame.
pub fn load_frame<P: AsRef<Path>>(path: P) -> Result<Frame, SourceError> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|source| SourceError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let mut data = rgb.into_raw();
    swap_red_blue(&mut data);
    Ok(Frame::from_raw(
        width as usize,
        height as usize,
        PixelFormat::Bgr8,
        data,
    )?)
}

/// Convert a frame to an 8-bit RGB image
pub fn frame_to_rgb(frame: &Frame) -> RgbImage {
    RgbImage::from_fn(frame.width() as u32, frame.height() as u32, |x, y| {
        let px = frame.pixel(x as usize, y as usize);
        match frame.format() {
            PixelFormat::Gray8 => image::Rgb([px[0], px[0], px[0]]),
            PixelFormat::Bgr8 => image::Rgb([px[2], px[1], px[0]]),
        }
    })
}

/// Write a frame; the format follows the file extension.
pub fn save_frame<P: AsRef<Path>>(frame: &Frame, path: P) -> ImageResult<()> {
    frame_to_rgb(frame).save(path)
}

/// Write a single-channel buffer.
pub fn save_gray<P: AsRef<Path>>(gray: &[u8], width: usize, height: usize, path: P) -> ImageResult<()> {
    GrayImage::from_fn(width as u32, height as u32, |x, y| {
        image::Luma([gray[y as usize * width + x as usize]])
    })
    .save(path)
}

/// Write a mask as black background, white foreground.
pub fn save_mask<P: AsRef<Path>>(mask: &BinaryMask, path: P) -> ImageResult<()> {
    GrayImage::from_fn(mask.width() as u32, mask.height() as u32, |x, y| {
        image::Luma([if mask.get(x as usize, y as usize) { 255 } else { 0 }])
    })
    .save(path)
}

/// Summary statistics for grayscale data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrayStats {
    pub min: u8,
    pub max: u8,
    pub avg: u8,
}

/// Foreground share of a mask.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskStats {
    pub foreground: usize,
    pub total: usize,
    pub ratio: f64,
}

/// Compute min/max/avg for grayscale values.
pub fn grayscale_stats(gray: &[u8]) -> GrayStats {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    let mut sum: u64 = 0;
    for &v in gray {
        min = min.min(v);
        max = max.max(v);
        sum += v as u64;
    }
    let avg = if gray.is_empty() {
        0
    } else {
        (sum / gray.len() as u64) as u8
    };
    GrayStats { min, max, avg }
}

pub fn mask_stats(mask: &BinaryMask) -> MaskStats {
    let foreground = mask.count_ones();
    let total = mask.width() * mask.height();
    let ratio = if total == 0 {
        0.0
    } else {
        foreground as f64 / total as f64
    };
    MaskStats {
        foreground,
        total,
        ratio,
    }
}

/// White BGR frame with black vertical bars of `bar` px every `bar + gap` px
/// inside `area`, a stand-in for a linear barcode.
pub fn bar_pattern_frame(width: usize, height: usize, area: AxisRect, bar: usize, gap: usize) -> Frame {
    let mut frame = Frame::new(width, height, PixelFormat::Bgr8);
    frame.as_bytes_mut().fill(255);
    let area = area.clip(width, height);
    let period = (bar + gap).max(1);
    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            if (x - area.x) % period < bar {
                frame.put_pixel(x as i32, y as i32, Color::new(0, 0, 0));
            }
        }
    }
    frame
}

/// White BGR frame with a black rectangular outline of `thickness` px
/// along the inside of each rect.
pub fn outline_frame(width: usize, height: usize, rects: &[AxisRect], thickness: usize) -> Frame {
    let mut frame = Frame::new(width, height, PixelFormat::Bgr8);
    frame.as_bytes_mut().fill(255);
    for r in rects {
        let r = r.clip(width, height);
        for y in r.y..r.y + r.height {
            for x in r.x..r.x + r.width {
                let inside = x >= r.x + thickness
                    && x + thickness < r.x + r.width
                    && y >= r.y + thickness
                    && y + thickness < r.y + r.height;
                if !inside {
                    frame.put_pixel(x as i32, y as i32, Color::new(0, 0, 0));
                }
            }
        }
    }
    frame
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Image files under `root`, recursively, sorted by path.
///
/// Fails only if `root` itself cannot be read; unreadable subdirectories are
/// skipped.
pub fn list_images<P: AsRef<Path>>(root: P) -> io::Result<Vec<PathBuf>> {
    let root = root.as_ref();
    let mut stack = vec![root.to_path_buf()];
    let mut images = Vec::new();
    let mut first = true;

    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if first => return Err(e),
            Err(_) => continue,
        };
        first = false;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if is_image(&path) {
                images.push(path);
            }
        }
    }

    images.sort();
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_frames() {
        let bars = bar_pattern_frame(20, 10, AxisRect::new(2, 2, 10, 5), 2, 3);
        assert_eq!(bars.pixel(2, 2), &[0, 0, 0]);
        assert_eq!(bars.pixel(4, 2), &[255, 255, 255]);
        assert_eq!(bars.pixel(7, 6), &[0, 0, 0]);
        assert_eq!(bars.pixel(7, 7), &[255, 255, 255]);

        let outline = outline_frame(20, 20, &[AxisRect::new(2, 2, 10, 10)], 2);
        assert_eq!(outline.pixel(3, 6), &[0, 0, 0]);
        assert_eq!(outline.pixel(4, 6), &[255, 255, 255]);
        assert_eq!(outline.pixel(11, 6), &[0, 0, 0]);
        assert_eq!(outline.pixel(12, 6), &[255, 255, 255]);
    }

    #[test]
    fn test_frame_roundtrips_through_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let mut frame = Frame::new(4, 3, PixelFormat::Bgr8);
        frame.put_pixel(1, 2, Color::new(10, 20, 30));
        save_frame(&frame, &path).unwrap();

        let loaded = load_frame(&path).unwrap();
        assert_eq!(loaded, frame);
        assert_eq!(loaded.pixel(1, 2), &[30, 20, 10]);
    }

    #[test]
    fn test_list_images_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        for name in ["b.png", "a.JPG", "notes.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::write(sub.join("c.bmp"), b"").unwrap();

        let images = list_images(dir.path()).unwrap();
        let names: Vec<String> = images
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().display().to_string())
            .collect();
        assert_eq!(names, vec!["a.JPG", "b.png", "sub/c.bmp"]);
    }

    #[test]
    fn test_list_images_missing_root() {
        assert!(list_images("/definitely/not/here").is_err());
    }

    #[test]
    fn test_stats() {
        let s = grayscale_stats(&[10, 20, 30]);
        assert_eq!((s.min, s.max, s.avg), (10, 30, 20));
        let mut mask = BinaryMask::new(4, 4);
        mask.fill_rect(0, 0, 2, 2, true);
        let m = mask_stats(&mask);
        assert_eq!(m.foreground, 4);
        assert!((m.ratio - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            load_frame("/no/such/frame.png"),
            Err(SourceError::Load { .. })
        ));
    }
}
