use crate::error::FrameError;
use crate::models::AxisRect;
use crate::utils::grayscale::bgr_to_grayscale;

/// Pixel layout of a [`Frame`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// One intensity byte per pixel
    Gray8,
    /// Three bytes per pixel in blue, green, red order
    Bgr8,
}

impl PixelFormat {
    /// Bytes per pixel
    pub fn channels(&self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Bgr8 => 3,
        }
    }
}

/// Overlay colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub b: u8,
    pub g: u8,
    pub r: u8,
}

impl Color {
    pub const GREEN: Color = Color::new(0, 255, 0);
    pub const RED: Color = Color::new(255, 0, 0);

    /// Build from red, green, blue components
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { b, g, r }
    }

    /// Intensity used when drawing on a grayscale frame
    pub fn luma(&self) -> u8 {
        ((76 * self.r as u32 + 150 * self.g as u32 + 29 * self.b as u32) >> 8) as u8
    }
}

/// One acquired image, row-major, tightly packed.
///
/// A frame belongs to exactly one processing cycle: overlays are drawn into
/// it in place and it is dropped after display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    format: PixelFormat,
    data: Vec<u8>,
}

impl Frame {
    /// Create a black frame
    pub fn new(width: usize, height: usize, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            data: vec![0; width * height * format.channels()],
        }
    }

    /// Wrap an existing buffer, checking its length
    pub fn from_raw(
        width: usize,
        height: usize,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self, FrameError> {
        let channels = format.channels();
        let expected = width * height * channels;
        if data.len() != expected {
            return Err(FrameError::BufferSize {
                width,
                height,
                channels,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Bytes of the pixel at `(x, y)`; panics when out of range
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let c = self.format.channels();
        let idx = (y * self.width + x) * c;
        &self.data[idx..idx + c]
    }

    /// Single-channel intensity copy of the frame
    pub fn to_grayscale(&self) -> Vec<u8> {
        match self.format {
            PixelFormat::Gray8 => self.data.clone(),
            PixelFormat::Bgr8 => bgr_to_grayscale(&self.data, self.width, self.height),
        }
    }

    /// Copy out the pixels under `rect`.
    ///
    /// Returns `None` when the rectangle, clipped to the frame, is empty.
    pub fn crop(&self, rect: &AxisRect) -> Option<Frame> {
        let clipped = rect.clip(self.width, self.height);
        if clipped.is_empty() {
            return None;
        }
        let c = self.format.channels();
        let mut data = Vec::with_capacity(clipped.width * clipped.height * c);
        for y in clipped.y..clipped.y + clipped.height {
            let start = (y * self.width + clipped.x) * c;
            data.extend_from_slice(&self.data[start..start + clipped.width * c]);
        }
        Some(Frame {
            width: clipped.width,
            height: clipped.height,
            format: self.format,
            data,
        })
    }

    /// Paint one pixel; coordinates outside the frame are ignored.
    pub fn put_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let c = self.format.channels();
        let idx = (y as usize * self.width + x as usize) * c;
        match self.format {
            PixelFormat::Gray8 => self.data[idx] = color.luma(),
            PixelFormat::Bgr8 => {
                self.data[idx] = color.b;
                self.data[idx + 1] = color.g;
                self.data[idx + 2] = color.r;
            }
        }
    }
}
