use crate::error::DisplayError;
use crate::models::Frame;
use crate::overlay::Label;
use crate::tools::save_frame;
use log::debug;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Presents an annotated frame. Text labels are rendered by the display.
pub trait Display {
    fn show(&mut self, frame: &Frame, labels: &[Label]) -> Result<(), DisplayError>;
}

/// Writes each shown frame as a numbered PNG.
///
/// Labels go to a `.txt` file next to the image, one `x y text` line each.
#[derive(Debug, Clone)]
pub struct PngDirDisplay {
    dir: PathBuf,
    shown: usize,
}

impl PngDirDisplay {
    /// Create the directory if needed
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, DisplayError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, shown: 0 })
    }

    pub fn shown(&self) -> usize {
        self.shown
    }
}

impl Display for PngDirDisplay {
    fn show(&mut self, frame: &Frame, labels: &[Label]) -> Result<(), DisplayError> {
        let path = self.dir.join(format!("frame_{:06}.png", self.shown));
        self.shown += 1;
        save_frame(frame, &path).map_err(|source| DisplayError::Write {
            path: path.clone(),
            source,
        })?;

        if !labels.is_empty() {
            let mut text = String::new();
            for label in labels {
                let _ = writeln!(text, "{} {} {}", label.origin.x, label.origin.y, label.text);
            }
            fs::write(path.with_extension("txt"), text)?;
        }
        debug!("display wrote {}", path.display());
        Ok(())
    }
}

/// Discards frames, counting them
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDisplay {
    shown: usize,
}

impl NullDisplay {
    pub fn shown(&self) -> usize {
        self.shown
    }
}

impl Display for NullDisplay {
    fn show(&mut self, _frame: &Frame, _labels: &[Label]) -> Result<(), DisplayError> {
        self.shown += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Color, PixelFormat, PointI};

    #[test]
    fn test_png_display_numbers_frames_and_writes_labels() {
        let dir = tempfile::tempdir().unwrap();
        let mut display = PngDirDisplay::new(dir.path().join("out")).unwrap();
        let frame = Frame::new(8, 8, PixelFormat::Bgr8);
        display.show(&frame, &[]).unwrap();
        display
            .show(&frame, &[Label::new(PointI::new(1, 0), "QRCODE:hi", Color::RED)])
            .unwrap();

        let out = dir.path().join("out");
        assert!(out.join("frame_000000.png").exists());
        assert!(!out.join("frame_000000.txt").exists());
        let labels = fs::read_to_string(out.join("frame_000001.txt")).unwrap();
        assert_eq!(labels, "1 0 QRCODE:hi\n");
        assert_eq!(display.shown(), 2);
    }
}
