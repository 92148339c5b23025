use crate::error::SourceError;
use crate::models::Frame;
use crate::tools::{list_images, load_frame};
use log::{debug, warn};
use std::path::{Path, PathBuf};

/// Produces one frame per acquisition cycle.
///
/// `Ok(None)` means no frame this cycle (the loop simply moves on).
/// [`SourceError::Exhausted`] ends the loop normally; any other error ends it
/// with that error.
pub trait FrameSource {
    fn read_frame(&mut self) -> Result<Option<Frame>, SourceError>;
}

/// Frames played back from image files in path order
#[derive(Debug, Clone)]
pub struct ImageSequence {
    paths: Vec<PathBuf>,
    next: usize,
    repeat: bool,
}

impl ImageSequence {
    /// Every image under `dir`, sorted by path
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, SourceError> {
        let dir = dir.as_ref();
        let paths = list_images(dir).map_err(|source| SourceError::List {
            path: dir.to_path_buf(),
            source,
        })?;
        Self::from_paths(paths)
    }

    pub fn from_paths(paths: Vec<PathBuf>) -> Result<Self, SourceError> {
        if paths.is_empty() {
            return Err(SourceError::Empty);
        }
        debug!("image sequence with {} frames", paths.len());
        Ok(Self {
            paths,
            next: 0,
            repeat: false,
        })
    }

    /// Start over after the last frame instead of reporting exhaustion
    pub fn with_repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FrameSource for ImageSequence {
    /// Unreadable files are skipped with a warning.
    fn read_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        if self.next >= self.paths.len() {
            if !self.repeat {
                return Err(SourceError::Exhausted);
            }
            self.next = 0;
        }
        let path = &self.paths[self.next];
        self.next += 1;
        match load_frame(path) {
            Ok(frame) => Ok(Some(frame)),
            Err(e) => {
                warn!("skipping frame: {e}");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PixelFormat;
    use crate::tools::save_frame;
    use std::fs;

    fn write_frames(dir: &Path, n: usize) {
        for i in 0..n {
            let frame = Frame::new(4 + i, 4, PixelFormat::Bgr8);
            save_frame(&frame, dir.join(format!("f{i}.png"))).unwrap();
        }
    }

    #[test]
    fn test_sequence_plays_in_order_then_exhausts() {
        let dir = tempfile::tempdir().unwrap();
        write_frames(dir.path(), 2);
        let mut seq = ImageSequence::from_dir(dir.path()).unwrap();
        assert_eq!(seq.read_frame().unwrap().unwrap().width(), 4);
        assert_eq!(seq.read_frame().unwrap().unwrap().width(), 5);
        assert!(matches!(seq.read_frame(), Err(SourceError::Exhausted)));
    }

    #[test]
    fn test_sequence_repeat_wraps() {
        let dir = tempfile::tempdir().unwrap();
        write_frames(dir.path(), 1);
        let mut seq = ImageSequence::from_dir(dir.path()).unwrap().with_repeat(true);
        for _ in 0..3 {
            assert!(seq.read_frame().unwrap().is_some());
        }
    }

    #[test]
    fn test_corrupt_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.png"), b"not a png").unwrap();
        let mut seq = ImageSequence::from_dir(dir.path()).unwrap();
        assert!(seq.read_frame().unwrap().is_none());
    }

    #[test]
    fn test_empty_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ImageSequence::from_dir(dir.path()),
            Err(SourceError::Empty)
        ));
    }
}
