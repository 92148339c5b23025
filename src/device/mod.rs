//! Device-facing collaborators: camera, screen and serial link.
//!
//! The pipeline only sees these traits, so the same loop runs against
//! hardware, recorded image sequences or in-memory test doubles.

pub mod display;
pub mod source;
pub mod transport;

pub use display::{Display, NullDisplay, PngDirDisplay};
pub use source::{FrameSource, ImageSequence};
pub use transport::{LogTransport, MemoryTransport, SerialTransport, Transport};
