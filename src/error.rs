//! Error types, one enum per concern.
//!
//! "Nothing found" is never an error in this crate: localizers and decoders
//! return `Option`/empty `Vec` for that. These enums cover the conditions a
//! caller may want to log or act on.

use std::io;
use std::path::PathBuf;

/// Frame construction failures.
#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    #[error("buffer holds {actual} bytes, {width}x{height}x{channels} needs {expected}")]
    BufferSize {
        width: usize,
        height: usize,
        channels: usize,
        expected: usize,
        actual: usize,
    },
}

/// Configuration loading and validation failures.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Frames that cannot be parsed back into command + payload.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum PacketError {
    #[error("frame too short ({0} bytes)")]
    TooShort(usize),
    #[error("bad header byte 0x{0:02X}")]
    BadHeader(u8),
    #[error("length byte says {declared} payload bytes, frame carries {actual}")]
    LengthMismatch { declared: usize, actual: usize },
    #[error("legacy frame trailer is 0x{0:02X}, expected 0x00")]
    BadTrailer(u8),
    #[error("checksum mismatch: frame has 0x{found:02X}, computed 0x{computed:02X}")]
    Checksum { found: u8, computed: u8 },
}

/// Serial channel write failures. Always logged and swallowed by the pipeline.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("write failed: {0}")]
    Write(#[from] io::Error),
    #[error("short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },
}

/// Marker decoder failures; treated as "no symbol decoded".
#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("decoder backend failed: {0}")]
    Backend(String),
}

/// Frame acquisition failures.
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("frame source exhausted")]
    Exhausted,
    #[error("failed to list frames in {path}: {source}")]
    List {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("frame source has no frames")]
    Empty,
    #[error("failed to load {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Presentation failures; logged, never fatal.
#[derive(thiserror::Error, Debug)]
pub enum DisplayError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Conditions that end the processing loop.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),
}
