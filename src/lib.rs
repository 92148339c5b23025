//! marker_relay - locate barcodes and rectangular markers in camera frames
//! and relay their contents over a framed serial link.
//!
//! The crate is organised bottom-up:
//! - [`models`] and [`utils`]: frames, masks, geometry and the image filters
//! - [`detector`]: the gradient (linear barcode) and rectangle localizers
//! - [`decoder`]: the [`SymbolDecoder`] seam, with `rxing` barcode and `rqrr` QR readers
//! - [`protocol`]: payload rules and the `A5 cmd len payload chk` framing
//! - [`device`]: frame sources, displays and transports
//! - [`pipeline`]: the acquisition loop tying them together
//!
//! ```no_run
//! use marker_relay::{Command, FrameFormat, encode};
//!
//! let packet = encode(123u32, Command::MARKER, FrameFormat::Current);
//! assert_eq!(packet.as_bytes(), &[0xA5, 0x00, 0x01, 0x7B, 0x21]);
//! ```

/// Runtime configuration (JSON)
pub mod config;
/// Marker content decoders
pub mod decoder;
/// Marker localization strategies
pub mod detector;
/// Frame sources, displays and transports
pub mod device;
/// Error types
pub mod error;
/// Core data structures (Frame, BinaryMask, CandidateRegion, ...)
pub mod models;
/// Drawing annotations onto frames
pub mod overlay;
/// The per-frame processing loop
pub mod pipeline;
/// Serial framing protocol
pub mod protocol;
/// Image file helpers
pub mod tools;
/// Image-processing building blocks
pub mod utils;

pub use config::{Config, QrSearch, SerialConfig};
pub use decoder::{BarcodeDecoder, NullDecoder, QrDecoder, SymbolDecoder};
pub use detector::{GradientLocalizer, GradientParams, RectangleLocalizer, RectangleParams, Strategy};
pub use error::{
    ConfigError, DecodeError, DisplayError, FrameError, PacketError, PipelineError, SourceError,
    TransportError,
};
pub use models::{
    AxisRect, BinaryMask, CandidateRegion, Color, DecodedSymbol, Frame, PixelFormat, Point,
    PointI, SymbolData, SymbolKind,
};
pub use overlay::Label;
pub use pipeline::{CycleReport, LoopStats, Pipeline};
pub use protocol::{Command, FrameFormat, Packet, Payload, decode, encode};
