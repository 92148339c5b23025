//! Marker content decoders
//!
//! The pipeline hands each decoder a cropped region (or the whole frame) and
//! consumes whatever symbols come back. Reader internals stay behind
//! [`SymbolDecoder`]; this crate ships a linear barcode reader, a QR reader and a no-op.

/// Linear barcode reader backed by `rxing`
pub mod barcode;
/// QR reader backed by `rqrr`
pub mod qr;

pub use barcode::BarcodeDecoder;
pub use qr::QrDecoder;

use crate::error::DecodeError;
use crate::models::{DecodedSymbol, Frame};

/// Turns an image into zero or more decoded symbols.
///
/// Symbol corners, when present, are relative to the frame passed in.
/// An error is logged by the caller and treated like "nothing decoded".
pub trait SymbolDecoder {
    /// Short name for logs
    fn name(&self) -> &str;

    fn decode(&mut self, frame: &Frame) -> Result<Vec<DecodedSymbol>, DecodeError>;
}

/// Decoder for platforms without a reader for a strategy; never finds anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDecoder;

impl SymbolDecoder for NullDecoder {
    fn name(&self) -> &str {
        "null"
    }

    fn decode(&mut self, _frame: &Frame) -> Result<Vec<DecodedSymbol>, DecodeError> {
        Ok(Vec::new())
    }
}

impl<D: SymbolDecoder + ?Sized> SymbolDecoder for Box<D> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn decode(&mut self, frame: &Frame) -> Result<Vec<DecodedSymbol>, DecodeError> {
        (**self).decode(frame)
    }
}
