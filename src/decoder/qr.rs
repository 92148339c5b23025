use super::SymbolDecoder;
use crate::error::DecodeError;
use crate::models::{DecodedSymbol, Frame, PointI, SymbolData, SymbolKind};
use log::debug;
use rqrr::PreparedImage;

/// QR reader over the luminance of a frame
#[derive(Debug, Clone, Copy, Default)]
pub struct QrDecoder;

impl QrDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl SymbolDecoder for QrDecoder {
    fn name(&self) -> &str {
        "rqrr"
    }

    /// Every grid that decodes becomes a symbol. If grids were found but none
    /// decoded, the last backend error is returned.
    fn decode(&mut self, frame: &Frame) -> Result<Vec<DecodedSymbol>, DecodeError> {
        let (w, h) = (frame.width(), frame.height());
        if w == 0 || h == 0 {
            return Ok(Vec::new());
        }
        let gray = frame.to_grayscale();
        let mut img = PreparedImage::prepare_from_greyscale(w, h, |x, y| gray[y * w + x]);
        let grids = img.detect_grids();

        let mut symbols = Vec::with_capacity(grids.len());
        let mut last_err = None;
        for grid in &grids {
            let mut raw = Vec::new();
            match grid.decode_to(&mut raw) {
                Ok(meta) => {
                    debug!("qr grid decoded: version={:?} bytes={}", meta.version, raw.len());
                    let corners = grid.bounds.map(|p| PointI::new(p.x, p.y));
                    symbols.push(
                        DecodedSymbol::new(SymbolKind::Qr, SymbolData::from_raw(raw))
                            .with_corners(corners),
                    );
                }
                Err(e) => {
                    debug!("qr grid failed: {e}");
                    last_err = Some(e);
                }
            }
        }

        match last_err {
            Some(e) if symbols.is_empty() => Err(DecodeError::Backend(e.to_string())),
            _ => Ok(symbols),
        }
    }
}
