use super::SymbolDecoder;
use crate::error::DecodeError;
use crate::models::{DecodedSymbol, Frame, SymbolData, SymbolKind};
use log::debug;
use rxing::{BarcodeFormat, Exceptions};

/// White border added around the input; localizer crops sit tight on the
/// outermost bars and 1-D readers need a quiet zone to find the start guard.
const QUIET_ZONE: usize = 24;

/// Linear barcode reader backed by `rxing`.
///
/// Only 1-D symbologies are reported; anything else the reader finds in the
/// crop (QR, Data Matrix, ...) is ignored.
#[derive(Debug, Clone, Copy)]
pub struct BarcodeDecoder {
    quiet_zone: usize,
}

impl Default for BarcodeDecoder {
    fn default() -> Self {
        Self {
            quiet_zone: QUIET_ZONE,
        }
    }
}

impl BarcodeDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the white margin padded around each input
    pub fn with_quiet_zone(mut self, pixels: usize) -> Self {
        self.quiet_zone = pixels;
        self
    }
}

impl SymbolDecoder for BarcodeDecoder {
    fn name(&self) -> &str {
        "rxing"
    }

    fn decode(&mut self, frame: &Frame) -> Result<Vec<DecodedSymbol>, DecodeError> {
        let (w, h) = (frame.width(), frame.height());
        if w == 0 || h == 0 {
            return Ok(Vec::new());
        }
        let (luma, pw, ph) = pad_white(&frame.to_grayscale(), w, h, self.quiet_zone);

        let results = match rxing::helpers::detect_multiple_in_luma(luma, pw as u32, ph as u32) {
            Ok(results) => results,
            Err(Exceptions::NotFoundException(_)) => return Ok(Vec::new()),
            Err(e) => return Err(DecodeError::Backend(e.to_string())),
        };

        let mut symbols = Vec::with_capacity(results.len());
        for result in &results {
            let format = result.getBarcodeFormat();
            match linear_name(format) {
                Some(name) => {
                    debug!("barcode decoded: {name} '{}'", result.getText());
                    symbols.push(DecodedSymbol::new(
                        SymbolKind::Barcode(name.to_string()),
                        SymbolData::Text(result.getText().to_string()),
                    ));
                }
                None => debug!("ignoring non-linear {format:?} in barcode region"),
            }
        }
        Ok(symbols)
    }
}

/// Symbology name for 1-D formats, `None` for 2-D ones
pub fn linear_name(format: &BarcodeFormat) -> Option<&'static str> {
    let name = match format {
        BarcodeFormat::EAN_13 => "EAN13",
        BarcodeFormat::EAN_8 => "EAN8",
        BarcodeFormat::UPC_A => "UPCA",
        BarcodeFormat::UPC_E => "UPCE",
        BarcodeFormat::CODE_128 => "CODE128",
        BarcodeFormat::CODE_39 => "CODE39",
        BarcodeFormat::CODE_93 => "CODE93",
        BarcodeFormat::CODABAR => "CODABAR",
        BarcodeFormat::ITF => "I25",
        BarcodeFormat::RSS_14 => "DATABAR",
        BarcodeFormat::RSS_EXPANDED => "DATABAR_EXP",
        _ => return None,
    };
    Some(name)
}

fn pad_white(gray: &[u8], width: usize, height: usize, margin: usize) -> (Vec<u8>, usize, usize) {
    let pw = width + 2 * margin;
    let ph = height + 2 * margin;
    let mut out = vec![255u8; pw * ph];
    for (y, row) in gray.chunks_exact(width).enumerate() {
        let start = (y + margin) * pw + margin;
        out[start..start + width].copy_from_slice(row);
    }
    (out, pw, ph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Color, PixelFormat};
    use rxing::{MultiFormatWriter, Writer};

    /// Code 128 with the writer's default margin, 2 px per module
    fn code128_frame(text: &str) -> Frame {
        let matrix = MultiFormatWriter::default()
            .encode(text, &BarcodeFormat::CODE_128, 1, 60)
            .unwrap();
        let (mw, mh) = (matrix.getWidth() as usize, matrix.getHeight() as usize);
        let mut frame = Frame::new(mw * 2, mh, PixelFormat::Bgr8);
        frame.as_bytes_mut().fill(255);
        for y in 0..mh {
            for x in 0..mw * 2 {
                if matrix.get((x / 2) as u32, y as u32) {
                    frame.put_pixel(x as i32, y as i32, Color::new(0, 0, 0));
                }
            }
        }
        frame
    }

    #[test]
    fn test_reads_code128() {
        let frame = code128_frame("MR-2024");
        let symbols = BarcodeDecoder::new().decode(&frame).unwrap();
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].caption(), "CODE128:MR-2024");
    }

    #[test]
    fn test_blank_and_empty_frames() {
        let mut blank = Frame::new(80, 40, PixelFormat::Gray8);
        blank.as_bytes_mut().fill(255);
        assert!(BarcodeDecoder::new().decode(&blank).unwrap().is_empty());

        let empty = Frame::new(0, 0, PixelFormat::Bgr8);
        assert!(BarcodeDecoder::new().decode(&empty).unwrap().is_empty());
    }

    #[test]
    fn test_two_dimensional_formats_are_not_linear() {
        assert_eq!(linear_name(&BarcodeFormat::EAN_13), Some("EAN13"));
        assert_eq!(linear_name(&BarcodeFormat::ITF), Some("I25"));
        assert_eq!(linear_name(&BarcodeFormat::QR_CODE), None);
        assert_eq!(linear_name(&BarcodeFormat::DATA_MATRIX), None);
    }

    #[test]
    fn test_pad_white() {
        let (out, w, h) = pad_white(&[0, 1, 2, 3], 2, 2, 1);
        assert_eq!((w, h), (4, 4));
        assert_eq!(&out[4..8], &[255, 0, 1, 255]);
        assert_eq!(&out[8..12], &[255, 2, 3, 255]);
        assert!(out[..4].iter().all(|&v| v == 255));
    }
}
