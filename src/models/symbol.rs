use super::PointI;
use std::fmt;

/// Symbology of a decoded marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolKind {
    /// QR code
    Qr,
    /// Linear barcode, named by the reader (e.g. "EAN13", "CODE128")
    Barcode(String),
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKind::Qr => f.write_str("QRCODE"),
            SymbolKind::Barcode(name) => f.write_str(name),
        }
    }
}

/// Decoded content: text when the reader output is valid UTF-8, raw bytes otherwise
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolData {
    Text(String),
    Bytes(Vec<u8>),
}

impl SymbolData {
    /// Classify raw reader output
    pub fn from_raw(raw: Vec<u8>) -> Self {
        match String::from_utf8(raw) {
            Ok(text) => SymbolData::Text(text),
            Err(err) => SymbolData::Bytes(err.into_bytes()),
        }
    }
}

impl fmt::Display for SymbolData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolData::Text(text) => f.write_str(text),
            SymbolData::Bytes(bytes) => {
                for b in bytes {
                    write!(f, "{b:02X}")?;
                }
                Ok(())
            }
        }
    }
}

/// One marker read by a decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSymbol {
    pub kind: SymbolKind,
    pub data: SymbolData,
    /// Symbol outline, relative to the image handed to the decoder
    pub corners: Option<[PointI; 4]>,
}

impl DecodedSymbol {
    pub fn new(kind: SymbolKind, data: SymbolData) -> Self {
        Self {
            kind,
            data,
            corners: None,
        }
    }

    pub fn with_corners(mut self, corners: [PointI; 4]) -> Self {
        self.corners = Some(corners);
        self
    }

    /// Move the outline by `(dx, dy)`, e.g. from ROI into frame coordinates
    pub fn translated(mut self, dx: i32, dy: i32) -> Self {
        if let Some(corners) = self.corners.as_mut() {
            for c in corners.iter_mut() {
                *c = c.offset(dx, dy);
            }
        }
        self
    }

    /// Overlay caption, `type:text`
    pub fn caption(&self) -> String {
        format!("{}:{}", self.kind, self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_utf8_stays_bytes() {
        assert_eq!(
            SymbolData::from_raw(vec![0xff, 0x01]),
            SymbolData::Bytes(vec![0xff, 0x01])
        );
        assert_eq!(
            SymbolData::from_raw(b"abc".to_vec()),
            SymbolData::Text("abc".into())
        );
    }

    #[test]
    fn test_caption_and_translate() {
        let sym = DecodedSymbol::new(
            SymbolKind::Barcode("EAN13".into()),
            SymbolData::Text("4006381333931".into()),
        )
        .with_corners([PointI::new(0, 0); 4])
        .translated(5, 7);
        assert_eq!(sym.caption(), "EAN13:4006381333931");
        assert_eq!(sym.corners.unwrap()[2], PointI::new(5, 7));
    }
}
