//! Payload normalisation: everything the encoder accepts becomes bytes here.

use std::fmt;

/// Code points of DIGIT ZERO for every Unicode decimal-digit (Nd) block.
/// Each block holds the ten digits 0..=9 contiguously.
const DECIMAL_ZEROS: [u32; 68] = [
    0x0030, 0x0660, 0x06F0, 0x07C0, 0x0966, 0x09E6, 0x0A66, 0x0AE6, 0x0B66, 0x0BE6, 0x0C66,
    0x0CE6, 0x0D66, 0x0DE6, 0x0E50, 0x0ED0, 0x0F20, 0x1040, 0x1090, 0x17E0, 0x1810, 0x1946,
    0x19D0, 0x1A80, 0x1A90, 0x1B50, 0x1BB0, 0x1C40, 0x1C50, 0xA620, 0xA8D0, 0xA900, 0xA9D0,
    0xA9F0, 0xAA50, 0xABF0, 0xFF10, 0x104A0, 0x10D30, 0x11066, 0x110F0, 0x11136, 0x111D0,
    0x112F0, 0x11450, 0x114D0, 0x11650, 0x116C0, 0x11730, 0x118E0, 0x11950, 0x11C50, 0x11D50,
    0x11DA0, 0x11F50, 0x16A60, 0x16AC0, 0x16B50, 0x1D7CE, 0x1D7D8, 0x1D7E2, 0x1D7EC, 0x1D7F6,
    0x1E140, 0x1E2F0, 0x1E4F0, 0x1E950, 0x1FBF0,
];

/// Value of a Unicode decimal digit: `'7'`, `'７'` and `'٧'` are all 7.
/// Superscripts and other numeric-but-not-decimal characters give `None`.
pub fn decimal_digit(c: char) -> Option<u8> {
    let cp = c as u32;
    let idx = DECIMAL_ZEROS.partition_point(|&zero| zero <= cp);
    let zero = DECIMAL_ZEROS[idx.checked_sub(1)?];
    (cp - zero < 10).then(|| (cp - zero) as u8)
}

/// Input to the packet encoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Sent verbatim
    Bytes(Vec<u8>),
    /// Sent as minimal big-endian magnitude
    Integer(u128),
    /// Interpreted by the ordered [`TextRule`]s
    Text(String),
}

impl From<Vec<u8>> for Payload {
    fn from(v: Vec<u8>) -> Self {
        Payload::Bytes(v)
    }
}

impl From<&[u8]> for Payload {
    fn from(v: &[u8]) -> Self {
        Payload::Bytes(v.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Payload {
    fn from(v: &[u8; N]) -> Self {
        Payload::Bytes(v.to_vec())
    }
}

impl From<u128> for Payload {
    fn from(v: u128) -> Self {
        Payload::Integer(v)
    }
}

impl From<u64> for Payload {
    fn from(v: u64) -> Self {
        Payload::Integer(v.into())
    }
}

impl From<u32> for Payload {
    fn from(v: u32) -> Self {
        Payload::Integer(v.into())
    }
}

impl From<&str> for Payload {
    fn from(v: &str) -> Self {
        Payload::Text(v.to_string())
    }
}

impl From<String> for Payload {
    fn from(v: String) -> Self {
        Payload::Text(v)
    }
}

impl Payload {
    /// Wire bytes for this payload
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Payload::Bytes(b) => b.clone(),
            Payload::Integer(n) => integer_bytes(*n),
            Payload::Text(t) => text_bytes(t).1,
        }
    }
}

/// Minimal big-endian bytes of `n`; zero is one `0x00` byte
pub fn integer_bytes(n: u128) -> Vec<u8> {
    let bytes = n.to_be_bytes();
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
    bytes[first..].to_vec()
}

/// How a text payload was interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRule {
    /// Nothing left after removing `0x` prefixes and spaces
    Empty,
    /// Decimal digits of any length
    Decimal,
    /// Hex digits, odd counts padded on the left
    Hex,
    /// Fallback: UTF-8 of the text as given
    Utf8,
}

impl fmt::Display for TextRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TextRule::Empty => "empty",
            TextRule::Decimal => "decimal",
            TextRule::Hex => "hex",
            TextRule::Utf8 => "utf8",
        };
        f.write_str(name)
    }
}

impl TextRule {
    /// Evaluation order; the first rule that applies wins.
    pub const ORDER: [TextRule; 4] = [
        TextRule::Empty,
        TextRule::Decimal,
        TextRule::Hex,
        TextRule::Utf8,
    ];

    /// Bytes for `text` under this rule, or `None` if the rule does not apply
    pub fn apply(self, text: &str) -> Option<Vec<u8>> {
        let stripped = text.trim();
        let clean = stripped.replace("0x", "").replace("0X", "").replace(' ', "");
        match self {
            TextRule::Empty => clean.is_empty().then(Vec::new),
            TextRule::Decimal => {
                let digits: Option<Vec<u8>> = stripped.chars().map(decimal_digit).collect();
                digits
                    .filter(|d| !d.is_empty())
                    .map(|d| decimal_bytes(&d))
            }
            TextRule::Hex => clean
                .bytes()
                .all(|b| b.is_ascii_hexdigit())
                .then(|| hex_bytes(&clean)),
            TextRule::Utf8 => Some(text.as_bytes().to_vec()),
        }
    }
}

/// Interpret text by the first applicable rule
pub fn text_bytes(text: &str) -> (TextRule, Vec<u8>) {
    for rule in TextRule::ORDER {
        if let Some(bytes) = rule.apply(text) {
            return (rule, bytes);
        }
    }
    (TextRule::Utf8, text.as_bytes().to_vec())
}

/// Big-endian bytes of an arbitrarily long sequence of decimal digit values
fn decimal_bytes(digits: &[u8]) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::new();
    for &d in digits {
        let mut carry = d as u32;
        for byte in out.iter_mut().rev() {
            let v = *byte as u32 * 10 + carry;
            *byte = (v & 0xFF) as u8;
            carry = v >> 8;
        }
        while carry > 0 {
            out.insert(0, (carry & 0xFF) as u8);
            carry >>= 8;
        }
    }
    if out.is_empty() {
        out.push(0);
    }
    out
}

/// Decode hex digits (already validated), left-padding odd lengths
fn hex_bytes(hex: &str) -> Vec<u8> {
    let nibble = |c: u8| match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        _ => c - b'A' + 10,
    };
    let mut digits: Vec<u8> = hex.bytes().map(nibble).collect();
    if digits.len() % 2 == 1 {
        digits.insert(0, 0);
    }
    digits.chunks(2).map(|p| (p[0] << 4) | p[1]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_bytes() {
        assert_eq!(integer_bytes(0), vec![0x00]);
        assert_eq!(integer_bytes(123), vec![0x7B]);
        assert_eq!(integer_bytes(256), vec![0x01, 0x00]);
        assert_eq!(integer_bytes(u128::MAX), vec![0xFF; 16]);
    }

    #[test]
    fn test_empty_rule() {
        assert_eq!(TextRule::Empty.apply("  0x  "), Some(vec![]));
        assert_eq!(TextRule::Empty.apply(""), Some(vec![]));
        assert_eq!(TextRule::Empty.apply("a"), None);
    }

    #[test]
    fn test_decimal_rule() {
        assert_eq!(TextRule::Decimal.apply(" 123 "), Some(vec![0x7B]));
        assert_eq!(TextRule::Decimal.apply("0"), Some(vec![0x00]));
        assert_eq!(TextRule::Decimal.apply("4660"), Some(vec![0x12, 0x34]));
        assert_eq!(TextRule::Decimal.apply("12 34"), None);
        assert_eq!(TextRule::Decimal.apply("7B"), None);
        // Beyond u128
        let big = "340282366920938463463374607431768211456"; // 2^128
        let mut expected = vec![0x01];
        expected.extend([0u8; 16]);
        assert_eq!(TextRule::Decimal.apply(big), Some(expected));
    }

    #[test]
    fn test_decimal_rule_accepts_unicode_digits() {
        // Fullwidth and Arabic-Indic digits
        assert_eq!(text_bytes("１２"), (TextRule::Decimal, vec![0x0C]));
        assert_eq!(text_bytes("٣"), (TextRule::Decimal, vec![0x03]));
        assert_eq!(text_bytes(" ४६६० "), (TextRule::Decimal, vec![0x12, 0x34]));
        // Mixed scripts still form one number
        assert_eq!(text_bytes("1２3"), (TextRule::Decimal, vec![0x7B]));
    }

    #[test]
    fn test_non_decimal_numerals_fall_through() {
        assert_eq!(TextRule::Decimal.apply("²"), None);
        assert_eq!(text_bytes("²"), (TextRule::Utf8, "²".as_bytes().to_vec()));
        assert_eq!(text_bytes("Ⅻ").0, TextRule::Utf8);
        assert_eq!(text_bytes("½").0, TextRule::Utf8);
        // Fullwidth digits are not hex digits
        assert_eq!(text_bytes("１a").0, TextRule::Utf8);
    }

    #[test]
    fn test_decimal_digit() {
        assert_eq!(decimal_digit('0'), Some(0));
        assert_eq!(decimal_digit('9'), Some(9));
        assert_eq!(decimal_digit('：'), None); // U+FF1A, just past the fullwidth run
        assert_eq!(decimal_digit('/'), None);
        assert_eq!(decimal_digit('𝟗'), Some(9)); // U+1D7D7
        assert_eq!(decimal_digit('\u{1D7FF}'), Some(9));
        assert_eq!(decimal_digit('\u{1FBF9}'), Some(9));
        assert_eq!(decimal_digit('a'), None);
    }

    #[test]
    fn test_hex_rule() {
        assert_eq!(TextRule::Hex.apply("7B"), Some(vec![0x7B]));
        assert_eq!(TextRule::Hex.apply("0x1 0x23"), Some(vec![0x01, 0x23]));
        assert_eq!(TextRule::Hex.apply("abc"), Some(vec![0x0A, 0xBC]));
        assert_eq!(TextRule::Hex.apply("hello"), None);
    }

    #[test]
    fn test_rule_order() {
        assert_eq!(text_bytes("0x").0, TextRule::Empty);
        assert_eq!(text_bytes("10").0, TextRule::Decimal);
        assert_eq!(text_bytes("10").1, vec![0x0A]);
        assert_eq!(text_bytes("0x10").0, TextRule::Hex);
        assert_eq!(text_bytes("0x10").1, vec![0x10]);
        assert_eq!(text_bytes(" hi ").0, TextRule::Utf8);
        assert_eq!(text_bytes(" hi ").1, b" hi ".to_vec());
    }

    #[test]
    fn test_payload_dispatch() {
        assert_eq!(Payload::from(123u32).to_bytes(), vec![0x7B]);
        assert_eq!(Payload::from("7B").to_bytes(), vec![0x7B]);
        assert_eq!(Payload::from(b"\x00\x01").to_bytes(), vec![0x00, 0x01]);
    }
}
