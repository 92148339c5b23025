//! Serial frame layout.
//!
//! ```text
//! current: A5 | cmd | len | payload ... | chk
//! legacy:  A5 | cmd | payload ...  | 00 | chk
//! ```
//!
//! `chk` is the low byte of the sum of every byte before it.

use super::payload::Payload;
use crate::error::PacketError;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// First byte of every frame
pub const HEADER: u8 = 0xA5;

/// Command byte telling the receiver what kind of marker was read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Command(pub u8);

impl Command {
    /// QR code or generic rectangle marker
    pub const MARKER: Command = Command(0x00);
    /// Linear barcode
    pub const BARCODE: Command = Command(0x01);
}

impl From<u8> for Command {
    fn from(v: u8) -> Self {
        Command(v)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

/// Wire layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameFormat {
    /// Length-prefixed payload
    #[default]
    Current,
    /// Zero-terminated payload, for older receiver firmware
    Legacy,
}

/// An encoded frame, ready for the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    bytes: Vec<u8>,
}

impl Packet {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Upper-case hex, space separated
impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.bytes.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}

/// Command and payload recovered from a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPacket {
    pub command: Command,
    pub payload: Vec<u8>,
}

/// Low byte of the byte sum
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}

/// Build a frame. Never fails; text that does not parse as a number is sent
/// as UTF-8.
///
/// Current-format payloads longer than 255 bytes keep only the low byte of
/// their length.
pub fn encode(payload: impl Into<Payload>, command: Command, format: FrameFormat) -> Packet {
    let body = payload.into().to_bytes();
    let mut bytes = Vec::with_capacity(body.len() + 4);
    bytes.push(HEADER);
    bytes.push(command.0);
    match format {
        FrameFormat::Current => {
            if body.len() > u8::MAX as usize {
                warn!(
                    "payload of {} bytes overflows the length byte, sending 0x{:02X}",
                    body.len(),
                    body.len() & 0xFF
                );
            }
            bytes.push((body.len() & 0xFF) as u8);
            bytes.extend_from_slice(&body);
        }
        FrameFormat::Legacy => {
            bytes.extend_from_slice(&body);
            bytes.push(0x00);
        }
    }
    bytes.push(checksum(&bytes));
    Packet { bytes }
}

/// Parse a frame, checking header, checksum and length (or trailer)
pub fn decode(frame: &[u8], format: FrameFormat) -> Result<DecodedPacket, PacketError> {
    if frame.len() < 4 {
        return Err(PacketError::TooShort(frame.len()));
    }
    if frame[0] != HEADER {
        return Err(PacketError::BadHeader(frame[0]));
    }
    let (body, chk) = frame.split_at(frame.len() - 1);
    let computed = checksum(body);
    if computed != chk[0] {
        return Err(PacketError::Checksum {
            found: chk[0],
            computed,
        });
    }

    let command = Command(body[1]);
    let payload = match format {
        FrameFormat::Current => {
            let declared = body[2] as usize;
            let payload = &body[3..];
            if payload.len() & 0xFF != declared {
                return Err(PacketError::LengthMismatch {
                    declared,
                    actual: payload.len(),
                });
            }
            payload
        }
        FrameFormat::Legacy => {
            let trailer = body[body.len() - 1];
            if trailer != 0x00 {
                return Err(PacketError::BadTrailer(trailer));
            }
            &body[2..body.len() - 1]
        }
    };
    Ok(DecodedPacket {
        command,
        payload: payload.to_vec(),
    })
}
