//! Framed serial protocol towards the external controller

/// Frame layout, checksum, encode/decode
pub mod packet;
/// Payload normalisation and text parsing rules
pub mod payload;

pub use packet::{Command, DecodedPacket, FrameFormat, Packet, checksum, decode, encode};
pub use payload::{Payload, TextRule};
