//! Frame length codec (component C2, second half).
//!
//! A frame is either short (body ≤ 255 bytes: flags byte, 1-byte length,
//! body) or long (flags byte with [`flags::LONG`] set, 8-byte length, body).
//! Implementations MUST round-trip any valid encoding (§4.C2).

use crate::{
    errors::{ProtocolError, Result},
    primitives::{flags, get_u64, put_u64},
};

/// Largest body size that fits the 1-byte short-frame length.
pub const SHORT_BODY_MAX: usize = 255;

/// A parsed frame header: the flag byte, the declared body length, and how
/// many bytes the header itself occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Raw flag byte (`MORE`/`LONG`/`COMMAND` bits).
    pub flag_bits: u8,
    /// Declared body length in bytes.
    pub body_len: u64,
    /// Total bytes the header occupied on the wire (2 for short, 9 for
    /// long).
    pub header_len: usize,
}

impl FrameHeader {
    /// `true` if [`flags::MORE`] is set.
    pub fn has_more(&self) -> bool {
        self.flag_bits & flags::MORE != 0
    }

    /// `true` if [`flags::COMMAND`] is set.
    pub fn is_command(&self) -> bool {
        self.flag_bits & flags::COMMAND != 0
    }
}

/// An encoded frame header, stored inline (never more than 9 bytes).
#[derive(Debug, Clone, Copy)]
pub struct EncodedHeader {
    buf: [u8; 9],
    len: usize,
}

impl EncodedHeader {
    /// The encoded header bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

/// Encode a frame header for a body of `body_len` bytes carrying
/// `message_flags` (only [`flags::MORE`] and [`flags::COMMAND`] are
/// meaningful here; [`flags::LONG`] is computed from `body_len`).
pub fn encode_header(message_flags: u8, body_len: usize) -> EncodedHeader {
    let is_long = body_len > SHORT_BODY_MAX;
    let wire_flags =
        (message_flags & (flags::MORE | flags::COMMAND)) | if is_long { flags::LONG } else { 0 };

    let mut buf = [0u8; 9];
    buf[0] = wire_flags;
    if is_long {
        put_u64(&mut buf[1..9], body_len as u64);
        EncodedHeader { buf, len: 9 }
    } else {
        buf[1] = body_len as u8;
        EncodedHeader { buf, len: 2 }
    }
}

/// Given at least the flags byte, report how many more bytes the full
/// header needs (1 for short, 8 for long).
pub fn length_field_size(wire_flags: u8) -> usize {
    if wire_flags & flags::LONG != 0 { 8 } else { 1 }
}

/// Parse a frame header from the front of `buf`.
///
/// `buf` must contain at least the flags byte and the length field it
/// implies (2 bytes for short frames, 9 for long); use
/// [`length_field_size`] to know how many bytes to wait for after peeking
/// the first byte.
pub fn decode_header(buf: &[u8]) -> Result<FrameHeader> {
    if buf.is_empty() {
        return Err(ProtocolError::FrameTooShort { expected: 2, actual: 0 });
    }
    let wire_flags = buf[0];
    let needed = 1 + length_field_size(wire_flags);
    if buf.len() < needed {
        return Err(ProtocolError::FrameTooShort { expected: needed, actual: buf.len() });
    }

    let body_len = if wire_flags & flags::LONG != 0 { get_u64(&buf[1..9]) } else { u64::from(buf[1]) };

    Ok(FrameHeader {
        flag_bits: wire_flags & (flags::MORE | flags::COMMAND | flags::LONG),
        body_len,
        header_len: needed,
    })
}

/// Validate a declared body length against a configured maximum, returning
/// [`ProtocolError::PayloadTooLarge`] if it is exceeded.
pub fn check_max_size(body_len: u64, max: u64) -> Result<()> {
    if body_len > max {
        return Err(ProtocolError::PayloadTooLarge { size: body_len, max });
    }
    Ok(())
}
