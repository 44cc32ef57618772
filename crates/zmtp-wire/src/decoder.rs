//! Decoder state machine (component C5).
//!
//! Dual of the encoder: bytes are fed in as they arrive from the transport,
//! and a complete [`Message`] is handed back once a full frame has been
//! accumulated. Memory is bounded by `max_frame_size` — the body buffer is
//! only allocated after the declared length has been checked against it, so
//! a malicious peer cannot force an unbounded allocation by declaring a huge
//! length up front (§4.C5).

use crate::{
    errors::Result,
    frame::{decode_header, length_field_size, FrameHeader},
    message::Message,
    primitives::flags,
};

/// Default bound on a single frame's body, matching a conservative
/// transport-level sanity limit (16 MiB).
pub const DEFAULT_MAX_FRAME_SIZE: u64 = 16 * 1024 * 1024;

#[derive(Debug)]
enum State {
    Header,
    Body { header: FrameHeader, buf: Vec<u8> },
}

/// Accumulates wire bytes into [`Message`]s, bounded by a maximum frame
/// size.
#[derive(Debug)]
pub struct Decoder {
    max_frame_size: u64,
    header_buf: Vec<u8>,
    state: State,
}

impl Decoder {
    /// A decoder bounding frame bodies to [`DEFAULT_MAX_FRAME_SIZE`].
    pub fn new() -> Self {
        Self::with_max_frame_size(DEFAULT_MAX_FRAME_SIZE)
    }

    /// A decoder bounding frame bodies to `max_frame_size` bytes.
    pub fn with_max_frame_size(max_frame_size: u64) -> Self {
        Self { max_frame_size, header_buf: Vec::with_capacity(9), state: State::Header }
    }

    /// Feed bytes from `input`, consuming as many as are needed to make
    /// progress and leaving the rest for the next call. Returns a complete
    /// message as soon as one frame finishes; call again with the
    /// (possibly still non-empty) remainder of `input` to decode
    /// back-to-back frames.
    ///
    /// A malformed frame (oversized length, truncated header) is a fatal
    /// protocol error — the caller must tear down the session (§4.C5).
    pub fn feed(&mut self, input: &mut &[u8]) -> Result<Option<Message>> {
        loop {
            match &mut self.state {
                State::Header => {
                    if self.header_buf.is_empty() {
                        let Some((&first, rest)) = input.split_first() else {
                            return Ok(None);
                        };
                        self.header_buf.push(first);
                        *input = rest;
                    }
                    let needed = 1 + length_field_size(self.header_buf[0]);
                    while self.header_buf.len() < needed {
                        let Some((&byte, rest)) = input.split_first() else {
                            return Ok(None);
                        };
                        self.header_buf.push(byte);
                        *input = rest;
                    }

                    let header = decode_header(&self.header_buf)?;
                    crate::frame::check_max_size(header.body_len, self.max_frame_size)?;
                    self.header_buf.clear();
                    self.state =
                        State::Body { header, buf: Vec::with_capacity(header.body_len as usize) };
                },
                State::Body { header, buf } => {
                    let remaining = header.body_len as usize - buf.len();
                    let take = remaining.min(input.len());
                    buf.extend_from_slice(&input[..take]);
                    *input = &input[take..];

                    if buf.len() < header.body_len as usize {
                        return Ok(None);
                    }

                    let flag_bits = header.flag_bits & (flags::MORE | flags::COMMAND);
                    let mut message = Message::from_bytes(std::mem::take(buf));
                    message.set_flag_byte(flag_bits);
                    self.state = State::Header;
                    return Ok(Some(message));
                },
            }
        }
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::encoder::Encoder;

    fn encode_one(msg: &Message) -> Vec<u8> {
        let mut encoder = Encoder::new();
        encoder.load_message(msg);
        let mut out = Vec::new();
        let mut buf = [0u8; 64];
        loop {
            let n = encoder.encode(&mut buf);
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        out
    }

    #[test]
    fn decode_whole_frame_in_one_feed() {
        let msg = Message::from(b"hello".as_slice());
        let wire = encode_one(&msg);

        let mut decoder = Decoder::new();
        let mut input = wire.as_slice();
        let decoded = decoder.feed(&mut input).unwrap().unwrap();
        assert_eq!(decoded, msg);
        assert!(input.is_empty());
    }

    #[test]
    fn decode_byte_at_a_time() {
        let mut msg = Message::from(b"split across many feeds".as_slice());
        msg.set_flags(flags::MORE);
        let wire = encode_one(&msg);

        let mut decoder = Decoder::new();
        let mut result = None;
        for byte in &wire {
            let chunk = [*byte];
            let mut input = chunk.as_slice();
            if let Some(m) = decoder.feed(&mut input).unwrap() {
                result = Some(m);
            }
        }
        assert_eq!(result.unwrap(), msg);
    }

    #[test]
    fn oversized_frame_is_rejected() {
        let mut decoder = Decoder::with_max_frame_size(10);
        let msg = Message::from(vec![0u8; 100]);
        let wire = encode_one(&msg);

        let mut input = wire.as_slice();
        assert!(decoder.feed(&mut input).is_err());
    }

    #[test]
    fn back_to_back_frames_decode_in_order() {
        let first = Message::from(b"one".as_slice());
        let second = Message::from(b"two".as_slice());
        let mut wire = encode_one(&first);
        wire.extend(encode_one(&second));

        let mut decoder = Decoder::new();
        let mut input = wire.as_slice();
        let a = decoder.feed(&mut input).unwrap().unwrap();
        let b = decoder.feed(&mut input).unwrap().unwrap();
        assert_eq!(a, first);
        assert_eq!(b, second);
    }

    proptest! {
        #[test]
        fn decode_encode_round_trip(payload in proptest::collection::vec(any::<u8>(), 0..2000), more in any::<bool>(), command in any::<bool>()) {
            let mut msg = Message::from(payload);
            let mut bits = 0u8;
            if more { bits |= flags::MORE; }
            if command { bits |= flags::COMMAND; }
            msg.set_flags(bits);

            let wire = encode_one(&msg);
            let mut decoder = Decoder::new();
            let mut input = wire.as_slice();
            let decoded = decoder.feed(&mut input).unwrap().unwrap();
            prop_assert_eq!(decoded, msg);
        }
    }
}
