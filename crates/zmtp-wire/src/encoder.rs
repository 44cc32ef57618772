//! Encoder state machine (component C4).
//!
//! Mirrors the `encoder_base_t` contract: a message is loaded once, then
//! [`Encoder::encode`] is called repeatedly to drain it into the caller's
//! buffer. Each call emits at most one header/body pair's worth of bytes
//! into `buf`, copying `min(remaining, buf.len())` bytes per call — the
//! exact batching behavior the original's `encode(buf, size)` loop performs
//! (§4.C4 step 3).
//!
//! [`Encoder::encode_zero_copy`] exists for callers that can accept a
//! [`Bytes`] view directly instead of a pre-allocated buffer: it hands back
//! the in-progress step's bytes without copying, which is the zero-copy path
//! the original reserves for "caller passed no buffer and the current step
//! would fill it anyway" (§4.C4 step 2, §9 design note).

use bytes::Bytes;

use crate::{frame::encode_header, message::Message};

#[derive(Debug)]
enum Step {
    Idle,
    Header { bytes: [u8; 9], len: usize, pos: usize, body: Bytes },
    Body { body: Bytes, pos: usize },
}

/// Drains loaded [`Message`]s into framed bytes.
#[derive(Debug)]
pub struct Encoder {
    step: Step,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    /// A fresh encoder with no message loaded.
    pub fn new() -> Self {
        Self { step: Step::Idle }
    }

    /// Whether a message is currently being drained.
    pub fn is_idle(&self) -> bool {
        matches!(self.step, Step::Idle)
    }

    /// Load the next message to encode.
    ///
    /// # Panics
    ///
    /// Panics if a message is already in progress — callers must drain
    /// (`is_idle() == true`) before loading another, exactly as the
    /// original's `load_msg` asserts `in_progress() == NULL`.
    pub fn load_message(&mut self, msg: &Message) {
        assert!(self.is_idle(), "encoder already has a message in progress");
        let header = encode_header(msg.flags(), msg.size());
        let mut bytes = [0u8; 9];
        let len = header.as_bytes().len();
        bytes[..len].copy_from_slice(header.as_bytes());
        self.step = Step::Header { bytes, len, pos: 0, body: msg.bytes() };
    }

    /// Copy up to `buf.len()` bytes of the in-progress message into `buf`,
    /// advancing the state machine. Returns the number of bytes written;
    /// `0` means either nothing is loaded or `buf` was empty.
    pub fn encode(&mut self, buf: &mut [u8]) -> usize {
        let mut pos = 0;
        while pos < buf.len() {
            match &mut self.step {
                Step::Idle => break,
                Step::Header { bytes, len, pos: hpos, body } => {
                    let remaining = *len - *hpos;
                    let to_copy = remaining.min(buf.len() - pos);
                    buf[pos..pos + to_copy].copy_from_slice(&bytes[*hpos..*hpos + to_copy]);
                    pos += to_copy;
                    *hpos += to_copy;
                    if *hpos == *len {
                        let body = body.clone();
                        self.step = Step::Body { body, pos: 0 };
                    }
                },
                Step::Body { body, pos: bpos } => {
                    if *bpos == body.len() {
                        self.step = Step::Idle;
                        break;
                    }
                    let remaining = body.len() - *bpos;
                    let to_copy = remaining.min(buf.len() - pos);
                    buf[pos..pos + to_copy].copy_from_slice(&body[*bpos..*bpos + to_copy]);
                    pos += to_copy;
                    *bpos += to_copy;
                    if *bpos == body.len() {
                        self.step = Step::Idle;
                    }
                },
            }
        }
        pos
    }

    /// Hand back the in-progress step's remaining bytes as a zero-copy
    /// [`Bytes`] view instead of copying into a caller buffer. Returns
    /// `None` once the message is fully drained.
    ///
    /// The returned bytes remain valid independent of subsequent encoder
    /// calls (an owned refcounted view, not a borrow), which is strictly
    /// stronger than the original's "valid until next call" contract.
    pub fn encode_zero_copy(&mut self) -> Option<Bytes> {
        match std::mem::replace(&mut self.step, Step::Idle) {
            Step::Idle => None,
            Step::Header { bytes, len, pos, body } => {
                let header_bytes = Bytes::copy_from_slice(&bytes[pos..len]);
                self.step = Step::Body { body, pos: 0 };
                Some(header_bytes)
            },
            Step::Body { body, pos } => {
                if pos == body.len() {
                    None
                } else {
                    let remaining = body.slice(pos..);
                    Some(remaining)
                }
            },
        }
    }
}
