//! The message object (component C3).
//!
//! The original distinguishes inline / allocated / externally-owned / VSM
//! representations so a small message never pays for a heap allocation. A
//! single [`bytes::Bytes`]-backed buffer gets the same property for free:
//! `Bytes` already avoids allocating for the empty case and makes `copy()`
//! (shallow, refcounted) and `move()` (ownership transfer) the same
//! operation the original's representations exist to support — just without
//! a hand-rolled small-buffer optimization to maintain.

use bytes::Bytes;

use crate::primitives::flags;

/// A single ZMTP frame's worth of payload plus its flag byte.
///
/// Once handed to a pipe, a `Message` is owned exclusively by the pipe until
/// dequeued (data model invariant, §3) — this falls out naturally from Rust
/// move semantics rather than needing an explicit ownership flag.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Message {
    data: Bytes,
    flag_bits: u8,
}

impl Message {
    /// An empty message with no flags set.
    pub fn new() -> Self {
        Self { data: Bytes::new(), flag_bits: 0 }
    }

    /// A message wrapping `data`, taking ownership of it.
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self { data: data.into(), flag_bits: 0 }
    }

    /// A zero-filled message of exactly `n` bytes, for callers that fill in
    /// place before handing ownership onward.
    pub fn with_size(n: usize) -> Self {
        Self { data: vec![0u8; n].into(), flag_bits: 0 }
    }

    /// Number of payload bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The payload bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The payload as a cheaply-cloneable [`Bytes`] handle.
    pub fn bytes(&self) -> Bytes {
        self.data.clone()
    }

    /// Current flag byte.
    pub fn flags(&self) -> u8 {
        self.flag_bits
    }

    /// `true` if [`flags::MORE`] is set — another frame follows in this
    /// logical message.
    pub fn has_more(&self) -> bool {
        self.flag_bits & flags::MORE != 0
    }

    /// `true` if [`flags::COMMAND`] is set — this frame is a control frame.
    pub fn is_command(&self) -> bool {
        self.flag_bits & flags::COMMAND != 0
    }

    /// Set every bit in `mask`.
    pub fn set_flags(&mut self, mask: u8) {
        self.flag_bits |= mask;
    }

    /// Clear every bit in `mask`.
    pub fn reset_flags(&mut self, mask: u8) {
        self.flag_bits &= !mask;
    }

    /// Overwrite the flag byte outright.
    pub fn set_flag_byte(&mut self, bits: u8) {
        self.flag_bits = bits;
    }

    /// Reduce the payload to its first `n` bytes without reallocating.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the current size — shrinking past the end is a
    /// programmer error, not a wire condition.
    pub fn shrink(&mut self, n: usize) {
        assert!(n <= self.data.len(), "shrink target exceeds message size");
        self.data = self.data.slice(0..n);
    }

    /// Shallow copy: bumps the underlying buffer's refcount instead of
    /// copying bytes (mirrors the original's `copy()`).
    pub fn shallow_copy(&self) -> Self {
        self.clone()
    }
}

impl From<&[u8]> for Message {
    fn from(data: &[u8]) -> Self {
        Self::from_bytes(Bytes::copy_from_slice(data))
    }
}

impl From<Vec<u8>> for Message {
    fn from(data: Vec<u8>) -> Self {
        Self::from_bytes(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_message_has_no_flags() {
        let msg = Message::new();
        assert_eq!(msg.size(), 0);
        assert!(!msg.has_more());
        assert!(!msg.is_command());
    }

    #[test]
    fn shallow_copy_shares_storage() {
        let msg = Message::from(b"hello".as_slice());
        let copy = msg.shallow_copy();
        assert_eq!(msg.data(), copy.data());
        assert_eq!(msg.data().as_ptr(), copy.data().as_ptr());
    }

    #[test]
    fn flags_round_trip() {
        let mut msg = Message::from(b"x".as_slice());
        msg.set_flags(flags::MORE | flags::COMMAND);
        assert!(msg.has_more());
        assert!(msg.is_command());
        msg.reset_flags(flags::MORE);
        assert!(!msg.has_more());
        assert!(msg.is_command());
    }

    #[test]
    fn shrink_truncates_without_reallocating() {
        let mut msg = Message::from(b"hello world".as_slice());
        let original_ptr = msg.data().as_ptr();
        msg.shrink(5);
        assert_eq!(msg.data(), b"hello");
        assert_eq!(msg.data().as_ptr(), original_ptr);
    }

    #[test]
    #[should_panic(expected = "shrink target exceeds message size")]
    fn shrink_past_end_panics() {
        let mut msg = Message::from(b"hi".as_slice());
        msg.shrink(10);
    }
}
