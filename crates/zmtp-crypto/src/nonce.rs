//! Nonce construction for CURVE sessions (§3, §4.C8).
//!
//! A session's per-direction nonce is a 16-byte static prefix — unique per
//! direction so the encode and decode streams can never reuse a nonce even
//! if both counters happened to coincide — concatenated with an 8-byte
//! big-endian monotonic counter.

/// Length of the random per-direction prefix.
pub const PREFIX_LEN: usize = 16;
/// Length of the full Salsa20 nonce `crypto_box` expects.
pub const NONCE_LEN: usize = 24;

/// A 16-byte prefix distinguishing one direction of a CURVE session from
/// the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoncePrefix([u8; PREFIX_LEN]);

impl NoncePrefix {
    /// Wrap caller-supplied random bytes as a nonce prefix.
    pub fn from_bytes(bytes: [u8; PREFIX_LEN]) -> Self {
        Self(bytes)
    }

    /// The raw prefix bytes.
    pub fn as_bytes(&self) -> &[u8; PREFIX_LEN] {
        &self.0
    }

    /// Build the full 24-byte nonce for counter value `counter`.
    pub fn build_nonce(&self, counter: u64) -> [u8; NONCE_LEN] {
        let mut nonce = [0u8; NONCE_LEN];
        nonce[..PREFIX_LEN].copy_from_slice(&self.0);
        nonce[PREFIX_LEN..].copy_from_slice(&counter.to_be_bytes());
        nonce
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonce_layout_matches_prefix_then_counter() {
        let prefix = NoncePrefix::from_bytes([0xAB; PREFIX_LEN]);
        let nonce = prefix.build_nonce(0x0102_0304_0506_0708);
        assert_eq!(&nonce[..16], &[0xAB; 16]);
        assert_eq!(&nonce[16..], &[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);
    }

    #[test]
    fn different_counters_produce_different_nonces() {
        let prefix = NoncePrefix::from_bytes([0u8; PREFIX_LEN]);
        assert_ne!(prefix.build_nonce(1), prefix.build_nonce(2));
    }
}
