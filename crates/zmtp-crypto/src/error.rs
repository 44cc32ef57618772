//! Error type for the CURVE box primitives.

use thiserror::Error;

/// Failure modes for keypair and box operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// A public or secret key was not 32 bytes.
    #[error("invalid key length: expected 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    /// `open` failed authentication — either the wrong key, the wrong
    /// nonce, or a tampered ciphertext. Corresponds to the `CRYPTOGRAPHIC`
    /// protocol error code (§7).
    #[error("box authentication failed")]
    AuthenticationFailed,
}
