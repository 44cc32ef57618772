//! Curve25519 keypairs for CURVE static and transient key material.

use crypto_box::{
    aead::OsRng,
    PublicKey as RawPublicKey, SecretKey as RawSecretKey,
};

use crate::error::CryptoError;

/// A Curve25519 public key (either a pre-shared static key or a
/// per-connection transient key).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(pub(crate) RawPublicKey);

impl PublicKey {
    /// Load a public key from its 32 raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(RawPublicKey::from(bytes))
    }

    /// The raw 32 bytes.
    pub fn to_bytes(self) -> [u8; 32] {
        *self.0.as_bytes()
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PublicKey").field(&hex_prefix(self.0.as_bytes())).finish()
    }
}

/// A Curve25519 secret key. The underlying `x25519-dalek` static secret
/// zeroizes its bytes on drop.
pub struct SecretKey(RawSecretKey);

impl SecretKey {
    /// Generate a fresh secret key using the OS CSPRNG.
    pub fn generate() -> Self {
        Self(RawSecretKey::generate(&mut OsRng))
    }

    /// Load a secret key from its 32 raw bytes (e.g. a pre-shared static
    /// key loaded from configuration).
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(RawSecretKey::from(bytes))
    }

    /// The corresponding public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.public_key())
    }
}

/// A public/secret keypair.
pub struct Keypair {
    /// The secret half.
    pub secret: SecretKey,
    /// The public half.
    pub public: PublicKey,
}

impl Keypair {
    /// Generate a fresh keypair.
    pub fn generate() -> Self {
        let secret = SecretKey::generate();
        let public = secret.public_key();
        Self { secret, public }
    }
}

fn hex_prefix(bytes: &[u8; 32]) -> String {
    bytes[..4].iter().map(|b| format!("{b:02x}")).collect()
}

/// Validate a byte slice is exactly 32 bytes, for callers loading keys from
/// configuration rather than generating them.
pub fn require_32_bytes(bytes: &[u8]) -> Result<[u8; 32], CryptoError> {
    bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength(bytes.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keypair_round_trips_through_bytes() {
        let keypair = Keypair::generate();
        let bytes = keypair.public.to_bytes();
        let reloaded = PublicKey::from_bytes(bytes);
        assert_eq!(keypair.public, reloaded);
    }

    #[test]
    fn reject_wrong_length() {
        assert_eq!(require_32_bytes(&[0u8; 10]), Err(CryptoError::InvalidKeyLength(10)));
    }
}
