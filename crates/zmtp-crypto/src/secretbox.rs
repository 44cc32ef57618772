//! The precomputed CURVE session box (§4.C8).
//!
//! `SessionKey` wraps a `crypto_box::SalsaBox`, which precomputes the
//! shared secret from a public/secret keypair once (the Rust-ecosystem
//! equivalent of NaCl's `crypto_box_beforenm`) and reuses it for every
//! subsequent `seal`/`open` call — the 32-byte `K` the specification
//! describes.

use crypto_box::{
    aead::{Aead, Nonce as AeadNonce},
    SalsaBox,
};

use crate::{
    error::CryptoError,
    keys::{PublicKey, SecretKey},
    nonce::NONCE_LEN,
};

/// A precomputed CURVE session key, ready to seal/open messages for one
/// direction of a session.
pub struct SessionKey(SalsaBox);

impl SessionKey {
    /// Precompute the session key from our secret key and the peer's
    /// public key.
    pub fn precompute(our_secret: &SecretKey, their_public: &PublicKey) -> Self {
        Self(SalsaBox::new(&their_public.0, &our_secret.0))
    }

    /// Authenticated-encrypt `plaintext` under `nonce`. The returned bytes
    /// are ciphertext with a 16-byte Poly1305 tag appended.
    pub fn seal(&self, nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Vec<u8> {
        let nonce = AeadNonce::<SalsaBox>::from_slice(nonce);
        self.0.encrypt(nonce, plaintext).expect("SalsaBox encryption cannot fail for valid inputs")
    }

    /// Authenticated-decrypt `ciphertext` (including its trailing MAC)
    /// under `nonce`. Fails with [`CryptoError::AuthenticationFailed`] on
    /// any tamper or key/nonce mismatch — the `CRYPTOGRAPHIC` protocol
    /// error of §7.
    pub fn open(&self, nonce: &[u8; NONCE_LEN], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let nonce = AeadNonce::<SalsaBox>::from_slice(nonce);
        self.0.decrypt(nonce, ciphertext).map_err(|_| CryptoError::AuthenticationFailed)
    }
}
