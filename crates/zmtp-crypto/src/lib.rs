//! CURVE Cryptographic Primitives
//!
//! Curve25519 keypairs and the precomputed Salsa20/Poly1305 box used by
//! the CURVE security mechanism (§4.C8).
//!
//! # Key lifecycle
//!
//! ```text
//! Keypair::generate (static, long-term)
//! Keypair::generate (transient, per-connection)
//!        │
//!        ▼
//! SessionKey::precompute(our_secret, their_public)
//!        │
//!        ▼
//! seal / open, one call per MESSAGE command
//! ```
//!
//! # Security
//!
//! - `SessionKey::precompute` is the Rust-ecosystem equivalent of NaCl's
//!   `crypto_box_beforenm`: the shared secret is derived once and reused,
//!   not rederived per message.
//! - Each direction of a session uses its own [`nonce::NoncePrefix`] so the
//!   two streams can never collide on a nonce.
//! - A failed [`secretbox::SessionKey::open`] always returns
//!   [`error::CryptoError::AuthenticationFailed`] — the caller is
//!   responsible for mapping that to the `CRYPTOGRAPHIC` protocol error and
//!   tearing down the connection (§7).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod keys;
pub mod nonce;
pub mod secretbox;

pub use error::CryptoError;
pub use keys::{Keypair, PublicKey, SecretKey, require_32_bytes};
pub use nonce::{NONCE_LEN, NoncePrefix, PREFIX_LEN};
pub use secretbox::SessionKey;
