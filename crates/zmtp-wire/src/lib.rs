//! ZMTP wire-level primitives: the greeting codec, the frame length codec,
//! the message object, and the encoder/decoder state machines (components
//! C2–C5).
//!
//! Everything above the wire (handshake mechanisms, pipes, socket patterns)
//! lives in `zmtp-core` and `zmtp-patterns`; this crate only knows how to
//! turn bytes into [`Message`]s and back.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod decoder;
pub mod encoder;
pub mod errors;
pub mod frame;
pub mod greeting;
pub mod message;
pub mod primitives;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use errors::{ProtocolError, Result};
pub use greeting::Greeting;
pub use message::Message;
