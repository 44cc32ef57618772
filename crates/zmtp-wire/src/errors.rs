//! Protocol-level errors raised while parsing ZMTP wire bytes.
//!
//! These are all "malformed input" errors, never programmer errors: a peer
//! sending garbage is an expected, recoverable condition for a session, not
//! a bug in this process.

use thiserror::Error;

/// Convenience alias for fallible wire operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// A ZMTP frame, greeting, or command failed to parse.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The buffer was too short to contain a frame header of the declared
    /// shape.
    #[error("frame header too short: need at least {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Minimum byte count required to read the header.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },

    /// The header declared a payload length that the buffer does not fully
    /// contain.
    #[error("frame truncated: header declares {expected} total bytes, buffer has {actual}")]
    FrameTruncated {
        /// Total frame size (header + payload) declared by the header.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },

    /// A declared payload length exceeds the configured maximum frame size.
    #[error("payload too large: {size} bytes exceeds maximum of {max}")]
    PayloadTooLarge {
        /// Declared payload size.
        size: u64,
        /// Configured maximum.
        max: u64,
    },

    /// The greeting's first signature byte was not `0xFF`.
    #[error("invalid greeting signature")]
    InvalidSignature,

    /// The greeting's mechanism field was not valid ASCII / was not
    /// null-padded correctly.
    #[error("invalid mechanism name in greeting")]
    InvalidMechanismName,

    /// The greeting declared a major version this implementation does not
    /// speak.
    #[error("unsupported ZMTP version: {0}")]
    UnsupportedVersion(u8),
}
