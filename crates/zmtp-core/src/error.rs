//! Error types for the session/engine layer.
//!
//! Three kinds of failure, per the protocol's error handling design:
//! programmer errors (invalid API sequence) assert and abort rather than
//! return a `Result`; protocol errors close the connection and carry one of
//! the codes below; transient/OS errors are the caller's concern (out of
//! scope — no transport I/O happens in this crate).

use thiserror::Error;

use zmtp_crypto::CryptoError;
use zmtp_wire::ProtocolError;

/// Errors a session/mechanism can surface, mapped onto the codes a monitor
/// would report (§6, §7).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A command arrived that the current state does not expect.
    #[error("unexpected command in state {state}")]
    UnexpectedCommand {
        /// Human-readable current state, for diagnostics.
        state: &'static str,
    },

    /// A command frame's structure did not parse.
    #[error("malformed command message: {0}")]
    MalformedCommandMessage(String),

    /// A CURVE nonce counter was not strictly greater than the last
    /// accepted counter from this peer.
    #[error("invalid sequence: nonce counter did not increase")]
    InvalidSequence,

    /// A CURVE MAC failed to authenticate, or a key was malformed.
    #[error("cryptographic error: {0}")]
    Cryptographic(#[from] CryptoError),

    /// The peer announced a greeting version this implementation does not
    /// understand.
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u8),

    /// An operation was attempted that is invalid for the engine's current
    /// lifecycle state.
    #[error("invalid state transition: cannot {operation} from {state}")]
    InvalidState {
        /// Current state when the error occurred.
        state: &'static str,
        /// Operation that was attempted.
        operation: &'static str,
    },

    /// A frame failed to decode at the wire layer.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl SessionError {
    /// Returns true if this error is transient and may succeed on retry.
    ///
    /// None of the error kinds modeled here are transient: every one
    /// represents a protocol violation or malformed input, and per §7 the
    /// session must close rather than retry. Transient/OS errors
    /// (`EAGAIN`, `EINTR`, connection reset) live at the reactor boundary,
    /// which is out of scope for this crate.
    pub fn is_transient(&self) -> bool {
        false
    }
}
