//! Socket-pattern and registry error types.

/// Errors surfaced by the inproc registry and the socket patterns.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    /// `connect()` or `bind()` named an endpoint that is not `inproc://`.
    #[error("unsupported endpoint scheme: {0}")]
    UnsupportedEndpoint(String),

    /// A send was attempted but no pipe could accept it right now
    /// (`EAGAIN` in the C API).
    #[error("no pipe ready to accept the message")]
    WouldBlock,
}
