//! Mechanism base: NULL/PLAIN/CURVE handshake and per-mechanism command
//! framing (§4.C8).
//!
//! Modeled as a tagged variant rather than virtual dispatch, per the
//! specification's design note: this keeps the session struct size bounded
//! and makes the state machines exhaustive to match on.

mod curve;
mod null;
mod plain;

pub use curve::CurveMechanism;
pub use null::NullMechanism;
pub use plain::PlainMechanism;

use zmtp_wire::{Message, primitives::flags};

use crate::error::SessionError;

/// Handshake/ready status common to every mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Still exchanging handshake commands.
    Handshaking,
    /// Handshake complete; `encode`/`decode` may be used.
    Ready,
}

/// Which side of the handshake this mechanism instance plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The connecting peer.
    Client,
    /// The accepting peer.
    Server,
}

/// The three mechanisms a session may negotiate.
#[derive(Debug)]
pub enum Mechanism {
    /// No authentication or encryption.
    Null(NullMechanism),
    /// Username/password, unencrypted.
    Plain(PlainMechanism),
    /// Curve25519 + Salsa20/Poly1305 authenticated encryption.
    Curve(Box<CurveMechanism>),
}

impl Mechanism {
    /// Current handshake status.
    pub fn status(&self) -> Status {
        match self {
            Self::Null(m) => m.status(),
            Self::Plain(m) => m.status(),
            Self::Curve(m) => m.status(),
        }
    }

    /// The next handshake command to send, if any, advancing local state.
    pub fn next_handshake_command(&mut self) -> Result<Option<Message>, SessionError> {
        match self {
            Self::Null(m) => m.next_handshake_command(),
            Self::Plain(m) => m.next_handshake_command(),
            Self::Curve(m) => m.next_handshake_command(),
        }
    }

    /// Process a handshake command received from the peer.
    pub fn process_handshake_command(&mut self, msg: &Message) -> Result<(), SessionError> {
        match self {
            Self::Null(m) => m.process_handshake_command(msg),
            Self::Plain(m) => m.process_handshake_command(msg),
            Self::Curve(m) => m.process_handshake_command(msg),
        }
    }

    /// Transform an outgoing application message for the wire (identity
    /// for NULL/PLAIN, seal for CURVE).
    pub fn encode(&mut self, msg: &Message) -> Result<Message, SessionError> {
        match self {
            Self::Null(_) | Self::Plain(_) => Ok(msg.clone()),
            Self::Curve(m) => m.encode(msg),
        }
    }

    /// Transform an incoming wire message back into an application message
    /// (identity for NULL/PLAIN, open for CURVE).
    pub fn decode(&mut self, msg: &Message) -> Result<Message, SessionError> {
        match self {
            Self::Null(_) | Self::Plain(_) => Ok(msg.clone()),
            Self::Curve(m) => m.decode(msg),
        }
    }
}

/// Build a ZMTP command frame: a one-byte name length, the ASCII name, then
/// the body, with the `COMMAND` flag set.
fn build_command(name: &str, body: &[u8]) -> Message {
    debug_assert!(name.len() <= u8::MAX as usize);
    let mut buf = Vec::with_capacity(1 + name.len() + body.len());
    buf.push(name.len() as u8);
    buf.extend_from_slice(name.as_bytes());
    buf.extend_from_slice(body);
    let mut msg = Message::from_bytes(buf);
    msg.set_flags(flags::COMMAND);
    msg
}

/// Split a command frame into its name and body.
fn parse_command(msg: &Message) -> Result<(&str, &[u8]), SessionError> {
    let data = msg.data();
    let (&len, rest) = data
        .split_first()
        .ok_or_else(|| SessionError::MalformedCommandMessage("empty command frame".into()))?;
    let len = len as usize;
    if rest.len() < len {
        return Err(SessionError::MalformedCommandMessage(format!(
            "command name length {len} exceeds frame body"
        )));
    }
    let (name_bytes, body) = rest.split_at(len);
    let name = std::str::from_utf8(name_bytes)
        .map_err(|_| SessionError::MalformedCommandMessage("command name is not UTF-8".into()))?;
    Ok((name, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_round_trips() {
        let msg = build_command("READY", b"body");
        assert!(msg.is_command());
        let (name, body) = parse_command(&msg).unwrap();
        assert_eq!(name, "READY");
        assert_eq!(body, b"body");
    }

    #[test]
    fn truncated_command_is_malformed() {
        let msg = Message::from_bytes(vec![10, 1, 2]);
        assert!(parse_command(&msg).is_err());
    }
}
