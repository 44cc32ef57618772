//! The NULL mechanism: no authentication, no encryption. A single `READY`
//! command exchanged in each direction is enough to reach `Ready`.

use zmtp_wire::Message;

use super::{Status, build_command, parse_command};
use crate::error::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    AwaitingSend,
    AwaitingPeerReady,
    Ready,
}

/// NULL mechanism state.
#[derive(Debug)]
pub struct NullMechanism {
    phase: Phase,
}

impl NullMechanism {
    /// A fresh NULL mechanism, handshake not yet started.
    pub fn new() -> Self {
        Self { phase: Phase::AwaitingSend }
    }

    pub(super) fn status(&self) -> Status {
        if self.phase == Phase::Ready { Status::Ready } else { Status::Handshaking }
    }

    pub(super) fn next_handshake_command(&mut self) -> Result<Option<Message>, SessionError> {
        if self.phase != Phase::AwaitingSend {
            return Ok(None);
        }
        self.phase = Phase::AwaitingPeerReady;
        Ok(Some(build_command("READY", &[])))
    }

    pub(super) fn process_handshake_command(&mut self, msg: &Message) -> Result<(), SessionError> {
        let (name, _body) = parse_command(msg)?;
        if name != "READY" {
            return Err(SessionError::UnexpectedCommand { state: "null-handshaking" });
        }
        self.phase = Phase::Ready;
        Ok(())
    }
}

impl Default for NullMechanism {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_sides_reach_ready_after_exchanging_ready_commands() {
        let mut client = NullMechanism::new();
        let mut server = NullMechanism::new();

        let client_ready = client.next_handshake_command().unwrap().unwrap();
        let server_ready = server.next_handshake_command().unwrap().unwrap();

        server.process_handshake_command(&client_ready).unwrap();
        client.process_handshake_command(&server_ready).unwrap();

        assert_eq!(client.status(), Status::Ready);
        assert_eq!(server.status(), Status::Ready);
    }

    #[test]
    fn unexpected_command_name_is_rejected() {
        let mut m = NullMechanism::new();
        let bogus = build_command("HELLO", &[]);
        assert!(m.process_handshake_command(&bogus).is_err());
    }
}
