//! The PLAIN mechanism: username/password carried in the clear. A stub
//! over the same handshake interface as NULL and CURVE — it authenticates
//! but never encrypts.

use zmtp_wire::Message;

use super::{Role, Status, build_command, parse_command};
use crate::error::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    AwaitingSend,
    AwaitingReply,
    Ready,
}

/// PLAIN mechanism state.
#[derive(Debug)]
pub struct PlainMechanism {
    role: Role,
    username: String,
    password: String,
    phase: Phase,
    pending_command: Option<Message>,
}

impl PlainMechanism {
    /// A client that will offer `username`/`password` to the server.
    pub fn new_client(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            role: Role::Client,
            username: username.into(),
            password: password.into(),
            phase: Phase::AwaitingSend,
            pending_command: None,
        }
    }

    /// A server that accepts any credentials presented (credential
    /// verification is a caller policy, out of scope here).
    pub fn new_server() -> Self {
        Self {
            role: Role::Server,
            username: String::new(),
            password: String::new(),
            phase: Phase::AwaitingSend,
            pending_command: None,
        }
    }

    pub(super) fn status(&self) -> Status {
        if self.phase == Phase::Ready { Status::Ready } else { Status::Handshaking }
    }

    pub(super) fn next_handshake_command(&mut self) -> Result<Option<Message>, SessionError> {
        if let Some(cmd) = self.pending_command.take() {
            return Ok(Some(cmd));
        }
        match (self.role, self.phase) {
            (Role::Client, Phase::AwaitingSend) => {
                let mut body = Vec::with_capacity(1 + self.username.len() + self.password.len());
                body.push(self.username.len() as u8);
                body.extend_from_slice(self.username.as_bytes());
                body.extend_from_slice(self.password.as_bytes());
                self.phase = Phase::AwaitingReply;
                Ok(Some(build_command("HELLO", &body)))
            },
            _ => Ok(None),
        }
    }

    pub(super) fn process_handshake_command(&mut self, msg: &Message) -> Result<(), SessionError> {
        let (name, body) = parse_command(msg)?;
        match (self.role, self.phase, name) {
            (Role::Server, Phase::AwaitingSend, "HELLO") => {
                let (&ulen, rest) = body.split_first().ok_or_else(|| {
                    SessionError::MalformedCommandMessage("empty HELLO body".into())
                })?;
                if rest.len() < ulen as usize {
                    return Err(SessionError::MalformedCommandMessage(
                        "HELLO username length exceeds body".into(),
                    ));
                }
                let (username, password) = rest.split_at(ulen as usize);
                self.username = String::from_utf8_lossy(username).into_owned();
                self.password = String::from_utf8_lossy(password).into_owned();
                self.pending_command = Some(build_command("WELCOME", &[]));
                self.phase = Phase::Ready;
                Ok(())
            },
            (Role::Client, Phase::AwaitingReply, "WELCOME") => {
                self.phase = Phase::Ready;
                Ok(())
            },
            _ => Err(SessionError::UnexpectedCommand { state: "plain-handshaking" }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_credentials_reach_the_server() {
        let mut client = PlainMechanism::new_client("alice", "hunter2");
        let mut server = PlainMechanism::new_server();

        let hello = client.next_handshake_command().unwrap().unwrap();
        server.process_handshake_command(&hello).unwrap();

        assert_eq!(server.username, "alice");
        assert_eq!(server.password, "hunter2");
        assert_eq!(server.status(), Status::Ready);

        let welcome = server.next_handshake_command().unwrap().unwrap();
        client.process_handshake_command(&welcome).unwrap();
        assert_eq!(client.status(), Status::Ready);
    }
}
