//! The CURVE mechanism: Curve25519 + Salsa20/Poly1305 authenticated
//! encryption (§4.C8).
//!
//! The handshake here exchanges only the two sides' transient public keys
//! — `HELLO` carries the client's, `WELCOME` carries the server's — which
//! is exactly what the specification's session-key formula needs:
//! `K = crypto_box_beforenm(client_transient_sk, server_transient_pk)`.
//! Full CurveZMQ also vouches the client's long-term static key inside a
//! nested box during the handshake; the specification only pins down the
//! MESSAGE wire layout and the nonce-replay invariant, so that vouching
//! step is left to callers layering their own authentication on top.

use zmtp_crypto::{Keypair, NoncePrefix, PublicKey, SessionKey, require_32_bytes};
use zmtp_wire::{Message, primitives::flags};

use super::{Role, Status, build_command, parse_command};
use crate::error::SessionError;

const MESSAGE_TAG: &[u8; 8] = b"\x07MESSAGE";
const MIN_MESSAGE_FRAME: usize = 8 + 8 + 16 + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Handshaking,
    Ready,
}

/// CURVE mechanism state for one session.
#[derive(Debug)]
pub struct CurveMechanism {
    role: Role,
    own_transient: Keypair,
    hello_sent: bool,
    pending_command: Option<Message>,
    session_key: Option<SessionKey>,
    encode_prefix: NoncePrefix,
    decode_prefix: NoncePrefix,
    send_counter: u64,
    last_peer_counter: u64,
    phase: Phase,
}

impl CurveMechanism {
    /// A client-side CURVE mechanism. `encode_prefix`/`decode_prefix` must
    /// be distinct (typically drawn from [`crate::env::Environment::random_bytes`])
    /// so the two directions of the session can never share a nonce.
    pub fn new_client(
        own_transient: Keypair,
        encode_prefix: NoncePrefix,
        decode_prefix: NoncePrefix,
    ) -> Self {
        Self::new(Role::Client, own_transient, encode_prefix, decode_prefix)
    }

    /// A server-side CURVE mechanism.
    pub fn new_server(
        own_transient: Keypair,
        encode_prefix: NoncePrefix,
        decode_prefix: NoncePrefix,
    ) -> Self {
        Self::new(Role::Server, own_transient, encode_prefix, decode_prefix)
    }

    fn new(
        role: Role,
        own_transient: Keypair,
        encode_prefix: NoncePrefix,
        decode_prefix: NoncePrefix,
    ) -> Self {
        Self {
            role,
            own_transient,
            hello_sent: false,
            pending_command: None,
            session_key: None,
            encode_prefix,
            decode_prefix,
            send_counter: 0,
            last_peer_counter: 0,
            phase: Phase::Handshaking,
        }
    }

    pub(super) fn status(&self) -> Status {
        if self.phase == Phase::Ready { Status::Ready } else { Status::Handshaking }
    }

    pub(super) fn next_handshake_command(&mut self) -> Result<Option<Message>, SessionError> {
        if let Some(cmd) = self.pending_command.take() {
            return Ok(Some(cmd));
        }
        if self.role == Role::Client && !self.hello_sent {
            self.hello_sent = true;
            let body = self.own_transient.public.to_bytes();
            return Ok(Some(build_command("HELLO", &body)));
        }
        Ok(None)
    }

    pub(super) fn process_handshake_command(&mut self, msg: &Message) -> Result<(), SessionError> {
        let (name, body) = parse_command(msg)?;
        match (self.role, name) {
            (Role::Server, "HELLO") => {
                let peer_public = self.parse_transient_key(body)?;
                self.session_key = Some(SessionKey::precompute(&self.own_transient.secret, &peer_public));
                let welcome_body = self.own_transient.public.to_bytes();
                self.pending_command = Some(build_command("WELCOME", &welcome_body));
                self.phase = Phase::Ready;
                Ok(())
            },
            (Role::Client, "WELCOME") => {
                let peer_public = self.parse_transient_key(body)?;
                self.session_key = Some(SessionKey::precompute(&self.own_transient.secret, &peer_public));
                self.phase = Phase::Ready;
                Ok(())
            },
            _ => Err(SessionError::UnexpectedCommand { state: "curve-handshaking" }),
        }
    }

    fn parse_transient_key(&self, body: &[u8]) -> Result<PublicKey, SessionError> {
        let bytes = require_32_bytes(body)?;
        Ok(PublicKey::from_bytes(bytes))
    }

    /// Seal `msg` into a CURVE `MESSAGE` command (§4.C8 encode steps).
    pub(super) fn encode(&mut self, msg: &Message) -> Result<Message, SessionError> {
        let session_key = self
            .session_key
            .as_ref()
            .ok_or(SessionError::InvalidState { state: "curve-handshaking", operation: "encode" })?;

        self.send_counter += 1;
        let nonce = self.encode_prefix.build_nonce(self.send_counter);

        let mut plaintext = Vec::with_capacity(1 + msg.size());
        plaintext.push(msg.flags() & (flags::MORE | flags::COMMAND));
        plaintext.extend_from_slice(msg.data());

        let ciphertext = session_key.seal(&nonce, &plaintext);

        let mut wire = Vec::with_capacity(8 + 8 + ciphertext.len());
        wire.extend_from_slice(MESSAGE_TAG);
        wire.extend_from_slice(&self.send_counter.to_be_bytes());
        wire.extend_from_slice(&ciphertext);

        let mut out = Message::from_bytes(wire);
        out.set_flags(flags::COMMAND);
        Ok(out)
    }

    /// Open a CURVE `MESSAGE` command back into the application message it
    /// carries (§4.C8 decode steps).
    pub(super) fn decode(&mut self, msg: &Message) -> Result<Message, SessionError> {
        let session_key = self
            .session_key
            .as_ref()
            .ok_or(SessionError::InvalidState { state: "curve-handshaking", operation: "decode" })?;

        let data = msg.data();
        if data.len() < MIN_MESSAGE_FRAME {
            return Err(SessionError::MalformedCommandMessage(
                "MESSAGE frame shorter than the minimum CURVE envelope".into(),
            ));
        }
        if &data[0..8] != MESSAGE_TAG {
            return Err(SessionError::UnexpectedCommand { state: "curve-ready" });
        }

        let counter = u64::from_be_bytes(data[8..16].try_into().expect("slice is exactly 8 bytes"));
        if counter <= self.last_peer_counter {
            tracing::warn!(counter, last_peer_counter = self.last_peer_counter, "rejecting replayed CURVE nonce");
            return Err(SessionError::InvalidSequence);
        }

        let nonce = self.decode_prefix.build_nonce(counter);
        let ciphertext = &data[16..];
        let plaintext = session_key.open(&nonce, ciphertext).inspect_err(|_| {
            tracing::warn!(counter, "CURVE MESSAGE failed authentication");
        })?;

        self.last_peer_counter = counter;

        let (&flag_byte, payload) = plaintext
            .split_first()
            .expect("MIN_MESSAGE_FRAME guarantees at least one plaintext byte");

        let mut out = Message::from_bytes(payload.to_vec());
        out.set_flag_byte(flag_byte & (flags::MORE | flags::COMMAND));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handshaken_pair() -> (CurveMechanism, CurveMechanism) {
        // The two sides' directions must line up: what the client encodes
        // with, the server must decode with, and vice versa.
        let client_to_server = NoncePrefix::from_bytes([1; 16]);
        let server_to_client = NoncePrefix::from_bytes([2; 16]);

        let mut client = CurveMechanism::new_client(
            Keypair::generate(),
            client_to_server,
            server_to_client,
        );
        let mut server = CurveMechanism::new_server(
            Keypair::generate(),
            server_to_client,
            client_to_server,
        );

        let hello = client.next_handshake_command().unwrap().unwrap();
        server.process_handshake_command(&hello).unwrap();
        let welcome = server.next_handshake_command().unwrap().unwrap();
        client.process_handshake_command(&welcome).unwrap();

        assert_eq!(client.status(), Status::Ready);
        assert_eq!(server.status(), Status::Ready);
        (client, server)
    }

    #[test]
    fn message_round_trips_with_flags_preserved() {
        let (mut client, mut server) = handshaken_pair();

        let mut app_msg = Message::from_bytes(b"hello curve".to_vec());
        app_msg.set_flags(flags::MORE);

        let wire = client.encode(&app_msg).unwrap();
        assert!(wire.is_command());
        assert_eq!(&wire.data()[0..8], MESSAGE_TAG);

        let decoded = server.decode(&wire).unwrap();
        assert_eq!(decoded.data(), b"hello curve");
        assert!(decoded.has_more());
    }

    #[test]
    fn replayed_message_is_rejected() {
        let (mut client, mut server) = handshaken_pair();
        let wire = client.encode(&Message::from_bytes(b"once".to_vec())).unwrap();

        server.decode(&wire).unwrap();
        let result = server.decode(&wire);
        assert_eq!(result, Err(SessionError::InvalidSequence));
    }

    #[test]
    fn tampered_mac_is_rejected() {
        let (mut client, mut server) = handshaken_pair();
        let wire = client.encode(&Message::from_bytes(b"tamper me".to_vec())).unwrap();

        let mut bytes = wire.data().to_vec();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        let tampered = Message::from_bytes(bytes);

        let result = server.decode(&tampered);
        assert!(matches!(result, Err(SessionError::Cryptographic(_))));
    }

    #[test]
    fn strictly_increasing_counters_are_accepted_in_order() {
        let (mut client, mut server) = handshaken_pair();
        for i in 0..5u8 {
            let wire = client.encode(&Message::from_bytes(vec![i])).unwrap();
            let decoded = server.decode(&wire).unwrap();
            assert_eq!(decoded.data(), &[i]);
        }
    }
}
