//! Session/engine: binds a connection to a socket, drives encode/decode and
//! I/O readiness (§4.C7).
//!
//! Like the original connection state machine, this is a pure action
//! pattern: methods consume transport bytes or pipe contents and return
//! actions for the driver (a reactor, or a test) to execute. No I/O, no
//! `Environment` storage — the engine only needs time for the handshake
//! and idle timeouts the original left to higher layers, so none is
//! threaded through here.
//!
//! # State machine
//!
//! ```text
//! ┌───────────┐  plug()   ┌─────────────┐  mechanism Ready   ┌───────┐
//! │ Unplugged │──────────>│ Handshaking │────────────────────>│ Ready │
//! └───────────┘           └─────────────┘                     └───────┘
//!                                │                                 │
//!                                │ terminate()                     │ terminate()
//!                                ▼                                 ▼
//!                          ┌─────────────┐                   ┌──────┐
//!                          │ Terminating │──────────────────>│ Dead │
//!                          └─────────────┘                   └──────┘
//! ```

use zmtp_wire::{Decoder, Encoder, Greeting, Message, greeting::GREETING_LEN};

use crate::{
    error::SessionError,
    mechanism::{Mechanism, Status},
    pipe::PipeEndpoint,
};

/// Actions the driver must execute on behalf of the session.
#[derive(Debug)]
pub enum SessionAction {
    /// Write these bytes to the transport.
    Transmit(Vec<u8>),
    /// Close the connection with this reason.
    Close {
        /// Why the session is closing.
        reason: String,
    },
}

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No pipes attached yet.
    Unplugged,
    /// Pipes attached; greeting and mechanism handshake in progress.
    Handshaking,
    /// Handshake complete; frames flow through the mechanism both ways.
    Ready,
    /// Termination initiated; draining in-flight state.
    Terminating,
    /// Fully torn down.
    Dead,
}

#[derive(Debug)]
enum GreetingPhase {
    NotStarted,
    AwaitingPeer(Vec<u8>),
    Done,
}

/// A per-connection protocol engine.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    own_greeting: Greeting,
    greeting_phase: GreetingPhase,
    mechanism: Mechanism,
    encoder: Encoder,
    decoder: Decoder,
    outbound: Option<PipeEndpoint>,
    inbound: Option<PipeEndpoint>,
    read_interest: bool,
}

impl Session {
    /// A fresh, unplugged session that will announce `mechanism_name` in
    /// its greeting and use `mechanism` to handshake and transform
    /// messages.
    pub fn new(mechanism_name: &str, as_server: bool, mechanism: Mechanism) -> Self {
        Self {
            state: SessionState::Unplugged,
            own_greeting: Greeting::new(mechanism_name, as_server),
            greeting_phase: GreetingPhase::NotStarted,
            mechanism,
            encoder: Encoder::new(),
            decoder: Decoder::new(),
            outbound: None,
            inbound: None,
            read_interest: true,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the session currently wants to keep consuming transport
    /// bytes — `false` once its inbound pipe is HWM-full, per the
    /// back-pressure rule in §4.C7.
    pub fn wants_read(&self) -> bool {
        self.read_interest
    }

    /// Attach pipe endpoints and begin the handshake, returning the
    /// greeting bytes to transmit.
    ///
    /// # Panics
    ///
    /// Panics if the session is not [`SessionState::Unplugged`].
    pub fn plug(&mut self, outbound: PipeEndpoint, inbound: PipeEndpoint) -> Vec<SessionAction> {
        assert_eq!(self.state, SessionState::Unplugged, "session already plugged");
        self.outbound = Some(outbound);
        self.inbound = Some(inbound);
        self.state = SessionState::Handshaking;
        self.greeting_phase = GreetingPhase::AwaitingPeer(Vec::with_capacity(GREETING_LEN));
        vec![SessionAction::Transmit(self.own_greeting.to_bytes().to_vec())]
    }

    /// Feed transport bytes, advancing the greeting, mechanism handshake,
    /// or message flow as appropriate. Returns actions for the driver to
    /// execute; call repeatedly as more bytes arrive.
    pub fn feed_transport_bytes(
        &mut self,
        input: &mut &[u8],
    ) -> Result<Vec<SessionAction>, SessionError> {
        let mut actions = Vec::new();

        if let GreetingPhase::AwaitingPeer(buf) = &mut self.greeting_phase {
            while buf.len() < GREETING_LEN {
                let Some((&byte, rest)) = input.split_first() else {
                    return Ok(actions);
                };
                buf.push(byte);
                *input = rest;
            }
            let peer_greeting = Greeting::from_bytes(buf)?;
            if peer_greeting.mechanism_name() != self.own_greeting.mechanism_name() {
                return Err(SessionError::UnexpectedCommand { state: "greeting" });
            }
            self.greeting_phase = GreetingPhase::Done;
            actions.extend(self.pump_handshake_commands()?);
        }

        while let Some(msg) = self.decoder.feed(input)? {
            actions.extend(self.handle_frame(msg)?);
        }

        Ok(actions)
    }

    fn handle_frame(&mut self, msg: Message) -> Result<Vec<SessionAction>, SessionError> {
        match self.state {
            SessionState::Handshaking => {
                self.mechanism.process_handshake_command(&msg)?;
                let mut actions = self.pump_handshake_commands()?;
                if self.mechanism.status() == Status::Ready {
                    tracing::info!(
                        mechanism = self.own_greeting.mechanism_name(),
                        "session handshake complete"
                    );
                    self.state = SessionState::Ready;
                }
                Ok(actions)
            },
            SessionState::Ready => {
                let app_msg = self.mechanism.decode(&msg)?;
                if let Some(inbound) = &mut self.inbound {
                    inbound.write(app_msg);
                    self.read_interest = inbound.check_write();
                }
                Ok(Vec::new())
            },
            SessionState::Unplugged | SessionState::Terminating | SessionState::Dead => {
                Err(SessionError::InvalidState { state: "not-accepting-frames", operation: "handle_frame" })
            },
        }
    }

    fn pump_handshake_commands(&mut self) -> Result<Vec<SessionAction>, SessionError> {
        let mut actions = Vec::new();
        while let Some(cmd) = self.mechanism.next_handshake_command()? {
            actions.push(SessionAction::Transmit(self.frame_to_bytes(&cmd)));
        }
        Ok(actions)
    }

    /// Drain whatever is waiting on the outbound pipe, seal/frame it, and
    /// return the bytes to transmit. A no-op outside [`SessionState::Ready`].
    pub fn pump_outbound(&mut self) -> Result<Vec<SessionAction>, SessionError> {
        if self.state != SessionState::Ready {
            return Ok(Vec::new());
        }

        let mut drained = Vec::new();
        if let Some(outbound) = &mut self.outbound {
            while let Some(msg) = outbound.read() {
                drained.push(msg);
            }
        }

        let mut actions = Vec::with_capacity(drained.len());
        for msg in drained {
            let wire_msg = self.mechanism.encode(&msg)?;
            actions.push(SessionAction::Transmit(self.frame_to_bytes(&wire_msg)));
        }
        Ok(actions)
    }

    fn frame_to_bytes(&mut self, msg: &Message) -> Vec<u8> {
        self.encoder.load_message(msg);
        let mut out = Vec::new();
        let mut buf = [0u8; 256];
        loop {
            let n = self.encoder.encode(&mut buf);
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        out
    }

    /// Begin termination. Further frames are rejected; outbound pipe
    /// contents are dropped unless `delay`.
    pub fn terminate(&mut self, delay: bool) {
        tracing::debug!(delay, state = ?self.state, "terminating session");
        if let Some(outbound) = &mut self.outbound {
            outbound.terminate(delay);
        }
        self.state = SessionState::Terminating;
    }

    /// Mark the session fully torn down, once both pipes have completed
    /// their termination handshake.
    pub fn mark_dead(&mut self) {
        self.state = SessionState::Dead;
    }
}
