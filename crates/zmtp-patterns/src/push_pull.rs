//! PUSH/PULL (§4.C9): round-robin load balancing on the send side,
//! round-robin fair queueing on the receive side.

use zmtp_core::PipeEndpoint;
use zmtp_wire::Message;

use crate::error::PatternError;

/// Load-balances outgoing messages round-robin over its attached pipes.
/// A pipe that isn't currently writable is skipped, not queued behind —
/// PUSH never buffers at the pattern layer (§4.C9).
#[derive(Default)]
pub struct PushSocket {
    pipes: Vec<PipeEndpoint>,
    next: usize,
}

impl PushSocket {
    /// A `PushSocket` with no pipes attached yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a newly-connected pipe.
    pub fn attach(&mut self, pipe: PipeEndpoint) {
        self.pipes.push(pipe);
    }

    /// Send `msg` to the next writable pipe, starting from just after
    /// whichever pipe was used last. Returns [`PatternError::WouldBlock`]
    /// if every pipe is currently full.
    pub fn send(&mut self, msg: Message) -> Result<(), PatternError> {
        let n = self.pipes.len();
        if n == 0 {
            return Err(PatternError::WouldBlock);
        }
        for offset in 0..n {
            let idx = (self.next + offset) % n;
            if self.pipes[idx].check_write() {
                self.pipes[idx].write(msg);
                self.next = (idx + 1) % n;
                return Ok(());
            }
        }
        Err(PatternError::WouldBlock)
    }

    /// Number of pipes currently attached.
    pub fn pipe_count(&self) -> usize {
        self.pipes.len()
    }
}

/// Fair-queues across attached pipes using round-robin, so a single noisy
/// sender cannot starve the others.
#[derive(Default)]
pub struct PullSocket {
    pipes: Vec<PipeEndpoint>,
    next: usize,
}

impl PullSocket {
    /// A `PullSocket` with no pipes attached yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a newly-connected pipe.
    pub fn attach(&mut self, pipe: PipeEndpoint) {
        self.pipes.push(pipe);
    }

    /// Receive the next available message, round-robining across pipes
    /// that have something ready. `None` if nothing is available anywhere.
    pub fn recv(&mut self) -> Option<Message> {
        let n = self.pipes.len();
        if n == 0 {
            return None;
        }
        for offset in 0..n {
            let idx = (self.next + offset) % n;
            if let Some(msg) = self.pipes[idx].read() {
                self.next = (idx + 1) % n;
                return Some(msg);
            }
        }
        None
    }

    /// Number of pipes currently attached.
    pub fn pipe_count(&self) -> usize {
        self.pipes.len()
    }
}
