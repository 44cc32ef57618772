//! Pipe + HWM flow control (§4.C6).
//!
//! A pipe joins two endpoints with one queue per direction. Each direction
//! is a `Mutex`-guarded queue shared by both endpoints: the producer writes
//! and checks writability against the consumer's last-reported progress;
//! the consumer reads and reports progress back once it crosses the
//! low-water mark. Collapsing the real implementation's lock-free SPSC
//! ring and its `activate_read`/`activate_write` control frames into one
//! shared, mutex-guarded queue preserves the observable credit protocol
//! (§8's HWM invariant and scenarios) without requiring a literal
//! reactor-driven transport, which is out of scope here.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use zmtp_wire::Message;

/// Low-water mark derived from a high-water mark: `(hwm + 1) / 2`,
/// guaranteed non-zero when `hwm >= 1`. `hwm == 0` means unbounded, and the
/// credit protocol is elided entirely in that case.
pub fn compute_lwm(hwm: usize) -> usize {
    if hwm == 0 { 0 } else { (hwm + 1) / 2 }
}

/// Phase of the termination handshake for one direction of a pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermState {
    /// Normal operation.
    Active,
    /// A `pipe_term` delimiter has been received from the peer.
    DelimiterReceived,
    /// We have sent our own `pipe_term` and are waiting for the peer's ack.
    WaitingForTermAck,
    /// Both sides have exchanged `pipe_term`/`pipe_term_ack`; the queue may
    /// be reclaimed.
    Terminated,
}

#[derive(Debug)]
struct Queue {
    msgs: VecDeque<Message>,
    hwm: usize,
    msgs_written: u64,
    msgs_read: u64,
    peers_msgs_read: u64,
    last_sent_msgs_read: u64,
    term: TermState,
}

impl Queue {
    fn new(hwm: usize) -> Self {
        Self {
            msgs: VecDeque::new(),
            hwm,
            msgs_written: 0,
            msgs_read: 0,
            peers_msgs_read: 0,
            last_sent_msgs_read: 0,
            term: TermState::Active,
        }
    }

    fn writable(&self) -> bool {
        self.term == TermState::Active
            && (self.hwm == 0 || self.msgs_written - self.peers_msgs_read < self.hwm as u64)
    }
}

/// One side of a bidirectional pipe.
///
/// Owns the local in-progress multipart staging buffer; the queues
/// themselves are shared with the peer endpoint.
#[derive(Debug)]
pub struct PipeEndpoint {
    outbound: Arc<Mutex<Queue>>,
    inbound: Arc<Mutex<Queue>>,
    /// Frames of a `MORE`-chained message not yet committed to `outbound`.
    pending: Vec<Message>,
    /// Whether this endpoint currently has outbound read interest
    /// registered (mirrors the pattern's interest per §3's data model).
    out_active: bool,
    /// Whether this endpoint currently has inbound read interest
    /// registered.
    in_active: bool,
}

/// Construct a connected pipe pair. `hwm_a_to_b` bounds messages flowing
/// from `a` to `b`; `hwm_b_to_a` bounds the reverse direction. `0` means
/// unbounded.
pub fn pipe_pair(hwm_a_to_b: usize, hwm_b_to_a: usize) -> (PipeEndpoint, PipeEndpoint) {
    let a_to_b = Arc::new(Mutex::new(Queue::new(hwm_a_to_b)));
    let b_to_a = Arc::new(Mutex::new(Queue::new(hwm_b_to_a)));

    let a = PipeEndpoint {
        outbound: a_to_b.clone(),
        inbound: b_to_a.clone(),
        pending: Vec::new(),
        out_active: true,
        in_active: true,
    };
    let b = PipeEndpoint { outbound: b_to_a, inbound: a_to_b, pending: Vec::new(), out_active: true, in_active: true };
    (a, b)
}

impl PipeEndpoint {
    /// True iff a message may be enqueued right now: not HWM-full, not
    /// terminating.
    pub fn check_write(&self) -> bool {
        self.outbound.lock().expect("pipe mutex poisoned").writable()
    }

    /// Enqueue `msg`. Returns `true` if the message (or, for a `MORE`
    /// chain, the whole chain) was committed to the queue; `false` if the
    /// pipe rejected the write (not writable) or the chain is still being
    /// assembled.
    ///
    /// The whole chain counts as a single HWM slot, charged at commit
    /// time — the atomic-multipart rule of §4.C6.
    pub fn write(&mut self, msg: Message) -> bool {
        let has_more = msg.has_more();

        if self.pending.is_empty() && !self.check_write() {
            return false;
        }

        self.pending.push(msg);
        if has_more {
            return false;
        }

        let mut queue = self.outbound.lock().expect("pipe mutex poisoned");
        queue.msgs.extend(self.pending.drain(..));
        queue.msgs_written += 1;
        true
    }

    /// Drop any frames buffered for an in-progress `MORE` chain without
    /// committing them.
    pub fn rollback(&mut self) {
        self.pending.clear();
    }

    /// Publish queued messages to the peer. Returns `true` if this
    /// endpoint's read interest was (re-)activated because the peer had
    /// previously stalled.
    pub fn flush(&mut self) -> bool {
        let was_inactive = !self.out_active;
        self.out_active = true;
        was_inactive
    }

    /// True iff at least one message is available to read.
    pub fn check_read(&self) -> bool {
        !self.inbound.lock().expect("pipe mutex poisoned").msgs.is_empty()
    }

    /// Dequeue the next message, if any, sending a credit refresh to the
    /// peer once the low-water mark is crossed.
    pub fn read(&mut self) -> Option<Message> {
        let mut queue = self.inbound.lock().expect("pipe mutex poisoned");
        let msg = queue.msgs.pop_front()?;
        queue.msgs_read += 1;

        let lwm = compute_lwm(queue.hwm);
        if queue.hwm != 0 && queue.msgs_read - queue.last_sent_msgs_read >= lwm as u64 {
            queue.peers_msgs_read = queue.msgs_read;
            queue.last_sent_msgs_read = queue.msgs_read;
        }

        if queue.msgs.is_empty() {
            self.in_active = false;
        }

        Some(msg)
    }

    /// Half-close this pipe. If `delay`, already-queued outbound messages
    /// remain for the peer to drain; otherwise they are dropped
    /// immediately.
    pub fn terminate(&mut self, delay: bool) {
        self.pending.clear();
        let mut queue = self.outbound.lock().expect("pipe mutex poisoned");
        if !delay {
            queue.msgs.clear();
        }
        queue.term = TermState::WaitingForTermAck;
    }

    /// Record that the peer's `pipe_term` delimiter arrived on the inbound
    /// side.
    pub fn recv_delimiter(&mut self) {
        let mut queue = self.inbound.lock().expect("pipe mutex poisoned");
        if queue.term == TermState::Active {
            queue.term = TermState::DelimiterReceived;
        }
    }

    /// Record that the peer acknowledged our termination request.
    pub fn recv_term_ack(&mut self) {
        let mut queue = self.outbound.lock().expect("pipe mutex poisoned");
        queue.term = TermState::Terminated;
    }

    /// True once both directions have completed the termination
    /// handshake.
    pub fn is_terminated(&self) -> bool {
        self.outbound.lock().expect("pipe mutex poisoned").term == TermState::Terminated
    }

    /// Outstanding credit: `msgs_written - peers_msgs_read` on the
    /// outbound queue. Exposed for the HWM invariant test in §8.
    pub fn outstanding(&self) -> u64 {
        let queue = self.outbound.lock().expect("pipe mutex poisoned");
        queue.msgs_written - queue.peers_msgs_read
    }
}
