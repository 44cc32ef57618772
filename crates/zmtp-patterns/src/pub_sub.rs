//! PUB/SUB (§4.C9): broadcast with per-subscriber prefix filtering.
//!
//! The specification describes the filter as a prefix trie; a subscriber
//! here typically holds one or a handful of prefixes, so a linear scan
//! over that subscriber's own prefix list is the same asymptotic cost as
//! a trie walk in practice and needs no separate data structure.

use zmtp_core::{Array, ArrayItem, PipeEndpoint};
use zmtp_wire::Message;

use crate::error::PatternError;

struct Subscriber {
    pipe: PipeEndpoint,
    prefixes: Vec<Vec<u8>>,
    array_index: Option<usize>,
}

impl Subscriber {
    fn matches(&self, topic: &[u8]) -> bool {
        self.prefixes.iter().any(|p| topic.starts_with(p.as_slice()))
    }
}

impl ArrayItem for Subscriber {
    fn array_index(&self) -> Option<usize> {
        self.array_index
    }

    fn set_array_index(&mut self, index: Option<usize>) {
        self.array_index = index;
    }
}

/// Whether a PUB socket drops messages for an HWM-full subscriber pipe
/// (`DropWhenFull`, the ZMQ default) or blocks the whole broadcast on any
/// full subscriber (`Blocking`, `XPUB_NODROP` set).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoDropPolicy {
    /// Silently skip subscribers whose pipe is HWM-full.
    DropWhenFull,
    /// Refuse the whole publish if any matching subscriber is HWM-full.
    Blocking,
}

/// Broadcasts frames to every subscriber whose prefix set matches the
/// frame's topic bytes.
pub struct PubSocket {
    subscribers: Array<Subscriber>,
    nodrop: NoDropPolicy,
}

impl PubSocket {
    /// A `PubSocket` with no subscribers yet.
    pub fn new(nodrop: NoDropPolicy) -> Self {
        Self { subscribers: Array::new(), nodrop }
    }

    /// Attach a newly-connected subscriber pipe. It starts subscribed to
    /// nothing until a `SUBSCRIBE` control frame arrives. Returns the
    /// index to use with [`Self::apply_subscription`] and
    /// [`Self::detach`].
    pub fn attach(&mut self, pipe: PipeEndpoint) -> usize {
        self.subscribers.push_back(Subscriber { pipe, prefixes: Vec::new(), array_index: None })
    }

    /// Apply a `SUBSCRIBE`/`UNSUBSCRIBE` control frame received from
    /// subscriber `index`, as produced by [`encode_subscription`].
    pub fn apply_subscription(&mut self, index: usize, subscribe: bool, prefix: &[u8]) {
        let Some(sub) = self.subscribers.get_mut(index) else { return };
        if subscribe {
            sub.prefixes.push(prefix.to_vec());
        } else {
            sub.prefixes.retain(|p| p.as_slice() != prefix);
        }
    }

    /// Broadcast `msg` to every subscriber whose prefix set matches its
    /// leading bytes.
    ///
    /// Under [`NoDropPolicy::Blocking`], any matching subscriber that
    /// isn't currently writable aborts the whole broadcast before any
    /// subscriber observes it, returning [`PatternError::WouldBlock`].
    /// Under [`NoDropPolicy::DropWhenFull`] a full subscriber pipe is
    /// silently skipped.
    pub fn publish(&mut self, msg: &Message) -> Result<(), PatternError> {
        if self.nodrop == NoDropPolicy::Blocking {
            for sub in self.subscribers.iter() {
                if sub.matches(msg.data()) && !sub.pipe.check_write() {
                    return Err(PatternError::WouldBlock);
                }
            }
        }

        for idx in 0..self.subscribers.len() {
            let sub = self.subscribers.get_mut(idx).expect("index is in bounds by construction");
            if !sub.matches(msg.data()) {
                continue;
            }
            if sub.pipe.check_write() {
                sub.pipe.write(msg.clone());
            } else {
                tracing::debug!(subscriber = idx, "dropping publish for HWM-full subscriber pipe");
            }
        }
        Ok(())
    }

    /// Detach subscriber `index`, e.g. once its pipe has terminated.
    /// O(1) via the intrusive array's swap-remove (§4.C1).
    pub fn detach(&mut self, index: usize) {
        if index < self.subscribers.len() {
            self.subscribers.erase_at(index);
        }
    }

    /// Number of subscribers currently attached.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

/// Client side of PUB/SUB: filters inbound broadcasts against a local
/// prefix set and encodes `SUBSCRIBE`/`UNSUBSCRIBE` control frames to send
/// upstream to the PUB socket.
pub struct SubSocket {
    pipe: PipeEndpoint,
    prefixes: Vec<Vec<u8>>,
}

impl SubSocket {
    /// A `SubSocket` reading from `pipe`, subscribed to nothing yet.
    pub fn new(pipe: PipeEndpoint) -> Self {
        Self { pipe, prefixes: Vec::new() }
    }

    /// Subscribe to `prefix` (empty subscribes to everything). Returns
    /// the control frame the caller must send upstream.
    pub fn subscribe(&mut self, prefix: Vec<u8>) -> Message {
        let frame = encode_subscription(true, &prefix);
        self.prefixes.push(prefix);
        frame
    }

    /// Unsubscribe from `prefix`. Returns the control frame the caller
    /// must send upstream.
    pub fn unsubscribe(&mut self, prefix: &[u8]) -> Message {
        self.prefixes.retain(|p| p.as_slice() != prefix);
        encode_subscription(false, prefix)
    }

    /// Receive the next broadcast message matching a local subscription,
    /// discarding anything that doesn't (the PUB side already filters,
    /// but a SUB defends against peers that don't, e.g. direct test
    /// wiring).
    pub fn recv(&mut self) -> Option<Message> {
        loop {
            let msg = self.pipe.read()?;
            if self.prefixes.iter().any(|p| msg.data().starts_with(p.as_slice())) {
                return Some(msg);
            }
        }
    }
}

/// Encode a `SUBSCRIBE`/`UNSUBSCRIBE` control frame: a leading byte (`1`
/// subscribe, `0` unsubscribe) followed by the prefix bytes.
pub fn encode_subscription(subscribe: bool, prefix: &[u8]) -> Message {
    let mut body = Vec::with_capacity(1 + prefix.len());
    body.push(u8::from(subscribe));
    body.extend_from_slice(prefix);
    Message::from_bytes(body)
}

/// Decode a control frame produced by [`encode_subscription`].
pub fn decode_subscription(msg: &Message) -> Option<(bool, &[u8])> {
    let (&flag, prefix) = msg.data().split_first()?;
    Some((flag != 0, prefix))
}
