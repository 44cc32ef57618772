//! The inproc rendezvous registry (§3 "Inproc rendezvous", §9 "Global
//! inproc registry").
//!
//! Process-wide mapping from endpoint name to either a bound socket or a
//! list of pending connecters. `connect()` never blocks on bind timing: it
//! creates the pipe pair immediately and hands the connecter its side,
//! parking the bind side wherever the registry currently has somewhere to
//! park it (the live `Bound` entry's unclaimed list, or a `Pending` list
//! if nobody has bound yet).

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use zmtp_core::{PipeEndpoint, pipe_pair};

enum Entry {
    Bound { unclaimed: Vec<PipeEndpoint> },
    Pending { waiting: Vec<PipeEndpoint> },
}

/// A process-wide (or test-scoped) inproc registry. Cheap to clone — every
/// clone shares the same underlying map.
#[derive(Clone, Default)]
pub struct InprocRegistry {
    inner: Arc<Mutex<HashMap<String, Entry>>>,
}

/// A handle returned by [`InprocRegistry::bind`]. Polls for newly-attached
/// connecters and, on [`BoundSocket::close`], parks whatever the caller
/// hands back for a later `bind()` of the same name to pick up.
pub struct BoundSocket {
    registry: InprocRegistry,
    name: String,
}

impl InprocRegistry {
    /// A fresh, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`. Returns a handle plus every pipe endpoint a connecter
    /// already registered while nobody was bound — bind, when arriving
    /// later, drains pending connecters (§3's inproc-rendezvous
    /// invariant).
    pub fn bind(&self, name: &str) -> (BoundSocket, Vec<PipeEndpoint>) {
        let mut map = self.inner.lock().expect("registry mutex poisoned");
        let initial = match map.remove(name) {
            Some(Entry::Pending { waiting }) => waiting,
            Some(Entry::Bound { unclaimed }) => unclaimed,
            None => Vec::new(),
        };
        map.insert(name.to_string(), Entry::Bound { unclaimed: Vec::new() });
        tracing::debug!(name, pending = initial.len(), "inproc bind");
        (BoundSocket { registry: self.clone(), name: name.to_string() }, initial)
    }

    /// Connect to `name`. Always succeeds immediately with the
    /// connecter-side pipe endpoint, regardless of whether anyone has
    /// bound yet.
    pub fn connect(&self, name: &str, hwm_out: usize, hwm_in: usize) -> PipeEndpoint {
        let (connecter_side, bind_side) = pipe_pair(hwm_out, hwm_in);
        let mut map = self.inner.lock().expect("registry mutex poisoned");
        let bound = match map.entry(name.to_string()).or_insert_with(|| Entry::Pending { waiting: Vec::new() }) {
            Entry::Bound { unclaimed } => {
                unclaimed.push(bind_side);
                true
            },
            Entry::Pending { waiting } => {
                waiting.push(bind_side);
                false
            },
        };
        tracing::debug!(name, bound, "inproc connect");
        connecter_side
    }

    /// True if `name` currently has a live binder.
    pub fn is_bound(&self, name: &str) -> bool {
        matches!(self.inner.lock().expect("registry mutex poisoned").get(name), Some(Entry::Bound { .. }))
    }
}

impl BoundSocket {
    /// Drain pipe endpoints for connecters that attached since the last
    /// call (or since `bind()`, for the first call).
    pub fn take_new_connections(&self) -> Vec<PipeEndpoint> {
        let mut map = self.registry.inner.lock().expect("registry mutex poisoned");
        match map.get_mut(&self.name) {
            Some(Entry::Bound { unclaimed }) => std::mem::take(unclaimed),
            _ => Vec::new(),
        }
    }

    /// Close this bound socket.
    ///
    /// `leftover` is every pipe endpoint the caller claimed via
    /// `take_new_connections` but hasn't individually torn down — this is
    /// the fix for §9's "bind-close-before-connect" open question: those
    /// endpoints (and anything still unclaimed) are parked as pending
    /// rather than dropped, so a later `bind()` of the same name
    /// redelivers whatever they still hold instead of silently losing it.
    pub fn close(self, leftover: Vec<PipeEndpoint>) {
        let mut map = self.registry.inner.lock().expect("registry mutex poisoned");
        let mut waiting = leftover;
        if let Some(Entry::Bound { unclaimed }) = map.remove(&self.name) {
            waiting.extend(unclaimed);
        }
        tracing::debug!(name = self.name, reparked = waiting.len(), "inproc bind closed");
        map.insert(self.name.clone(), Entry::Pending { waiting });
    }
}

#[cfg(test)]
mod tests {
    use zmtp_wire::Message;

    use super::*;

    #[test]
    fn connect_before_bind_delivers_queued_message() {
        let registry = InprocRegistry::new();
        let mut connecter = registry.connect("a", 0, 0);
        connecter.write(Message::from_bytes(b"hi".to_vec()));

        let (_bound, initial) = registry.bind("a");
        assert_eq!(initial.len(), 1);
        let mut bind_side = initial.into_iter().next().unwrap();
        assert_eq!(bind_side.read().unwrap().data(), b"hi");
    }

    #[test]
    fn bind_then_connect_shows_up_via_take_new_connections() {
        let registry = InprocRegistry::new();
        let (bound, initial) = registry.bind("a");
        assert!(initial.is_empty());

        let mut connecter = registry.connect("a", 0, 0);
        connecter.write(Message::from_bytes(b"hello".to_vec()));

        let mut new = bound.take_new_connections();
        assert_eq!(new.len(), 1);
        assert_eq!(new[0].read().unwrap().data(), b"hello");
    }

    #[test]
    fn bind_close_before_connecter_is_drained_preserves_its_messages() {
        let registry = InprocRegistry::new();
        let (bound, initial) = registry.bind("a");
        assert!(initial.is_empty());

        // A connecter attaches and writes, but the binder never gets
        // around to calling take_new_connections before closing.
        let mut connecter = registry.connect("a", 0, 0);
        connecter.write(Message::from_bytes(b"orphaned".to_vec()));

        bound.close(Vec::new());
        assert!(!registry.is_bound("a"));

        // A later bind() of the same name must still see that message.
        let (_rebound, initial) = registry.bind("a");
        assert_eq!(initial.len(), 1);
        let mut pipe = initial.into_iter().next().unwrap();
        assert_eq!(pipe.read().unwrap().data(), b"orphaned");
    }

    #[test]
    fn close_reparks_caller_claimed_leftovers_too() {
        let registry = InprocRegistry::new();
        let (bound, _) = registry.bind("a");

        let mut connecter = registry.connect("a", 0, 0);
        connecter.write(Message::from_bytes(b"claimed".to_vec()));

        let claimed = bound.take_new_connections();
        assert_eq!(claimed.len(), 1);

        bound.close(claimed);

        let (_rebound, initial) = registry.bind("a");
        assert_eq!(initial.len(), 1);
    }
}
