//! In-memory duplex wiring between two [`Session`]s, for scenarios that
//! need a full greeting/handshake/message exchange without a real socket.

use zmtp_core::{Session, SessionAction, SessionState};

fn drain_transmits(actions: Vec<SessionAction>, out: &mut Vec<u8>) {
    for action in actions {
        if let SessionAction::Transmit(bytes) = action {
            out.extend(bytes);
        }
    }
}

/// Pump bytes back and forth between `a` and `b` until both reach
/// [`SessionState::Ready`] or `rounds` round-trips are exhausted. Returns
/// whether both sides made it to `Ready`.
pub fn pump_to_ready(a: &mut Session, b: &mut Session, rounds: usize) -> bool {
    let mut a_to_b = Vec::new();
    let mut b_to_a = Vec::new();

    for _ in 0..rounds {
        if a.state() == SessionState::Ready && b.state() == SessionState::Ready {
            return true;
        }

        let mut input = a_to_b.as_slice();
        let actions = b.feed_transport_bytes(&mut input).expect("b rejected a's handshake bytes");
        a_to_b.clear();
        drain_transmits(actions, &mut b_to_a);

        let mut input = b_to_a.as_slice();
        let actions = a.feed_transport_bytes(&mut input).expect("a rejected b's handshake bytes");
        b_to_a.clear();
        drain_transmits(actions, &mut a_to_b);
    }

    a.state() == SessionState::Ready && b.state() == SessionState::Ready
}

/// Drain whatever `sender` has queued on its outbound pipe and feed the
/// resulting wire bytes straight into `receiver`.
pub fn deliver_outbound(sender: &mut Session, receiver: &mut Session) {
    let actions = sender.pump_outbound().expect("sender failed to encode its outbound queue");
    let mut bytes = Vec::new();
    drain_transmits(actions, &mut bytes);
    let mut input = bytes.as_slice();
    receiver.feed_transport_bytes(&mut input).expect("receiver rejected sender's message bytes");
}
