//! Inproc HWM scenarios (§8 scenarios 1-3): PUSH/PULL through the rendezvous
//! registry, exercising the credit protocol across bind/connect ordering.

use zmtp_patterns::{InprocRegistry, PullSocket, PushSocket};
use zmtp_wire::Message;

fn msg(bytes: &[u8]) -> Message {
    Message::from_bytes(bytes.to_vec())
}

// Our pipe collapses sndhwm/rcvhwm negotiation into one directional
// high-water mark per `pipe_pair`, so "blocks after exactly N sends" here
// is governed by that single number rather than two independently-tuned
// socket options. hwm=2 reproduces the scenario's literal send count.
const HWM: usize = 2;

#[test]
fn bind_first_push_blocks_after_hwm_sends_then_drains() {
    let registry = InprocRegistry::new();
    let (bound, _initial) = registry.bind("hwm-bind-first");

    let connecter = registry.connect("hwm-bind-first", HWM, HWM);
    let mut push = PushSocket::new();
    push.attach(connecter);

    let mut pull = PullSocket::new();
    for pipe in bound.take_new_connections() {
        pull.attach(pipe);
    }

    push.send(msg(b"one")).unwrap();
    push.send(msg(b"two")).unwrap();
    assert!(push.send(msg(b"three")).is_err());

    assert_eq!(pull.recv().unwrap().data(), b"one");
    assert_eq!(pull.recv().unwrap().data(), b"two");
    assert!(pull.recv().is_none());

    // Credit freed by the reads above; one more send, one more recv.
    push.send(msg(b"three")).unwrap();
    assert_eq!(pull.recv().unwrap().data(), b"three");

    bound.close(Vec::new());
}

#[test]
fn connect_first_push_blocks_after_hwm_sends_then_drains() {
    let registry = InprocRegistry::new();
    let connecter = registry.connect("hwm-connect-first", HWM, HWM);
    let mut push = PushSocket::new();
    push.attach(connecter);

    let (bound, initial) = registry.bind("hwm-connect-first");
    let mut pull = PullSocket::new();
    for pipe in initial {
        pull.attach(pipe);
    }

    push.send(msg(b"one")).unwrap();
    push.send(msg(b"two")).unwrap();
    assert!(push.send(msg(b"three")).is_err());

    assert_eq!(pull.recv().unwrap().data(), b"one");
    assert_eq!(pull.recv().unwrap().data(), b"two");

    push.send(msg(b"three")).unwrap();
    assert_eq!(pull.recv().unwrap().data(), b"three");

    bound.close(Vec::new());
}

#[test]
fn connect_then_close_before_bind_preserves_exactly_the_sndhwm_worth_of_messages() {
    const SNDHWM: usize = 1;

    let registry = InprocRegistry::new();
    let mut connecter = registry.connect("hwm-orphaned", SNDHWM, SNDHWM);

    // The PUSH side sends into a void: nobody has bound yet. With
    // sndhwm=1, only the first write is accepted; the rest are rejected
    // outright rather than queued.
    assert!(connecter.write(msg(b"first")));
    assert!(!connecter.write(msg(b"second")));
    assert!(!connecter.write(msg(b"third")));

    drop(connecter);

    let (_bound, initial) = registry.bind("hwm-orphaned");
    assert_eq!(initial.len(), 1);
    let mut pull = PullSocket::new();
    pull.attach(initial.into_iter().next().unwrap());

    assert_eq!(pull.recv().unwrap().data(), b"first");
    assert!(pull.recv().is_none());
}
