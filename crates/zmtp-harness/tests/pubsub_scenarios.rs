//! PUB/SUB HWM scenarios (§8 scenarios 4-5): `DropWhenFull` silently sheds
//! excess messages at the subscriber's HWM, while `Blocking`
//! (`XPUB_NODROP`) refuses to drop anything and instead pushes back on the
//! publisher until the subscriber catches up.

use zmtp_patterns::{NoDropPolicy, PubSocket, SubSocket};
use zmtp_wire::Message;

fn msg(n: u32) -> Message {
    Message::from_bytes(n.to_be_bytes().to_vec())
}

#[test]
fn drop_when_full_delivers_exactly_hwm_messages() {
    const SNDHWM: usize = 1000;
    const SENT: u32 = 1500;

    let (pub_pipe, sub_pipe) = zmtp_core::pipe_pair(SNDHWM, 0);
    let mut pub_socket = PubSocket::new(NoDropPolicy::DropWhenFull);
    let idx = pub_socket.attach(pub_pipe);
    let mut sub = SubSocket::new(sub_pipe);
    sub.subscribe(Vec::new());
    pub_socket.apply_subscription(idx, true, b"");

    // The subscriber never drains mid-loop, so once its pipe hits
    // sndhwm the publisher silently sheds the rest.
    for n in 0..SENT {
        pub_socket.publish(&msg(n)).unwrap();
    }

    let mut received = 0;
    while sub.recv().is_some() {
        received += 1;
    }
    assert_eq!(received, SNDHWM);
}

#[test]
fn blocking_nodrop_delivers_every_message_by_draining_as_it_goes() {
    const SNDHWM: usize = 2000;
    const TOTAL: u32 = 6000;

    let (pub_pipe, sub_pipe) = zmtp_core::pipe_pair(SNDHWM, 0);
    let mut pub_socket = PubSocket::new(NoDropPolicy::Blocking);
    let idx = pub_socket.attach(pub_pipe);
    let mut sub = SubSocket::new(sub_pipe);
    sub.subscribe(Vec::new());
    pub_socket.apply_subscription(idx, true, b"");

    let mut delivered = Vec::with_capacity(TOTAL as usize);
    let mut next_to_send = 0u32;
    while next_to_send < TOTAL || delivered.len() < TOTAL as usize {
        if next_to_send < TOTAL {
            match pub_socket.publish(&msg(next_to_send)) {
                Ok(()) => next_to_send += 1,
                Err(_) => {
                    // Pipe is HWM-full; drain one to free space, mirroring
                    // a non-blocking publisher that alternates send/recv.
                    if let Some(m) = sub.recv() {
                        delivered.push(u32::from_be_bytes(m.data().try_into().unwrap()));
                    }
                },
            }
        } else {
            let Some(m) = sub.recv() else { break };
            delivered.push(u32::from_be_bytes(m.data().try_into().unwrap()));
        }
    }

    assert_eq!(delivered.len(), TOTAL as usize);
    assert_eq!(delivered, (0..TOTAL).collect::<Vec<_>>());
}
