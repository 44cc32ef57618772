//! Deterministic simulation harness for end-to-end ZMTP scenarios.
//!
//! [`SimEnv`] is a seeded, virtual-time [`zmtp_core::Environment`]: a
//! scenario run with the same seed produces the same CURVE keys, nonce
//! prefixes, and timing every time. [`duplex`] wires two [`zmtp_core::Session`]s
//! together in memory so a scenario can drive a full greeting/handshake/
//! message exchange without a real socket.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod duplex;
pub mod sim_env;

pub use sim_env::SimEnv;
