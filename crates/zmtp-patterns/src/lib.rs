//! PUSH/PULL and PUB/SUB socket patterns, plus the inproc rendezvous
//! registry they bind/connect through (component C9 and the §3/§9
//! inproc-registry design).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod pub_sub;
pub mod push_pull;
pub mod registry;

pub use error::PatternError;
pub use pub_sub::{NoDropPolicy, PubSocket, SubSocket, decode_subscription, encode_subscription};
pub use push_pull::{PullSocket, PushSocket};
pub use registry::{BoundSocket, InprocRegistry};
