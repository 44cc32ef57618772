//! Pipe/HWM flow control, the session/engine state machine, and the
//! NULL/PLAIN/CURVE mechanism handshakes — the parts of the protocol core
//! that sit above the wire primitives in `zmtp-wire` (components C1, C6,
//! C7, C8).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod env;
pub mod error;
pub mod intrusive_array;
pub mod mechanism;
pub mod pipe;
pub mod session;

pub use env::Environment;
pub use error::SessionError;
pub use intrusive_array::{Array, ArrayItem};
pub use mechanism::{CurveMechanism, Mechanism, NullMechanism, PlainMechanism, Status};
pub use pipe::{PipeEndpoint, pipe_pair};
pub use session::{Session, SessionAction, SessionState};
