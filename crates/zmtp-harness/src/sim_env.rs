//! Deterministic [`Environment`]: virtual clock plus a seeded RNG.
//!
//! The teacher's own simulation environment was dropped from this retrieval
//! pack along with `sim_transport`/`scenario`; this one is grounded in the
//! call-site conventions that survive in `sim_driver.rs` elsewhere in the
//! pack (`SimEnv::with_seed(seed)`, `SimEnv::new()`) and in the turmoil-style
//! shape of a deterministic environment: time advances only when the driver
//! says so, and every byte of randomness traces back to one seed.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use zmtp_core::Environment;

/// A point in virtual time, measured as an offset from simulation start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct VirtualInstant(Duration);

impl std::ops::Sub for VirtualInstant {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        self.0 - rhs.0
    }
}

#[derive(Debug)]
struct State {
    now: Duration,
    rng: ChaCha8Rng,
}

/// A deterministic [`Environment`]: given the same seed, every `now()` and
/// `random_bytes()` call across a run returns the same sequence, byte for
/// byte. `sleep` never touches a real timer — it advances the virtual clock
/// synchronously and resolves immediately, so a scenario runs as fast as the
/// driver can push it forward.
#[derive(Debug, Clone)]
pub struct SimEnv {
    state: Arc<Mutex<State>>,
}

impl SimEnv {
    /// A fresh environment seeded with `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self { state: Arc::new(Mutex::new(State { now: Duration::ZERO, rng: ChaCha8Rng::seed_from_u64(seed) })) }
    }

    /// A fresh environment seeded with `0`, for scenarios that don't care
    /// about the specific random sequence.
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    /// Advance the virtual clock by `duration` without sleeping. Scenario
    /// drivers call this directly between steps that care about elapsed
    /// time (idle timeouts, reconnect backoff).
    pub fn advance(&self, duration: Duration) {
        self.state.lock().expect("sim env mutex poisoned").now += duration;
    }
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for SimEnv {
    type Instant = VirtualInstant;

    fn now(&self) -> Self::Instant {
        VirtualInstant(self.state.lock().expect("sim env mutex poisoned").now)
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        self.advance(duration);
        std::future::ready(())
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.state.lock().expect("sim env mutex poisoned").rng.fill_bytes(buffer);
    }
}
