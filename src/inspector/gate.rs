//! Resume Gate
//!
//! A single-slot mailbox between the operator and a parked workload thread.
//! The slot is either empty or armed. `signal` arms it (idempotently),
//! `block` waits for it to be armed and empties it again. A signal that
//! arrives before anyone blocks is kept until the next `block`.
//!
//! This is not a queue: any number of signals sent between two blocks
//! collapse into one.

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// How a wait on the gate ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// A resume signal was consumed
    Resumed,
    /// The timeout elapsed with no signal; nothing was consumed
    TimedOut,
    /// The inspection server could not start, so nobody could have resumed
    Unavailable,
}

impl WaitOutcome {
    pub fn is_resumed(&self) -> bool {
        matches!(self, WaitOutcome::Resumed)
    }
}

/// Single-slot resume signal.
#[derive(Debug, Default)]
pub struct ResumeGate {
    armed: Mutex<bool>,
    resumed: Condvar,
}

impl ResumeGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the gate. Extra calls before the next `block` are no-ops.
    pub fn signal(&self) {
        let mut armed = self.armed.lock().unwrap_or_else(PoisonError::into_inner);
        *armed = true;
        self.resumed.notify_one();
    }

    /// Park until the gate is armed, then consume the signal.
    pub fn block(&self) {
        let mut armed = self.armed.lock().unwrap_or_else(PoisonError::into_inner);
        while !*armed {
            armed = self
                .resumed
                .wait(armed)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *armed = false;
    }

    /// Like [`block`](Self::block), giving up after `timeout`.
    ///
    /// Returns [`WaitOutcome::Resumed`] or [`WaitOutcome::TimedOut`].
    pub fn block_timeout(&self, timeout: Duration) -> WaitOutcome {
        let deadline = Instant::now() + timeout;
        let mut armed = self.armed.lock().unwrap_or_else(PoisonError::into_inner);

        while !*armed {
            let now = Instant::now();
            if now >= deadline {
                return WaitOutcome::TimedOut;
            }
            // Spurious wakeups loop back with the remaining time.
            let (guard, _) = self
                .resumed
                .wait_timeout(armed, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            armed = guard;
        }

        *armed = false;
        WaitOutcome::Resumed
    }

    /// Whether a signal is pending.
    pub fn is_armed(&self) -> bool {
        *self.armed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
