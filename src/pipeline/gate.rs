//! Producer gate - lets a foreign thread pause the background producer.
//!
//! # Protocol
//!
//! ```text
//!   producer thread                      foreign thread
//!   ───────────────                      ──────────────
//!   pump source                          pause()
//!   checkpoint(delay) ─┐                   pauses += 1
//!     parked = true    │ ◄──── notify ──   wait until parked
//!     sleep `delay`    │                   ... exclusive section ...
//!     wait pauses == 0 │ ◄──── notify ──   drop(ProducerPause): pauses -= 1
//!     parked = false  ─┘
//! ```
//!
//! The producer only ever stops at the checkpoint, so once a pause is
//! granted the producer is guaranteed to be between two pumps. Pausing from
//! the producer thread itself, or with no producer armed, is a no-op.
//!
//! # Example
//!
//! ```ignore
//! let pause = event_loop.lock_event_thread();
//! reconfigure_devices();
//! drop(pause); // producer resumes
//! ```

use std::thread::{self, ThreadId};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

#[derive(Debug, Default)]
struct GateState {
    producer: Option<ThreadId>,
    parked: bool,
    pauses: usize,
    shutdown: bool,
}

#[derive(Debug, Default)]
pub struct ProducerGate {
    state: Mutex<GateState>,
    cond: Condvar,
}

impl ProducerGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget any previous producer and clear the shutdown flag.
    pub(crate) fn reset(&self) {
        *self.state.lock() = GateState::default();
    }

    /// Record the producer thread that will call [`checkpoint`](Self::checkpoint).
    pub(crate) fn arm(&self, producer: ThreadId) {
        self.state.lock().producer = Some(producer);
    }

    /// The armed producer thread, if any.
    pub fn producer(&self) -> Option<ThreadId> {
        self.state.lock().producer
    }

    /// Called by the producer once per iteration, between pumps.
    ///
    /// Sleeps for `delay` (waking early on shutdown) and then blocks for as
    /// long as any pause is outstanding.
    pub(crate) fn checkpoint(&self, delay: Duration) {
        let mut state = self.state.lock();
        if state.shutdown {
            return;
        }
        state.parked = true;
        self.cond.notify_all();

        if !delay.is_zero() {
            self.cond.wait_for(&mut state, delay);
        }
        while state.pauses > 0 && !state.shutdown {
            self.cond.wait(&mut state);
        }
        state.parked = false;
    }

    /// Block until the producer is parked and keep it there until the guard
    /// is dropped.
    pub fn pause(&self) -> ProducerPause<'_> {
        let mut state = self.state.lock();
        let Some(producer) = state.producer else {
            return ProducerPause { gate: None };
        };
        if producer == thread::current().id() || state.shutdown {
            return ProducerPause { gate: None };
        }

        state.pauses += 1;
        while !state.parked && !state.shutdown && state.producer.is_some() {
            self.cond.wait(&mut state);
        }
        ProducerPause { gate: Some(self) }
    }

    /// Release every waiter. The producer's next checkpoint returns at once.
    pub(crate) fn shutdown(&self) {
        let mut state = self.state.lock();
        state.shutdown = true;
        self.cond.notify_all();
    }

    /// Called by the producer thread on its way out.
    pub(crate) fn producer_exited(&self) {
        let mut state = self.state.lock();
        state.producer = None;
        state.parked = false;
        self.cond.notify_all();
    }

    pub fn is_paused(&self) -> bool {
        let state = self.state.lock();
        state.parked && state.pauses > 0
    }

    fn release(&self) {
        let mut state = self.state.lock();
        state.pauses = state.pauses.saturating_sub(1);
        self.cond.notify_all();
    }
}

/// RAII pause of the background producer. The producer resumes on drop.
#[must_use = "the producer resumes as soon as the pause is dropped"]
pub struct ProducerPause<'a> {
    gate: Option<&'a ProducerGate>,
}

impl ProducerPause<'_> {
    /// Whether this guard actually holds the producer (false for the no-op guard).
    pub fn is_held(&self) -> bool {
        self.gate.is_some()
    }
}

impl Drop for ProducerPause<'_> {
    fn drop(&mut self) {
        if let Some(gate) = self.gate.take() {
            gate.release();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
