//! Arrival notification for blocked waiters.
//!
//! Every successful enqueue bumps a sequence number and notifies the
//! condvar. A waiter records the sequence before it looks at the queue and
//! only sleeps if nothing arrived since, so an event pushed between the
//! empty check and the sleep is never missed.
//!
//! The sleep is still bounded by the retry interval: a waiter without a
//! background producer has to wake up to pump the source itself.

use std::time::Duration;

use parking_lot::{Condvar, Mutex};

#[derive(Debug, Default)]
pub(crate) struct Arrivals {
    seq: Mutex<u64>,
    cond: Condvar,
}

impl Arrivals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current arrival sequence number.
    pub fn seq(&self) -> u64 {
        *self.seq.lock()
    }

    /// Record that events were enqueued and wake every waiter.
    pub fn notify(&self) {
        let mut seq = self.seq.lock();
        *seq = seq.wrapping_add(1);
        self.cond.notify_all();
    }

    /// Sleep up to `timeout` unless the sequence has moved past `seen`.
    ///
    /// Returns true when woken by an arrival.
    pub fn wait_since(&self, seen: u64, timeout: Duration) -> bool {
        let mut seq = self.seq.lock();
        if *seq != seen {
            return true;
        }
        if timeout.is_zero() {
            return false;
        }
        self.cond.wait_for(&mut seq, timeout);
        *seq != seen
    }
}
