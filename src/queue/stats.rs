//! Push outcome counters.
//!
//! Overflow is a silent drop at the queue level; these counters are how a
//! caller notices queue pressure.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of the counters since the event loop was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueStats {
    /// Events that made it into the queue.
    pub queued: u64,
    /// Events dropped because the queue was full.
    pub dropped: u64,
    /// Events rejected by the installed filter.
    pub filtered: u64,
    /// Events pushed while their type was disabled.
    pub disabled: u64,
    /// Events in the queue when the snapshot was taken.
    pub len: usize,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    queued: AtomicU64,
    dropped: AtomicU64,
    filtered: AtomicU64,
    disabled: AtomicU64,
}

impl Counters {
    pub fn add_queued(&self, n: u64) {
        self.queued.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_dropped(&self, n: u64) {
        self.dropped.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_filtered(&self) {
        self.filtered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_disabled(&self) {
        self.disabled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, len: usize) -> QueueStats {
        QueueStats {
            len,
            queued: self.queued.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            filtered: self.filtered.load(Ordering::Relaxed),
            disabled: self.disabled.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_snapshot() {
        let counters = Counters::default();
        counters.add_queued(3);
        counters.add_dropped(1);
        counters.add_filtered();
        counters.add_disabled();
        counters.add_disabled();
        assert_eq!(
            counters.snapshot(5),
            QueueStats { queued: 3, dropped: 1, filtered: 1, disabled: 2, len: 5 }
        );
    }
}
