//! Bounded pool for system window-manager message payloads.
//!
//! System messages are large and driver specific, so the event record only
//! carries a handle. The queue copies each payload into the next slot of
//! this pool when the event is enqueued. The write cursor is independent of
//! the ring's head and tail: after `MAX_EVENTS` further messages a slot is
//! reused even if its event has not been read yet. Every store gets a fresh
//! stamp, so a handle to a reused slot resolves to `None` instead of to the
//! wrong payload.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::event::SysWmMsg;
use crate::types::MAX_EVENTS;

/// Stamps are unique across every pool in the process, so a handle taken
/// from one event loop never resolves in another.
static NEXT_STAMP: AtomicU64 = AtomicU64::new(1);

pub struct MessagePool {
    slots: Vec<Option<(u64, SysWmMsg)>>,
    next: usize,
}

impl MessagePool {
    pub fn new() -> Self {
        let mut slots = Vec::with_capacity(MAX_EVENTS);
        slots.resize_with(MAX_EVENTS, || None);
        Self { slots, next: 0 }
    }

    /// Store a payload, returning its slot and stamp.
    pub fn store(&mut self, msg: SysWmMsg) -> (usize, u64) {
        let stamp = NEXT_STAMP.fetch_add(1, Ordering::Relaxed);
        let slot = self.next;
        self.slots[slot] = Some((stamp, msg));
        self.next = (slot + 1) % MAX_EVENTS;
        (slot, stamp)
    }

    /// The payload stored under `slot`, if it has not been overwritten.
    pub fn get(&self, slot: usize, stamp: u64) -> Option<&SysWmMsg> {
        match self.slots.get(slot)? {
            Some((s, msg)) if *s == stamp => Some(msg),
            _ => None,
        }
    }

    pub fn cursor(&self) -> usize {
        self.next
    }

    /// Drop every payload and rewind the cursor.
    ///
    /// Stamps are never reused, so handles from before the reset stay dead.
    pub fn reset(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.next = 0;
    }
}

impl Default for MessagePool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_get() {
        let mut pool = MessagePool::new();
        let (slot, stamp) = pool.store(SysWmMsg::new(7, vec![1, 2]));
        assert_eq!(slot, 0);
        assert_eq!(pool.get(slot, stamp).map(|m| m.subsystem), Some(7));
        assert_eq!(pool.cursor(), 1);
    }

    #[test]
    fn test_overwritten_slot_resolves_to_none() {
        let mut pool = MessagePool::new();
        let (slot, stamp) = pool.store(SysWmMsg::new(1, vec![]));
        for n in 0..MAX_EVENTS {
            pool.store(SysWmMsg::new(n as u32 + 2, vec![]));
        }
        assert!(pool.get(slot, stamp).is_none());
    }

    #[test]
    fn test_cursor_wraps() {
        let mut pool = MessagePool::new();
        for _ in 0..MAX_EVENTS {
            pool.store(SysWmMsg::default());
        }
        assert_eq!(pool.cursor(), 0);
    }

    #[test]
    fn test_reset_invalidates_handles() {
        let mut pool = MessagePool::new();
        let (slot, stamp) = pool.store(SysWmMsg::new(3, vec![9]));
        pool.reset();
        assert_eq!(pool.cursor(), 0);
        assert!(pool.get(slot, stamp).is_none());

        let (slot2, stamp2) = pool.store(SysWmMsg::new(4, vec![]));
        assert_eq!(slot2, slot);
        assert_ne!(stamp2, stamp);
    }

    #[test]
    fn test_handle_from_other_pool_does_not_resolve() {
        let mut first = MessagePool::new();
        let mut second = MessagePool::new();
        let (slot, stamp) = first.store(SysWmMsg::new(1, vec![1]));
        second.store(SysWmMsg::new(2, vec![2]));

        assert_eq!(slot, 0);
        assert!(second.get(slot, stamp).is_none());
        assert_eq!(first.get(slot, stamp).map(|m| m.subsystem), Some(1));
    }
}
