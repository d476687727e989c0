//! User event ID allocator.
//!
//! Hands out disjoint ranges of type codes from [`EventType::USER`] up to
//! [`EventType::LAST`]. Allocation is a single compare-and-swap, so
//! concurrent callers never receive overlapping ranges.

use std::sync::atomic::{AtomicU32, Ordering};

use tracing::debug;

use crate::error::{EventError, Result};
use crate::types::EventType;

#[derive(Debug)]
pub struct UserEventAllocator {
    next: AtomicU32,
}

impl UserEventAllocator {
    pub fn new() -> Self {
        Self {
            next: AtomicU32::new(EventType::USER.code()),
        }
    }

    /// Reserve `count` consecutive codes and return the first one.
    ///
    /// Fails without moving the cursor when the range would end past
    /// [`EventType::LAST`].
    pub fn register(&self, count: u32) -> Result<EventType> {
        let last = EventType::LAST.code();
        match self.next.fetch_update(Ordering::AcqRel, Ordering::Acquire, |cur| {
            cur.checked_add(count).filter(|end| *end <= last)
        }) {
            Ok(base) => {
                debug!("registered {} user events at {:#06x}", count, base);
                Ok(EventType(base))
            }
            Err(cur) => Err(EventError::UserEventsExhausted {
                requested: count,
                remaining: last.saturating_sub(cur),
            }),
        }
    }

    /// Next code that would be handed out.
    pub fn cursor(&self) -> EventType {
        EventType(self.next.load(Ordering::Acquire))
    }
}

impl Default for UserEventAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_successive_ranges_are_disjoint() {
        let alloc = UserEventAllocator::new();
        let a = alloc.register(5).unwrap();
        let b = alloc.register(5).unwrap();
        assert_eq!(a, EventType::USER);
        assert_eq!(b.code(), a.code() + 5);
    }

    #[test]
    fn test_exhaustion_leaves_cursor_untouched() {
        let alloc = UserEventAllocator::new();
        alloc.register(10).unwrap();
        let before = alloc.cursor();

        let err = alloc.register(0x8000).unwrap_err();
        assert!(matches!(err, EventError::UserEventsExhausted { requested: 0x8000, .. }));
        assert_eq!(alloc.cursor(), before);

        // A fitting request still succeeds afterwards
        assert_eq!(alloc.register(1).unwrap(), before);
    }

    #[test]
    fn test_can_fill_to_last() {
        let alloc = UserEventAllocator::new();
        let span = EventType::LAST.code() - EventType::USER.code();
        assert!(alloc.register(span).is_ok());
        assert_eq!(alloc.cursor(), EventType::LAST);
        assert!(alloc.register(1).is_err());
    }

    #[test]
    fn test_overflowing_count_fails() {
        let alloc = UserEventAllocator::new();
        assert!(alloc.register(u32::MAX).is_err());
        assert_eq!(alloc.cursor(), EventType::USER);
    }

    #[test]
    fn test_concurrent_registration_no_overlap() {
        let alloc = Arc::new(UserEventAllocator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let alloc = alloc.clone();
                thread::spawn(move || {
                    (0..50).map(|_| alloc.register(3).unwrap().code()).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut bases: Vec<u32> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        bases.sort_unstable();
        for pair in bases.windows(2) {
            assert!(pair[1] - pair[0] >= 3);
        }
        assert_eq!(bases.len(), 200);
    }
}
