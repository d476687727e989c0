//! Event queue - everything guarded by the single queue mutex.
//!
//! ```text
//!   push ──► type state gate ──► filter ──► EventQueue::enqueue
//!                                              │
//!                          ┌───────────────────┼──────────────────┐
//!                          │                   │                  │
//!                      EventRing          MessagePool      TypeStateTable
//!                   (head/tail ring)   (sys-wm payloads)   (disabled types)
//! ```
//!
//! The type state table sits behind the same lock as the ring so that
//! disabling a type and purging its queued events is one atomic step.

pub mod pool;
pub mod ring;
pub mod stats;

use std::ops::RangeInclusive;

use tracing::{debug, trace};

use crate::event::{Event, SysWmEvent, SysWmMsg, SysWmPayload};
use crate::state::{EventState, StateRequest, TypeStateTable};
use crate::types::EventType;

pub use pool::MessagePool;
pub use ring::EventRing;
pub use stats::QueueStats;

/// Result of a single enqueue attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Enqueue {
    Added,
    Full,
    Disabled,
}

#[derive(Default)]
pub struct EventQueue {
    ring: EventRing,
    messages: MessagePool,
    types: TypeStateTable,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Append one event. Returns false (and drops the event) when full.
    ///
    /// A system message payload still owned by the event is moved into the
    /// message pool and the event keeps only a handle to it.
    pub fn add(&mut self, mut event: Event) -> bool {
        if self.ring.is_full() {
            trace!("event queue full, dropping {}", event.event_type());
            return false;
        }
        if let Event::SysWm(sys) = &mut event {
            if let SysWmPayload::Inline(msg) = &mut sys.payload {
                let (slot, stamp) = self.messages.store(std::mem::take(&mut **msg));
                sys.payload = SysWmPayload::Pooled { slot, stamp };
            }
        }
        self.ring.push(event).is_ok()
    }

    /// Enqueue unless the event's type is disabled.
    pub(crate) fn enqueue(&mut self, event: Event) -> Enqueue {
        if self.types.is_disabled(event.event_type()) {
            return Enqueue::Disabled;
        }
        if self.add(event) { Enqueue::Added } else { Enqueue::Full }
    }

    /// Copy (or, with `remove`, take) up to `max` events with a type in
    /// `range`, oldest first.
    pub fn collect(
        &mut self,
        max: usize,
        range: &RangeInclusive<EventType>,
        remove: bool,
        out: &mut Vec<Event>,
    ) -> usize {
        self.ring.collect(max, range, remove, out)
    }

    pub fn contains(&self, range: &RangeInclusive<EventType>) -> bool {
        self.ring.contains(range)
    }

    pub fn flush(&mut self, range: &RangeInclusive<EventType>) -> usize {
        self.ring.flush(range)
    }

    pub fn retain<F>(&mut self, keep: F) -> usize
    where
        F: FnMut(&Event) -> bool,
    {
        self.ring.retain(keep)
    }

    pub fn type_state(&self, ty: EventType) -> EventState {
        self.types.state(ty)
    }

    pub fn any_enabled(&self, first: EventType, last: EventType) -> bool {
        self.types.any_enabled(first, last)
    }

    /// Query or change the state of `ty`, returning the state before the call.
    ///
    /// Disabling also purges every queued event whose code shares its table
    /// entry (the type itself and any code aliasing onto it).
    pub fn set_type_state(&mut self, ty: EventType, request: StateRequest) -> EventState {
        let current = self.types.state(ty);
        match (request, current) {
            (StateRequest::Disable, EventState::Enabled) => {
                if self.types.disable(ty) {
                    let purged = self.ring.retain(|ev| !TypeStateTable::aliases(ev.event_type(), ty));
                    debug!("disabled event type {} ({} queued purged)", ty, purged);
                }
            }
            (StateRequest::Enable, EventState::Disabled) => {
                self.types.enable(ty);
                debug!("enabled event type {}", ty);
            }
            _ => {}
        }
        current
    }

    /// Resolve the payload of a queued system message event.
    pub fn sys_wm_message(&self, event: &SysWmEvent) -> Option<SysWmMsg> {
        match &event.payload {
            SysWmPayload::Inline(msg) => Some((**msg).clone()),
            SysWmPayload::Pooled { slot, stamp } => self.messages.get(*slot, *stamp).cloned(),
        }
    }

    /// Empty the ring, rewind the message pool and re-enable every type.
    pub fn reset(&mut self) {
        self.ring.clear();
        self.messages.reset();
        self.types.clear();
    }

    pub fn allocated_type_blocks(&self) -> usize {
        self.types.allocated_blocks()
    }
}

// =============================================================================
// Tests
// =============================================================================
