//! Fixed-capacity circular buffer of events with mid-queue removal.
//!
//! `head` is the oldest event, `tail` the next free slot. The ring is empty
//! when `head == tail` and full when `tail + 1 == head` (mod capacity), so
//! it holds at most `MAX_EVENTS - 1` events.
//!
//! Not synchronized. Callers hold the queue mutex.

use std::ops::RangeInclusive;

use crate::event::Event;
use crate::types::{EventType, MAX_EVENTS};

pub struct EventRing {
    slots: Vec<Option<Event>>,
    head: usize,
    tail: usize,
}

impl EventRing {
    pub fn new() -> Self {
        let mut slots = Vec::with_capacity(MAX_EVENTS);
        slots.resize_with(MAX_EVENTS, || None);
        Self { slots, head: 0, tail: 0 }
    }

    #[inline]
    fn next(spot: usize) -> usize {
        (spot + 1) % MAX_EVENTS
    }

    #[inline]
    fn prev(spot: usize) -> usize {
        (spot + MAX_EVENTS - 1) % MAX_EVENTS
    }

    pub fn len(&self) -> usize {
        (self.tail + MAX_EVENTS - self.head) % MAX_EVENTS
    }

    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    pub fn is_full(&self) -> bool {
        Self::next(self.tail) == self.head
    }

    /// Append at the tail. Hands the event back if the ring is full.
    pub fn push(&mut self, event: Event) -> Result<(), Event> {
        let tail = Self::next(self.tail);
        if tail == self.head {
            return Err(event);
        }
        self.slots[self.tail] = Some(event);
        self.tail = tail;
        Ok(())
    }

    /// Remove the event at `spot` and return the next spot to examine.
    ///
    /// Relative order of every remaining event is preserved. Removing from
    /// the middle shifts the events after `spot` one slot toward it, so the
    /// returned spot then holds the successor of the removed event.
    pub fn cut(&mut self, spot: usize) -> (usize, Option<Event>) {
        let removed = self.slots[spot].take();

        if spot == self.head {
            self.head = Self::next(self.head);
            return (self.head, removed);
        }

        if Self::next(spot) == self.tail {
            self.tail = spot;
            return (spot, removed);
        }

        // Middle cut: drop the logical last slot and shift down into `spot`
        self.tail = Self::prev(self.tail);
        let mut here = spot;
        while here != self.tail {
            let next = Self::next(here);
            self.slots[here] = self.slots[next].take();
            here = next;
        }
        (spot, removed)
    }

    /// Walk from head to tail, copying (or removing, when `remove` is set)
    /// up to `max` events whose type is in `range` into `out`.
    ///
    /// Returns how many were collected.
    pub fn collect(
        &mut self,
        max: usize,
        range: &RangeInclusive<EventType>,
        remove: bool,
        out: &mut Vec<Event>,
    ) -> usize {
        let mut used = 0;
        let mut spot = self.head;
        while used < max && spot != self.tail {
            let matched = self.slots[spot]
                .as_ref()
                .is_some_and(|ev| range.contains(&ev.event_type()));
            if !matched {
                spot = Self::next(spot);
                continue;
            }
            if remove {
                let (next, removed) = self.cut(spot);
                out.extend(removed);
                spot = next;
            } else {
                out.extend(self.slots[spot].clone());
                spot = Self::next(spot);
            }
            used += 1;
        }
        used
    }

    /// Whether any queued event has a type in `range`.
    pub fn contains(&self, range: &RangeInclusive<EventType>) -> bool {
        self.iter().any(|ev| range.contains(&ev.event_type()))
    }

    /// Discard every event whose type is in `range`. Returns the count.
    pub fn flush(&mut self, range: &RangeInclusive<EventType>) -> usize {
        self.retain(|ev| !range.contains(&ev.event_type()))
    }

    /// Keep only events for which `keep` returns true, in one pass.
    ///
    /// Returns how many were removed.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&Event) -> bool,
    {
        let mut removed = 0;
        let mut spot = self.head;
        while spot != self.tail {
            let kept = self.slots[spot].as_ref().is_some_and(|ev| keep(ev));
            if kept {
                spot = Self::next(spot);
            } else {
                spot = self.cut(spot).0;
                removed += 1;
            }
        }
        removed
    }

    /// Events from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Event> + '_ {
        let mut spot = self.head;
        std::iter::from_fn(move || {
            while spot != self.tail {
                let here = spot;
                spot = Self::next(spot);
                if let Some(ev) = self.slots[here].as_ref() {
                    return Some(ev);
                }
            }
            None
        })
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.head = 0;
        self.tail = 0;
    }

    #[cfg(test)]
    pub(crate) fn set_origin(&mut self, spot: usize) {
        self.clear();
        self.head = spot % MAX_EVENTS;
        self.tail = self.head;
    }
}

impl Default for EventRing {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
