//! Dispatch API - push, peep, poll, wait, filter and flush.
//!
//! Every queue access funnels through [`EventLoop::peep`] or the push path;
//! both hold the queue mutex only for one bounded pass over at most
//! `MAX_EVENTS` slots. Waiting never holds the mutex.
//!
//! # API
//!
//! - `push(event)` - type state, then filter, then enqueue
//! - `peep(buf, max, action, range)` - add / peek / get in one primitive
//! - `poll()` / `wait()` / `wait_timeout(d)` - take the oldest event
//! - `set_filter(f)` / `get_filter()` / `filter_events(f)` - filtering
//! - `flush_event(ty)` / `flush_events(range)` - discard queued events
//! - `set_type_state(ty, req)` - enable, disable or query a type
//! - `register_user_events(n)` - reserve application type codes
//!
//! # Example
//!
//! ```ignore
//! let event_loop = EventLoop::default();
//! event_loop.start(false)?;
//!
//! event_loop.push(Event::Quit)?;
//! while let Some(event) = event_loop.poll()? {
//!     if event.is_quit() {
//!         break;
//!     }
//! }
//! ```

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::Result;
use crate::event::{Event, SysWmEvent, SysWmMsg};
use crate::pipeline::event_loop::EventLoop;
use crate::queue::QueueStats;
use crate::state::{EventState, StateRequest};
use crate::types::EventType;

/// Pre-queue filter. Return false to drop the event.
///
/// Runs synchronously on whichever thread pushes, outside the queue lock.
/// It must be fast and must not call back into the loop. Per-filter state
/// lives in the closure's captures.
pub type EventFilter = Arc<dyn Fn(&Event) -> bool + Send + Sync>;

/// What happened to a pushed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Queued.
    Accepted,
    /// Rejected by the installed filter.
    Filtered,
    /// Its type is disabled.
    Disabled,
    /// The queue was full.
    Dropped,
}

impl PushOutcome {
    pub fn is_accepted(self) -> bool {
        self == Self::Accepted
    }
}

/// Action for [`EventLoop::peep`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeepAction {
    /// Enqueue events taken from the front of the buffer.
    Add,
    /// Copy matching events out, leave them queued.
    Peek,
    /// Move matching events out of the queue.
    Get,
}

impl EventLoop {
    // =========================================================================
    // Pump / Peep
    // =========================================================================

    /// Gather new events from the source now.
    ///
    /// Does nothing while a background producer owns pumping or while the
    /// loop is stopped.
    pub fn pump(&self) {
        if self.is_active() && !self.is_threaded() {
            self.shared.pump_source();
        }
    }

    /// The single add/peek/get primitive.
    ///
    /// - `Add` drains up to `max` events from the front of `events` and
    ///   enqueues them, returning how many made it in. Overflow and disabled
    ///   types lower the count; the filter is not consulted.
    /// - `Peek` / `Get` append up to `max` events whose type lies in `range`
    ///   to `events`, oldest first. `Get` removes them; non-matching events
    ///   keep their place and order.
    ///
    /// An error means the queue is unavailable, never that it is empty.
    pub fn peep(
        &self,
        events: &mut Vec<Event>,
        max: usize,
        action: PeepAction,
        range: RangeInclusive<EventType>,
    ) -> Result<usize> {
        let mut queue = self.shared.lock_queue()?;
        match action {
            PeepAction::Add => {
                let take = max.min(events.len());
                let added = events
                    .drain(..take)
                    .map(|event| self.shared.record(queue.enqueue(event)))
                    .filter(|outcome| outcome.is_accepted())
                    .count();
                Ok(added)
            }
            PeepAction::Peek => Ok(queue.collect(max, &range, false, events)),
            PeepAction::Get => Ok(queue.collect(max, &range, true, events)),
        }
    }

    /// Enqueue a batch directly, bypassing the filter.
    pub fn add_events<I>(&self, events: I) -> Result<usize>
    where
        I: IntoIterator<Item = Event>,
    {
        let mut batch: Vec<Event> = events.into_iter().collect();
        let max = batch.len();
        self.peep(&mut batch, max, PeepAction::Add, EventType::ALL)
    }

    pub fn peek_events(&self, max: usize, range: RangeInclusive<EventType>) -> Result<Vec<Event>> {
        let mut out = Vec::new();
        self.peep(&mut out, max, PeepAction::Peek, range)?;
        Ok(out)
    }

    pub fn get_events(&self, max: usize, range: RangeInclusive<EventType>) -> Result<Vec<Event>> {
        let mut out = Vec::new();
        self.peep(&mut out, max, PeepAction::Get, range)?;
        Ok(out)
    }

    pub fn has_event(&self, ty: EventType) -> bool {
        self.has_events(ty.only())
    }

    /// Whether any queued event lies in `range`. False when unavailable.
    pub fn has_events(&self, range: RangeInclusive<EventType>) -> bool {
        self.shared
            .lock_queue()
            .map(|queue| queue.contains(&range))
            .unwrap_or(false)
    }

    pub fn flush_event(&self, ty: EventType) -> usize {
        self.flush_events(ty.only())
    }

    /// Discard queued events in `range`, returning how many went.
    pub fn flush_events(&self, range: RangeInclusive<EventType>) -> usize {
        match self.shared.lock_queue() {
            Ok(mut queue) => queue.flush(&range),
            Err(_) => 0,
        }
    }

    // =========================================================================
    // Poll / Wait
    // =========================================================================

    /// Take the oldest event without blocking.
    pub fn poll(&self) -> Result<Option<Event>> {
        self.wait_timeout(Duration::ZERO)
    }

    /// Block until an event arrives.
    pub fn wait(&self) -> Result<Event> {
        loop {
            if let Some(event) = self.wait_inner(None)? {
                return Ok(event);
            }
        }
    }

    /// Block up to `timeout` for an event. `Ok(None)` means it timed out.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<Option<Event>> {
        self.wait_inner(Some(timeout))
    }

    fn wait_inner(&self, timeout: Option<Duration>) -> Result<Option<Event>> {
        // A timeout too large for `Instant` waits without a deadline.
        let deadline = timeout
            .filter(|t| !t.is_zero())
            .and_then(|t| Instant::now().checked_add(t));
        let mut out = Vec::with_capacity(1);

        loop {
            let seen = self.shared.arrivals.seq();
            self.pump();
            self.peep(&mut out, 1, PeepAction::Get, EventType::ALL)?;
            if let Some(event) = out.pop() {
                return Ok(Some(event));
            }

            let mut nap = self.shared.config.poll_interval;
            if timeout.is_some_and(|t| t.is_zero()) {
                return Ok(None);
            }
            if let Some(deadline) = deadline {
                let now = Instant::now();
                if now >= deadline {
                    return Ok(None);
                }
                nap = nap.min(deadline - now);
            }
            self.shared.arrivals.wait_since(seen, nap);
        }
    }

    // =========================================================================
    // Push / Filter
    // =========================================================================

    /// Push one event through the type state gate and the filter.
    pub fn push(&self, event: Event) -> Result<PushOutcome> {
        self.shared.push(event)
    }

    /// Install (or clear) the pre-queue filter.
    ///
    /// Everything already queued is discarded so no event reaches the
    /// consumer under the old policy once the new one is in place.
    pub fn set_filter(&self, filter: Option<EventFilter>) {
        debug!(installed = filter.is_some(), "event filter changed");
        *self.shared.filter.write() = filter;
        self.flush_events(EventType::ALL);
    }

    pub fn get_filter(&self) -> Option<EventFilter> {
        self.shared.filter.read().clone()
    }

    /// Apply `keep` to every queued event once, cutting those it rejects.
    ///
    /// Returns how many were removed; 0 when unavailable.
    pub fn filter_events<F>(&self, keep: F) -> usize
    where
        F: FnMut(&Event) -> bool,
    {
        match self.shared.lock_queue() {
            Ok(mut queue) => queue.retain(keep),
            Err(_) => 0,
        }
    }

    // =========================================================================
    // Type State / User Events
    // =========================================================================

    /// Enable, disable or query `ty`, returning the state before the call.
    ///
    /// Disabling purges queued events of that type in the same critical
    /// section. Works whether or not the loop is running.
    pub fn set_type_state(&self, ty: EventType, request: StateRequest) -> EventState {
        self.shared.queue.lock().set_type_state(ty, request)
    }

    pub fn event_state(&self, ty: EventType) -> EventState {
        self.set_type_state(ty, StateRequest::Query)
    }

    /// Reserve `count` consecutive application type codes.
    pub fn register_user_events(&self, count: u32) -> Result<EventType> {
        self.shared.user_events.register(count)
    }

    // =========================================================================
    // System Messages
    // =========================================================================

    /// Post a system message event if `SYS_WM` is enabled.
    pub fn send_sys_wm_event(&self, msg: SysWmMsg) -> Result<PushOutcome> {
        self.push(Event::sys_wm(msg))
    }

    /// Payload of a dequeued system message event.
    ///
    /// `None` once the message pool slot has been reused by a later message
    /// or the loop has been restarted.
    pub fn sys_wm_message(&self, event: &SysWmEvent) -> Option<SysWmMsg> {
        self.shared.queue.lock().sys_wm_message(event)
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    pub fn stats(&self) -> QueueStats {
        let len = self.shared.queue.lock().len();
        self.shared.counters.snapshot(len)
    }

    pub fn len(&self) -> usize {
        self.shared.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EventError;
    use crate::event::UserEvent;
    use crate::pipeline::source::EventSink;
    use crate::types::{KeyMod, MAX_EVENTS};

    fn started() -> EventLoop {
        let event_loop = EventLoop::default();
        event_loop.start(false).unwrap();
        event_loop
    }

    fn user(n: i32) -> Event {
        Event::user(EventType::USER, n)
    }

    fn code(event: &Event) -> i32 {
        match event {
            Event::User(UserEvent { code, .. }) => *code,
            other => panic!("expected user event, got {:?}", other),
        }
    }

    #[test]
    fn test_inactive_loop_is_unavailable() {
        let event_loop = EventLoop::default();
        assert!(matches!(event_loop.push(Event::Quit), Err(EventError::Inactive)));
        assert!(matches!(event_loop.poll(), Err(EventError::Inactive)));
        assert!(!event_loop.has_event(EventType::QUIT));
        assert_eq!(event_loop.flush_events(EventType::ALL), 0);
    }

    #[test]
    fn test_capacity_is_one_less_than_slots() {
        let event_loop = started();
        let outcomes: Vec<_> = (0..MAX_EVENTS as i32)
            .map(|n| event_loop.push(user(n)).unwrap())
            .collect();

        assert!(outcomes[..MAX_EVENTS - 1].iter().all(|o| o.is_accepted()));
        assert_eq!(outcomes[MAX_EVENTS - 1], PushOutcome::Dropped);

        let drained = event_loop.get_events(MAX_EVENTS, EventType::ALL).unwrap();
        assert_eq!(drained.len(), MAX_EVENTS - 1);
        let codes: Vec<i32> = drained.iter().map(code).collect();
        assert_eq!(codes, (0..MAX_EVENTS as i32 - 1).collect::<Vec<_>>());

        let stats = event_loop.stats();
        assert_eq!(stats.queued, MAX_EVENTS as u64 - 1);
        assert_eq!(stats.dropped, 1);
        assert_eq!(stats.len, 0);
    }

    #[test]
    fn test_get_by_range_keeps_others_in_order() {
        let event_loop = started();
        event_loop.push(user(1)).unwrap();
        event_loop.push(Event::key_down(10, KeyMod::NONE)).unwrap();
        event_loop.push(user(2)).unwrap();
        event_loop.push(Event::key_up(10, KeyMod::NONE)).unwrap();
        event_loop.push(user(3)).unwrap();

        let keys = event_loop
            .get_events(10, EventType::KEY_DOWN..=EventType::KEY_UP)
            .unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].event_type(), EventType::KEY_DOWN);
        assert_eq!(keys[1].event_type(), EventType::KEY_UP);

        let rest: Vec<i32> = event_loop
            .get_events(10, EventType::ALL)
            .unwrap()
            .iter()
            .map(code)
            .collect();
        assert_eq!(rest, vec![1, 2, 3]);
    }

    #[test]
    fn test_peek_leaves_queue_untouched() {
        let event_loop = started();
        event_loop.push(user(1)).unwrap();
        event_loop.push(user(2)).unwrap();

        let peeked = event_loop.peek_events(1, EventType::ALL).unwrap();
        assert_eq!(peeked.iter().map(code).collect::<Vec<_>>(), vec![1]);
        assert_eq!(event_loop.len(), 2);
        assert!(event_loop.has_event(EventType::USER));
        assert!(!event_loop.has_events(EventType::KEY_DOWN..=EventType::TEXT_INPUT));
    }

    #[test]
    fn test_peep_add_reports_partial_count() {
        let event_loop = started();
        let mut batch: Vec<Event> = (0..MAX_EVENTS as i32 + 4).map(user).collect();
        let len = batch.len();
        let added = event_loop.peep(&mut batch, len, PeepAction::Add, EventType::ALL).unwrap();
        assert_eq!(added, MAX_EVENTS - 1);
        assert!(batch.is_empty());
        assert_eq!(event_loop.stats().dropped, 5);
    }

    #[test]
    fn test_add_events_bypasses_filter() {
        let event_loop = started();
        event_loop.set_filter(Some(Arc::new(|_: &Event| false)));
        assert_eq!(event_loop.add_events([user(1), user(2)]).unwrap(), 2);
        assert_eq!(event_loop.push(user(3)).unwrap(), PushOutcome::Filtered);
        assert_eq!(event_loop.len(), 2);
    }

    #[test]
    fn test_filtered_push_is_not_overflow() {
        let event_loop = started();
        event_loop.set_filter(Some(Arc::new(|ev: &Event| !ev.is_quit())));

        assert_eq!(event_loop.push(Event::Quit).unwrap(), PushOutcome::Filtered);
        assert_eq!(event_loop.push(user(1)).unwrap(), PushOutcome::Accepted);

        let stats = event_loop.stats();
        assert_eq!(stats.filtered, 1);
        assert_eq!(stats.dropped, 0);
        assert!(!event_loop.has_event(EventType::QUIT));
    }

    #[test]
    fn test_set_filter_discards_queued_events() {
        let event_loop = started();
        event_loop.push(user(1)).unwrap();
        event_loop.push(Event::Quit).unwrap();

        event_loop.set_filter(Some(Arc::new(|_: &Event| true)));
        assert!(event_loop.is_empty());
        assert!(event_loop.get_filter().is_some());

        event_loop.set_filter(None);
        assert!(event_loop.get_filter().is_none());
    }

    #[test]
    fn test_filter_events_cuts_rejected() {
        let event_loop = started();
        for n in 0..6 {
            event_loop.push(user(n)).unwrap();
        }
        let removed = event_loop.filter_events(|ev| code(ev) % 2 == 0);
        assert_eq!(removed, 3);

        let left: Vec<i32> = event_loop
            .get_events(10, EventType::ALL)
            .unwrap()
            .iter()
            .map(code)
            .collect();
        assert_eq!(left, vec![0, 2, 4]);
    }

    #[test]
    fn test_disable_is_retroactive_until_enabled() {
        let event_loop = started();
        for _ in 0..3 {
            event_loop.push(Event::key_down(65, KeyMod::NONE)).unwrap();
        }
        assert_eq!(
            event_loop.set_type_state(EventType::KEY_DOWN, StateRequest::Disable),
            EventState::Enabled
        );
        assert!(event_loop.get_events(10, EventType::ALL).unwrap().is_empty());

        assert_eq!(
            event_loop.push(Event::key_down(65, KeyMod::NONE)).unwrap(),
            PushOutcome::Disabled
        );
        assert!(event_loop.poll().unwrap().is_none());

        event_loop.set_type_state(EventType::KEY_DOWN, StateRequest::Enable);
        assert!(event_loop.push(Event::key_down(65, KeyMod::NONE)).unwrap().is_accepted());
        assert_eq!(event_loop.poll().unwrap().map(|e| e.event_type()), Some(EventType::KEY_DOWN));
        assert_eq!(event_loop.stats().disabled, 1);
    }

    #[test]
    fn test_disabled_type_skips_filter() {
        let event_loop = started();
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let seen = calls.clone();
        event_loop.set_filter(Some(Arc::new(move |_: &Event| {
            seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            true
        })));
        event_loop.set_type_state(EventType::QUIT, StateRequest::Disable);
        assert_eq!(event_loop.push(Event::Quit).unwrap(), PushOutcome::Disabled);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn test_type_state_before_start() {
        let event_loop = EventLoop::default();
        assert_eq!(
            event_loop.set_type_state(EventType::MOUSE_MOTION, StateRequest::Disable),
            EventState::Enabled
        );
        assert_eq!(event_loop.event_state(EventType::MOUSE_MOTION), EventState::Disabled);
    }

    #[test]
    fn test_poll_returns_immediately_when_queued() {
        let event_loop = started();
        event_loop.push(Event::Quit).unwrap();
        let start = Instant::now();
        assert_eq!(event_loop.poll().unwrap(), Some(Event::Quit));
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_wait_timeout_pumps_inline_source() {
        let event_loop = started();
        let mut fired = false;
        event_loop.set_source(move |sink: &EventSink<'_>| {
            if !fired {
                fired = true;
                let _ = sink.push(Event::user(EventType::USER, 42));
            }
        });

        let event = event_loop.wait_timeout(Duration::from_millis(200)).unwrap();
        assert_eq!(event.as_ref().map(code), Some(42));
        assert_eq!(event_loop.poll().unwrap(), None);
    }

    #[test]
    fn test_register_user_events_disjoint() {
        let event_loop = EventLoop::default();
        let a = event_loop.register_user_events(5).unwrap();
        let b = event_loop.register_user_events(5).unwrap();
        assert_eq!(b.code(), a.code() + 5);

        let err = event_loop.register_user_events(0x10000).unwrap_err();
        assert!(matches!(err, EventError::UserEventsExhausted { .. }));
        assert_eq!(event_loop.register_user_events(1).unwrap().code(), b.code() + 5);
    }

    #[test]
    fn test_sys_wm_event_gated_and_resolved() {
        let event_loop = started();
        let msg = SysWmMsg::new(7, vec![1, 2, 3]);
        assert_eq!(event_loop.send_sys_wm_event(msg.clone()).unwrap(), PushOutcome::Disabled);

        event_loop.set_type_state(EventType::SYS_WM, StateRequest::Enable);
        assert!(event_loop.send_sys_wm_event(msg.clone()).unwrap().is_accepted());

        let Some(Event::SysWm(sys)) = event_loop.poll().unwrap() else {
            panic!("expected a sys-wm event");
        };
        assert_eq!(event_loop.sys_wm_message(&sys), Some(msg));

        event_loop.start(false).unwrap();
        assert_eq!(event_loop.sys_wm_message(&sys), None);
    }

    #[test]
    fn test_wait_timeout_max_duration_waits_without_deadline() {
        let event_loop = Arc::new(started());
        let pusher = {
            let event_loop = event_loop.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(20));
                event_loop.push(user(5)).unwrap()
            })
        };

        let event = event_loop.wait_timeout(Duration::MAX).unwrap();
        assert_eq!(event.as_ref().map(code), Some(5));
        assert!(pusher.join().unwrap().is_accepted());
    }
}
