//! Producer sources - the "poll now" capability the loop drives.
//!
//! A source is pumped once per loop iteration, either on the background
//! producer thread or inline from `wait_timeout` on the consumer's thread.
//! It pushes whatever it found through the [`EventSink`] and returns. A pump
//! must not block for more than a short, bounded time.
//!
//! # Example
//!
//! ```ignore
//! let event_loop = EventLoop::default().with_source(|sink: &EventSink<'_>| {
//!     if sink.is_enabled(EventType::QUIT) && ctrl_c_seen() {
//!         let _ = sink.push(Event::Quit);
//!     }
//! });
//! ```

use crate::error::Result;
use crate::event::Event;
use crate::pipeline::dispatch::PushOutcome;
use crate::pipeline::event_loop::Shared;
use crate::types::EventType;

/// Something that discovers events and pushes them into the loop.
pub trait EventSource: Send {
    fn pump(&mut self, sink: &EventSink<'_>);
}

impl<F> EventSource for F
where
    F: FnMut(&EventSink<'_>) + Send,
{
    fn pump(&mut self, sink: &EventSink<'_>) {
        self(sink)
    }
}

/// Source that never produces anything. Installed by default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSource;

impl EventSource for NullSource {
    fn pump(&mut self, _sink: &EventSink<'_>) {}
}

/// Handle a source pushes through during one pump.
pub struct EventSink<'a> {
    shared: &'a Shared,
}

impl<'a> EventSink<'a> {
    pub(crate) fn new(shared: &'a Shared) -> Self {
        Self { shared }
    }

    /// Push one event through the filter into the queue.
    pub fn push(&self, event: Event) -> Result<PushOutcome> {
        self.shared.push(event)
    }

    /// Whether events of `ty` would currently be accepted.
    pub fn is_enabled(&self, ty: EventType) -> bool {
        self.shared.queue.lock().type_state(ty).is_enabled()
    }

    /// Whether any type in `first..=last` is enabled.
    ///
    /// Lets a source skip polling a whole device class when none of its
    /// event types would be kept.
    pub fn any_enabled(&self, first: EventType, last: EventType) -> bool {
        self.shared.queue.lock().any_enabled(first, last)
    }
}
