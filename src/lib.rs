//! # spark-events
//!
//! Bounded, thread-safe event queue for the SparkTUI runtime.
//!
//! Input and window events are gathered by a producer, either a background
//! thread or inline on the consumer's thread, and delivered to one consumer
//! through a fixed-capacity ring with filtering, per-type enable/disable and
//! blocking retrieval with a timeout.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────┐      ┌──────────────────────────────────────────┐
//! │  EventSource      │      │  EventLoop (Arc<Shared>)                 │
//! │  (TerminalSource, │ push │                                          │
//! │   closures, ...)  │ ───► │  type state ─► filter ─► EventQueue      │
//! └───────────────────┘      │                          ├ EventRing     │
//!          ▲                 │                          ├ MessagePool   │
//!          │ pump            │                          └ TypeStateTable│
//! ┌───────────────────┐      │                                          │
//! │  producer thread  │ ◄──► │  ProducerGate (pause / checkpoint)       │
//! │  or inline pump   │      │  Arrivals (wake waiters)                 │
//! └───────────────────┘      └──────────────────────────────────────────┘
//!                                              │
//!                                              ▼
//!                              poll / wait_timeout / peep  (consumer)
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Core types (EventType, KeyMod, MouseButtons, InlineText)
//! - [`event`] - The `Event` enum and its payload records
//! - [`queue`] - Ring buffer, system message pool, push counters
//! - [`state`] - Type state table and user event allocator
//! - [`pipeline`] - `EventLoop`, dispatch API, producer thread and gate
//! - [`input`] - Concrete sources (crossterm terminal)
//! - [`config`] / [`error`] - Configuration and error types
//!
//! ## Quick Start
//!
//! ```ignore
//! use spark_events::{EventLoop, Event, input::TerminalSource};
//! use std::time::Duration;
//!
//! let event_loop = EventLoop::default().with_source(TerminalSource::new());
//! event_loop.start(true)?;
//!
//! loop {
//!     match event_loop.wait_timeout(Duration::from_millis(16))? {
//!         Some(Event::Quit) => break,
//!         Some(event) => handle(event),
//!         None => tick(),
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod input;
pub mod pipeline;
pub mod queue;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::EventLoopConfig;
pub use error::{EventError, Result};
pub use event::{
    Event, JoyAxisEvent, JoyBallEvent, JoyButtonEvent, JoyHatEvent, KeyboardEvent, MouseButton,
    MouseButtonEvent, MouseMotionEvent, MouseWheelEvent, ProximityEvent, SysWmEvent, SysWmMsg,
    TextEditingEvent, TextInputEvent, UserEvent, WindowEvent, WindowEventId,
};
pub use pipeline::{
    EventFilter, EventLoop, EventSink, EventSource, NullSource, PeepAction, ProducerPause,
    PushOutcome,
};
pub use queue::QueueStats;
pub use state::{EventState, StateRequest};
