//! Event Pipeline
//!
//! Connects producers to the queue and the queue to the consumer.
//!
//! # Pipeline Architecture
//!
//! ```text
//! EventSource::pump ──► EventSink::push ──► type state ──► filter ──► queue
//!   (producer thread          │                                         │
//!    or inline in wait)       └──────────── Arrivals::notify ◄──────────┘
//!                                                 │
//!                                 wait_timeout / poll / peep ◄── consumer
//! ```
//!
//! ## Key Design Principles
//!
//! - **One context object**: [`EventLoop`] owns all state, no globals
//! - **Bounded critical sections**: the queue mutex is never held while
//!   sleeping, filtering or pumping
//! - **Cooperative pausing**: the producer only stops at its checkpoint

pub mod dispatch;
pub mod event_loop;
pub mod gate;
pub(crate) mod producer;
pub mod source;
pub(crate) mod wake;

// Re-exports
pub use dispatch::{EventFilter, PeepAction, PushOutcome};
pub use event_loop::EventLoop;
pub use gate::{ProducerGate, ProducerPause};
pub use source::{EventSink, EventSource, NullSource};
