//! Error type for the event system.
//!
//! Only [`EventError::Inactive`] and [`EventError::LockTimeout`] can come out
//! of queue operations; together they mean "event system unavailable", never
//! "no events". Overflow and filtering are reported as outcomes, not errors.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventError {
    /// The event loop has not been started, or has been stopped.
    #[error("event queue is not active")]
    Inactive,

    /// The queue mutex could not be acquired within the configured timeout.
    #[error("couldn't lock event queue")]
    LockTimeout,

    /// The background producer thread could not be created.
    #[error("failed to spawn event thread: {0}")]
    ThreadSpawn(#[source] io::Error),

    /// Reserving user event codes would run past [`crate::EventType::LAST`].
    #[error("cannot register {requested} user events, only {remaining} codes left")]
    UserEventsExhausted { requested: u32, remaining: u32 },
}

impl EventError {
    /// True for the errors that mean the queue itself is unreachable.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Inactive | Self::LockTimeout)
    }
}

pub type Result<T, E = EventError> = std::result::Result<T, E>;
