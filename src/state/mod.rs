//! State Module - per-loop bookkeeping that outlives single operations
//!
//! - **Type State** - which event types are currently disabled
//! - **User Events** - allocator for application-defined type codes

mod type_state;
mod user_events;

pub use type_state::*;
pub use user_events::*;
