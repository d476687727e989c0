//! Input Module - concrete event sources
//!
//! - **Terminal** - crossterm-backed source for keyboard, mouse, resize,
//!   focus and paste events
//! - **Keycodes** - key code constants shared by sources and consumers

pub mod keycode;
pub mod terminal;

pub use terminal::{TerminalSource, disable_mouse_capture, enable_mouse_capture};
