//! Core types shared by every part of the event system.
//!
//! - [`EventType`] - the 32-bit type code carried by every event
//! - [`ButtonState`] - pressed/released for keys and buttons
//! - [`KeyMod`], [`MouseButtons`] - modifier and button masks (bitflags)
//! - [`InlineText`] - fixed-size UTF-8 text for text input records

use std::fmt;
use std::ops::RangeInclusive;

// =============================================================================
// Queue Constants
// =============================================================================

/// Number of slots in the event ring.
///
/// One slot is always left free to tell "empty" from "full", so the queue
/// holds at most `MAX_EVENTS - 1` live events.
pub const MAX_EVENTS: usize = 128;

/// Size of the inline text buffer carried by text events.
pub const TEXT_SIZE: usize = 32;

// =============================================================================
// EventType
// =============================================================================

/// The 32-bit discriminant of an event.
///
/// Built-in codes are grouped by subsystem in blocks of 0x100. Codes from
/// [`EventType::USER`] through [`EventType::LAST`] belong to the application
/// and should be reserved with `EventLoop::register_user_events`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EventType(pub u32);

impl EventType {
    /// Lowest code. Never assigned to an event.
    pub const FIRST: Self = Self(0);

    /// User-requested quit.
    pub const QUIT: Self = Self(0x100);

    /// Window state change.
    pub const WINDOW: Self = Self(0x200);
    /// Platform-specific window system message.
    pub const SYS_WM: Self = Self(0x201);

    pub const KEY_DOWN: Self = Self(0x300);
    pub const KEY_UP: Self = Self(0x301);
    /// Text composition in progress.
    pub const TEXT_EDITING: Self = Self(0x302);
    /// Committed text input.
    pub const TEXT_INPUT: Self = Self(0x303);

    pub const MOUSE_MOTION: Self = Self(0x400);
    pub const MOUSE_BUTTON_DOWN: Self = Self(0x401);
    pub const MOUSE_BUTTON_UP: Self = Self(0x402);
    pub const MOUSE_WHEEL: Self = Self(0x403);

    /// Tablet pen entered proximity.
    pub const PROXIMITY_IN: Self = Self(0x500);
    /// Tablet pen left proximity.
    pub const PROXIMITY_OUT: Self = Self(0x501);

    pub const JOY_AXIS_MOTION: Self = Self(0x600);
    pub const JOY_BALL_MOTION: Self = Self(0x601);
    pub const JOY_HAT_MOTION: Self = Self(0x602);
    pub const JOY_BUTTON_DOWN: Self = Self(0x603);
    pub const JOY_BUTTON_UP: Self = Self(0x604);

    /// First application-defined code.
    pub const USER: Self = Self(0x8000);

    /// Last valid code. Bounds the user range.
    pub const LAST: Self = Self(0xFFFF);

    /// Every event type, for scans that should not filter by type.
    pub const ALL: RangeInclusive<Self> = Self::FIRST..=Self::LAST;

    /// Raw numeric code.
    #[inline]
    pub const fn code(self) -> u32 {
        self.0
    }

    /// Inclusive range covering only this type.
    #[inline]
    pub const fn only(self) -> RangeInclusive<Self> {
        self..=self
    }

    /// Whether this code lies in the application range.
    #[inline]
    pub const fn is_user(self) -> bool {
        self.0 >= Self::USER.0 && self.0 <= Self::LAST.0
    }

    /// Human readable name for built-in codes.
    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            Self::QUIT => "quit",
            Self::WINDOW => "window",
            Self::SYS_WM => "sys-wm",
            Self::KEY_DOWN => "key-down",
            Self::KEY_UP => "key-up",
            Self::TEXT_EDITING => "text-editing",
            Self::TEXT_INPUT => "text-input",
            Self::MOUSE_MOTION => "mouse-motion",
            Self::MOUSE_BUTTON_DOWN => "mouse-button-down",
            Self::MOUSE_BUTTON_UP => "mouse-button-up",
            Self::MOUSE_WHEEL => "mouse-wheel",
            Self::PROXIMITY_IN => "proximity-in",
            Self::PROXIMITY_OUT => "proximity-out",
            Self::JOY_AXIS_MOTION => "joy-axis-motion",
            Self::JOY_BALL_MOTION => "joy-ball-motion",
            Self::JOY_HAT_MOTION => "joy-hat-motion",
            Self::JOY_BUTTON_DOWN => "joy-button-down",
            Self::JOY_BUTTON_UP => "joy-button-up",
            _ => return None,
        };
        Some(name)
    }
}

impl From<u32> for EventType {
    fn from(code: u32) -> Self {
        Self(code)
    }
}

impl From<EventType> for u32 {
    fn from(ty: EventType) -> Self {
        ty.0
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None if self.is_user() => write!(f, "user({:#06x})", self.0),
            None => write!(f, "{:#06x}", self.0),
        }
    }
}

// =============================================================================
// Button State
// =============================================================================

/// Pressed or released, for keys, mouse buttons and joystick buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    #[default]
    Pressed,
    Released,
}

impl ButtonState {
    pub fn is_pressed(self) -> bool {
        self == Self::Pressed
    }
}

// =============================================================================
// Modifier and Button Masks (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Keyboard modifier state.
    ///
    /// Combine with bitwise OR: `KeyMod::CTRL | KeyMod::SHIFT`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyMod: u16 {
        const NONE = 0;
        const SHIFT = 1 << 0;
        const CTRL = 1 << 1;
        const ALT = 1 << 2;
        const META = 1 << 3;
        const CAPS = 1 << 4;
        const NUM = 1 << 5;
    }
}

bitflags::bitflags! {
    /// Mouse buttons held during a motion event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MouseButtons: u8 {
        const NONE = 0;
        const LEFT = 1 << 0;
        const MIDDLE = 1 << 1;
        const RIGHT = 1 << 2;
        const X1 = 1 << 3;
        const X2 = 1 << 4;
    }
}

// =============================================================================
// InlineText
// =============================================================================

/// Fixed-capacity UTF-8 text stored inline in an event record.
///
/// Input longer than [`TEXT_SIZE`] bytes is truncated on a char boundary.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InlineText {
    len: u8,
    bytes: [u8; TEXT_SIZE],
}

impl InlineText {
    /// Empty text.
    pub const EMPTY: Self = Self { len: 0, bytes: [0; TEXT_SIZE] };

    pub fn new(text: &str) -> Self {
        let mut end = text.len().min(TEXT_SIZE);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        let mut bytes = [0u8; TEXT_SIZE];
        bytes[..end].copy_from_slice(&text.as_bytes()[..end]);
        Self { len: end as u8, bytes }
    }

    pub fn as_str(&self) -> &str {
        // Only ever filled from a &str cut on a char boundary.
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for InlineText {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl From<&str> for InlineText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl fmt::Debug for InlineText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for InlineText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Tests
// =============================================================================
