//! Event records.
//!
//! An [`Event`] is a tagged, fixed-shape record. The queue only ever looks at
//! [`Event::event_type`]; the payload structs exist for producers and
//! consumers.
//!
//! # Example
//!
//! ```ignore
//! use spark_events::{Event, KeyboardEvent, KeyMod, ButtonState};
//!
//! let ev = Event::Key(KeyboardEvent::new(0, 'a' as u32, KeyMod::CTRL, ButtonState::Pressed));
//! assert_eq!(ev.event_type(), EventType::KEY_DOWN);
//! ```

use crate::types::{ButtonState, EventType, InlineText, KeyMod, MouseButtons};

// =============================================================================
// Window Events
// =============================================================================

/// Which window state change a [`WindowEvent`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEventId {
    Shown,
    Hidden,
    Exposed,
    Moved,
    Resized,
    Minimized,
    Maximized,
    Restored,
    Enter,
    Leave,
    FocusGained,
    FocusLost,
    Close,
}

/// Window state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowEvent {
    pub window_id: u32,
    pub event: WindowEventId,
    /// Event dependent (x / width for moves and resizes)
    pub data1: i32,
    /// Event dependent (y / height for moves and resizes)
    pub data2: i32,
}

impl WindowEvent {
    pub fn new(window_id: u32, event: WindowEventId) -> Self {
        Self { window_id, event, data1: 0, data2: 0 }
    }

    pub fn resized(window_id: u32, width: i32, height: i32) -> Self {
        Self { window_id, event: WindowEventId::Resized, data1: width, data2: height }
    }

    pub fn moved(window_id: u32, x: i32, y: i32) -> Self {
        Self { window_id, event: WindowEventId::Moved, data1: x, data2: y }
    }
}

// =============================================================================
// Keyboard Events
// =============================================================================

/// Key press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardEvent {
    pub window_id: u32,
    /// Keyboard device index
    pub which: u8,
    pub state: ButtonState,
    /// Platform independent key code (Unicode scalar for printable keys)
    pub keycode: u32,
    pub modifiers: KeyMod,
    pub repeat: bool,
}

impl KeyboardEvent {
    pub fn new(window_id: u32, keycode: u32, modifiers: KeyMod, state: ButtonState) -> Self {
        Self { window_id, which: 0, state, keycode, modifiers, repeat: false }
    }
}

/// Text composition in progress (IME).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEditingEvent {
    pub window_id: u32,
    pub text: InlineText,
    /// Cursor start within the composition
    pub start: i32,
    /// Length of the selected span
    pub length: i32,
}

/// Committed text input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextInputEvent {
    pub window_id: u32,
    pub which: u8,
    pub text: InlineText,
}

impl TextInputEvent {
    pub fn new(window_id: u32, text: &str) -> Self {
        Self { window_id, which: 0, text: InlineText::new(text) }
    }
}

// =============================================================================
// Mouse Events
// =============================================================================

/// Pointer moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MouseMotionEvent {
    pub window_id: u32,
    pub which: u8,
    /// Buttons held during the motion
    pub buttons: MouseButtons,
    pub x: i32,
    pub y: i32,
    pub xrel: i32,
    pub yrel: i32,
    /// Pressure reported by tablets (0 when unsupported)
    pub pressure: i32,
}

/// Mouse button index, matching the order of [`MouseButtons`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    X1,
    X2,
}

impl MouseButton {
    pub fn mask(self) -> MouseButtons {
        match self {
            Self::Left => MouseButtons::LEFT,
            Self::Middle => MouseButtons::MIDDLE,
            Self::Right => MouseButtons::RIGHT,
            Self::X1 => MouseButtons::X1,
            Self::X2 => MouseButtons::X2,
        }
    }
}

/// Mouse button press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseButtonEvent {
    pub window_id: u32,
    pub which: u8,
    pub button: MouseButton,
    pub state: ButtonState,
    pub x: i32,
    pub y: i32,
}

/// Wheel scrolled. Positive `y` is away from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MouseWheelEvent {
    pub window_id: u32,
    pub which: u8,
    pub x: i32,
    pub y: i32,
}

// =============================================================================
// Tablet Events
// =============================================================================

/// Tablet pen entering or leaving proximity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProximityEvent {
    pub window_id: u32,
    pub which: u8,
    /// true for proximity-in, false for proximity-out
    pub entered: bool,
    pub cursor: i32,
    pub x: i32,
    pub y: i32,
}

// =============================================================================
// Joystick Events
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoyAxisEvent {
    pub which: u8,
    pub axis: u8,
    /// -32768 to 32767
    pub value: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoyBallEvent {
    pub which: u8,
    pub ball: u8,
    pub xrel: i16,
    pub yrel: i16,
}

/// Hat position bits. Zero means centered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoyHatEvent {
    pub which: u8,
    pub hat: u8,
    pub value: u8,
}

impl JoyHatEvent {
    pub const CENTERED: u8 = 0x00;
    pub const UP: u8 = 0x01;
    pub const RIGHT: u8 = 0x02;
    pub const DOWN: u8 = 0x04;
    pub const LEFT: u8 = 0x08;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoyButtonEvent {
    pub which: u8,
    pub button: u8,
    pub state: ButtonState,
}

// =============================================================================
// User Events
// =============================================================================

/// Application-defined event.
///
/// `data1` and `data2` are opaque words. The queue copies them verbatim and
/// never interprets, frees or otherwise owns whatever they refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserEvent {
    pub event_type: EventType,
    pub window_id: u32,
    pub code: i32,
    pub data1: usize,
    pub data2: usize,
}

impl UserEvent {
    pub fn new(event_type: EventType, code: i32) -> Self {
        Self { event_type, window_id: 0, code, data1: 0, data2: 0 }
    }

    pub fn with_data(mut self, data1: usize, data2: usize) -> Self {
        self.data1 = data1;
        self.data2 = data2;
        self
    }
}

// =============================================================================
// System Window-Manager Messages
// =============================================================================

/// Driver-specific window system message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SysWmMsg {
    /// Which window system produced the message
    pub subsystem: u32,
    pub data: Vec<u8>,
}

impl SysWmMsg {
    pub fn new(subsystem: u32, data: impl Into<Vec<u8>>) -> Self {
        Self { subsystem, data: data.into() }
    }
}

/// Where a system message payload currently lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SysWmPayload {
    /// Still owned by the event, before it reaches the queue.
    Inline(Box<SysWmMsg>),
    /// Moved into the queue's message pool.
    Pooled { slot: usize, stamp: u64 },
}

/// Opaque system message event.
///
/// Once queued, the payload lives in a bounded pool owned by the queue and
/// is read back with `EventLoop::sys_wm_message`. A pool slot is reused
/// after [`crate::MAX_EVENTS`] later system messages, so a slow consumer
/// may find the payload gone. That loss is limited to this event kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysWmEvent {
    pub(crate) payload: SysWmPayload,
}

impl SysWmEvent {
    pub fn new(msg: SysWmMsg) -> Self {
        Self { payload: SysWmPayload::Inline(Box::new(msg)) }
    }

    /// The payload, if the event has not been queued yet.
    pub fn inline_message(&self) -> Option<&SysWmMsg> {
        match &self.payload {
            SysWmPayload::Inline(msg) => Some(msg),
            SysWmPayload::Pooled { .. } => None,
        }
    }

    pub fn is_pooled(&self) -> bool {
        matches!(self.payload, SysWmPayload::Pooled { .. })
    }
}

// =============================================================================
// Event
// =============================================================================

/// A single input or window occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Quit,
    Window(WindowEvent),
    SysWm(SysWmEvent),
    Key(KeyboardEvent),
    TextEditing(TextEditingEvent),
    TextInput(TextInputEvent),
    MouseMotion(MouseMotionEvent),
    MouseButton(MouseButtonEvent),
    MouseWheel(MouseWheelEvent),
    Proximity(ProximityEvent),
    JoyAxis(JoyAxisEvent),
    JoyBall(JoyBallEvent),
    JoyHat(JoyHatEvent),
    JoyButton(JoyButtonEvent),
    User(UserEvent),
}

impl Event {
    /// The type code used for queue filtering and enable/disable state.
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Quit => EventType::QUIT,
            Self::Window(_) => EventType::WINDOW,
            Self::SysWm(_) => EventType::SYS_WM,
            Self::Key(k) => match k.state {
                ButtonState::Pressed => EventType::KEY_DOWN,
                ButtonState::Released => EventType::KEY_UP,
            },
            Self::TextEditing(_) => EventType::TEXT_EDITING,
            Self::TextInput(_) => EventType::TEXT_INPUT,
            Self::MouseMotion(_) => EventType::MOUSE_MOTION,
            Self::MouseButton(b) => match b.state {
                ButtonState::Pressed => EventType::MOUSE_BUTTON_DOWN,
                ButtonState::Released => EventType::MOUSE_BUTTON_UP,
            },
            Self::MouseWheel(_) => EventType::MOUSE_WHEEL,
            Self::Proximity(p) => {
                if p.entered {
                    EventType::PROXIMITY_IN
                } else {
                    EventType::PROXIMITY_OUT
                }
            }
            Self::JoyAxis(_) => EventType::JOY_AXIS_MOTION,
            Self::JoyBall(_) => EventType::JOY_BALL_MOTION,
            Self::JoyHat(_) => EventType::JOY_HAT_MOTION,
            Self::JoyButton(b) => match b.state {
                ButtonState::Pressed => EventType::JOY_BUTTON_DOWN,
                ButtonState::Released => EventType::JOY_BUTTON_UP,
            },
            Self::User(u) => u.event_type,
        }
    }

    /// Shorthand for a user event with no payload words.
    pub fn user(event_type: EventType, code: i32) -> Self {
        Self::User(UserEvent::new(event_type, code))
    }

    pub fn key_down(keycode: u32, modifiers: KeyMod) -> Self {
        Self::Key(KeyboardEvent::new(0, keycode, modifiers, ButtonState::Pressed))
    }

    pub fn key_up(keycode: u32, modifiers: KeyMod) -> Self {
        Self::Key(KeyboardEvent::new(0, keycode, modifiers, ButtonState::Released))
    }

    pub fn sys_wm(msg: SysWmMsg) -> Self {
        Self::SysWm(SysWmEvent::new(msg))
    }

    pub fn is_quit(&self) -> bool {
        matches!(self, Self::Quit)
    }
}

// =============================================================================
// Tests
// =============================================================================
