//! Terminal source - crossterm input turned into [`Event`] records.
//!
//! Bridges crossterm's event stream with the event queue. Conversion is
//! pure (apart from the source's pointer bookkeeping) and unit tested;
//! only [`TerminalSource::pump`] touches the terminal.
//!
//! # API
//!
//! - `convert_key_event` - crossterm key to a `KeyboardEvent`
//! - `convert_modifiers` - crossterm modifier flags to `KeyMod`
//! - `TerminalSource::translate` - one crossterm event to queue events
//! - `enable_mouse_capture` / `disable_mouse_capture` - mouse reporting
//!
//! # Mapping
//!
//! | crossterm            | queued                                        |
//! |----------------------|-----------------------------------------------|
//! | `Key`                | `Key` (+ `TextInput` for plain chars,         |
//! |                      | + `Quit` for Ctrl+C)                          |
//! | `Mouse` down / up    | `MouseButton`                                 |
//! | `Mouse` drag / moved | `MouseMotion` with held buttons and deltas    |
//! | `Mouse` scroll       | `MouseWheel`                                  |
//! | `Resize`             | `Window(Resized)`                             |
//! | `FocusGained/Lost`   | `Window(FocusGained/FocusLost)`               |
//! | `Paste`              | `TextInput`, one per `TEXT_SIZE` bytes        |
//!
//! # Example
//!
//! ```ignore
//! use spark_events::{EventLoop, input::{TerminalSource, enable_mouse_capture}};
//!
//! enable_mouse_capture()?;
//! let event_loop = EventLoop::default().with_source(TerminalSource::new());
//! event_loop.start(true)?;
//! ```

use std::io::stdout;
use std::time::Duration;

use crossterm::event::{
    self as ct, DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyCode,
    KeyEvent as CrosstermKeyEvent, KeyEventKind, KeyEventState, KeyModifiers,
    MouseButton as CrosstermMouseButton, MouseEvent as CrosstermMouseEvent, MouseEventKind,
};
use crossterm::execute;
use tracing::warn;

use crate::event::{
    Event, KeyboardEvent, MouseButton, MouseButtonEvent, MouseMotionEvent, MouseWheelEvent,
    TextInputEvent, WindowEvent, WindowEventId,
};
use crate::input::keycode;
use crate::pipeline::source::{EventSink, EventSource};
use crate::types::{ButtonState, InlineText, KeyMod, MAX_EVENTS, MouseButtons};

// =============================================================================
// KEY CONVERSION
// =============================================================================

/// Convert crossterm KeyModifiers (plus lock state) to `KeyMod`.
pub fn convert_modifiers(mods: KeyModifiers, state: KeyEventState) -> KeyMod {
    let mut out = KeyMod::NONE;
    if mods.contains(KeyModifiers::SHIFT) {
        out |= KeyMod::SHIFT;
    }
    if mods.contains(KeyModifiers::CONTROL) {
        out |= KeyMod::CTRL;
    }
    if mods.contains(KeyModifiers::ALT) {
        out |= KeyMod::ALT;
    }
    if mods.intersects(KeyModifiers::SUPER | KeyModifiers::META) {
        out |= KeyMod::META;
    }
    if state.contains(KeyEventState::CAPS_LOCK) {
        out |= KeyMod::CAPS;
    }
    if state.contains(KeyEventState::NUM_LOCK) {
        out |= KeyMod::NUM;
    }
    out
}

fn convert_key_code(code: KeyCode) -> Option<u32> {
    let key = match code {
        KeyCode::Char(c) if c.is_ascii_uppercase() => c.to_ascii_lowercase() as u32,
        KeyCode::Char(c) => c as u32,
        KeyCode::Enter => keycode::RETURN,
        KeyCode::Tab | KeyCode::BackTab => keycode::TAB,
        KeyCode::Backspace => keycode::BACKSPACE,
        KeyCode::Delete => keycode::DELETE,
        KeyCode::Esc => keycode::ESCAPE,
        KeyCode::Up => keycode::UP,
        KeyCode::Down => keycode::DOWN,
        KeyCode::Left => keycode::LEFT,
        KeyCode::Right => keycode::RIGHT,
        KeyCode::Home => keycode::HOME,
        KeyCode::End => keycode::END,
        KeyCode::PageUp => keycode::PAGE_UP,
        KeyCode::PageDown => keycode::PAGE_DOWN,
        KeyCode::Insert => keycode::INSERT,
        KeyCode::F(n) => return keycode::function(n),
        _ => return None,
    };
    Some(key)
}

/// Convert a crossterm KeyEvent. `None` for keys with no key code.
pub fn convert_key_event(event: CrosstermKeyEvent, window_id: u32) -> Option<KeyboardEvent> {
    let keycode = convert_key_code(event.code)?;
    let mut modifiers = convert_modifiers(event.modifiers, event.state);
    if event.code == KeyCode::BackTab {
        modifiers |= KeyMod::SHIFT;
    }

    let (state, repeat) = match event.kind {
        KeyEventKind::Press => (ButtonState::Pressed, false),
        KeyEventKind::Repeat => (ButtonState::Pressed, true),
        KeyEventKind::Release => (ButtonState::Released, false),
    };

    let mut key = KeyboardEvent::new(window_id, keycode, modifiers, state);
    key.repeat = repeat;
    Some(key)
}

fn convert_mouse_button(btn: CrosstermMouseButton) -> MouseButton {
    match btn {
        CrosstermMouseButton::Left => MouseButton::Left,
        CrosstermMouseButton::Right => MouseButton::Right,
        CrosstermMouseButton::Middle => MouseButton::Middle,
    }
}

/// Split text into `InlineText` chunks on char boundaries.
fn text_chunks(text: &str) -> impl Iterator<Item = InlineText> + '_ {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let chunk = InlineText::new(rest);
        if chunk.is_empty() {
            return None;
        }
        rest = &rest[chunk.len()..];
        Some(chunk)
    })
}

// =============================================================================
// TERMINAL SOURCE
// =============================================================================

/// Event source reading the controlling terminal through crossterm.
///
/// Tracks held mouse buttons and the last pointer position so motion events
/// carry a button mask and relative deltas.
#[derive(Debug, Default)]
pub struct TerminalSource {
    window_id: u32,
    held: MouseButtons,
    last_pos: Option<(i32, i32)>,
}

impl TerminalSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Window id stamped on every event (0 by default).
    pub fn with_window_id(mut self, window_id: u32) -> Self {
        self.window_id = window_id;
        self
    }

    pub fn held_buttons(&self) -> MouseButtons {
        self.held
    }

    /// Turn one crossterm event into zero or more queue events.
    pub fn translate(&mut self, event: CrosstermEvent) -> Vec<Event> {
        match event {
            CrosstermEvent::Key(key) => self.translate_key(key),
            CrosstermEvent::Mouse(mouse) => vec![self.translate_mouse(mouse)],
            CrosstermEvent::Resize(w, h) => vec![Event::Window(WindowEvent::resized(
                self.window_id,
                w as i32,
                h as i32,
            ))],
            CrosstermEvent::FocusGained => vec![Event::Window(WindowEvent::new(
                self.window_id,
                WindowEventId::FocusGained,
            ))],
            CrosstermEvent::FocusLost => vec![Event::Window(WindowEvent::new(
                self.window_id,
                WindowEventId::FocusLost,
            ))],
            CrosstermEvent::Paste(text) => text_chunks(&text)
                .map(|chunk| {
                    Event::TextInput(TextInputEvent { window_id: self.window_id, which: 0, text: chunk })
                })
                .collect(),
        }
    }

    fn translate_key(&self, key: CrosstermKeyEvent) -> Vec<Event> {
        let Some(converted) = convert_key_event(key, self.window_id) else {
            return Vec::new();
        };
        let mut out = vec![Event::Key(converted)];

        if converted.state.is_pressed() {
            if let KeyCode::Char(c) = key.code {
                if converted.modifiers.contains(KeyMod::CTRL) && c.eq_ignore_ascii_case(&'c') {
                    out.push(Event::Quit);
                } else if !converted.modifiers.intersects(KeyMod::CTRL | KeyMod::ALT | KeyMod::META) {
                    let mut buf = [0u8; 4];
                    out.push(Event::TextInput(TextInputEvent::new(
                        self.window_id,
                        c.encode_utf8(&mut buf),
                    )));
                }
            }
        }
        out
    }

    fn translate_mouse(&mut self, mouse: CrosstermMouseEvent) -> Event {
        let window_id = self.window_id;
        let x = mouse.column as i32;
        let y = mouse.row as i32;
        let (last_x, last_y) = self.last_pos.unwrap_or((x, y));
        self.last_pos = Some((x, y));

        let button_event = |button: MouseButton, state: ButtonState| {
            Event::MouseButton(MouseButtonEvent { window_id, which: 0, button, state, x, y })
        };
        let wheel = |dx: i32, dy: i32| {
            Event::MouseWheel(MouseWheelEvent { window_id, which: 0, x: dx, y: dy })
        };

        match mouse.kind {
            MouseEventKind::Down(btn) => {
                let button = convert_mouse_button(btn);
                self.held |= button.mask();
                button_event(button, ButtonState::Pressed)
            }
            MouseEventKind::Up(btn) => {
                let button = convert_mouse_button(btn);
                self.held.remove(button.mask());
                button_event(button, ButtonState::Released)
            }
            MouseEventKind::Drag(btn) => {
                self.held |= convert_mouse_button(btn).mask();
                self.motion(x, y, x - last_x, y - last_y)
            }
            MouseEventKind::Moved => self.motion(x, y, x - last_x, y - last_y),
            MouseEventKind::ScrollUp => wheel(0, 1),
            MouseEventKind::ScrollDown => wheel(0, -1),
            MouseEventKind::ScrollLeft => wheel(-1, 0),
            MouseEventKind::ScrollRight => wheel(1, 0),
        }
    }

    fn motion(&self, x: i32, y: i32, xrel: i32, yrel: i32) -> Event {
        Event::MouseMotion(MouseMotionEvent {
            window_id: self.window_id,
            buttons: self.held,
            x,
            y,
            xrel,
            yrel,
            ..Default::default()
        })
    }
}

impl EventSource for TerminalSource {
    /// Drain whatever the terminal has ready without blocking.
    fn pump(&mut self, sink: &EventSink<'_>) {
        for _ in 0..MAX_EVENTS {
            match ct::poll(Duration::ZERO) {
                Ok(true) => {}
                Ok(false) => return,
                Err(err) => {
                    warn!("terminal poll failed: {}", err);
                    return;
                }
            }
            let raw = match ct::read() {
                Ok(raw) => raw,
                Err(err) => {
                    warn!("terminal read failed: {}", err);
                    return;
                }
            };
            for event in self.translate(raw) {
                if sink.push(event).is_err() {
                    return;
                }
            }
        }
    }
}

// =============================================================================
// MOUSE CAPTURE
// =============================================================================

/// Enable mouse reporting on the terminal.
pub fn enable_mouse_capture() -> std::io::Result<()> {
    execute!(stdout(), EnableMouseCapture)
}

/// Disable mouse reporting on the terminal.
pub fn disable_mouse_capture() -> std::io::Result<()> {
    execute!(stdout(), DisableMouseCapture)
}

// =============================================================================
// TESTS
// =============================================================================
