//! Key codes carried by [`crate::KeyboardEvent::keycode`].
//!
//! Printable keys use their Unicode scalar (lower case for ASCII letters).
//! Keys without a character use their scancode with [`SCANCODE_MASK`] set,
//! so the two ranges never collide.

pub const SCANCODE_MASK: u32 = 1 << 30;

pub const fn from_scancode(scancode: u32) -> u32 {
    scancode | SCANCODE_MASK
}

pub const RETURN: u32 = '\r' as u32;
pub const ESCAPE: u32 = 0x1b;
pub const BACKSPACE: u32 = 0x08;
pub const TAB: u32 = '\t' as u32;
pub const SPACE: u32 = ' ' as u32;
pub const DELETE: u32 = 0x7f;

pub const F1: u32 = from_scancode(58);
pub const F12: u32 = from_scancode(69);
pub const F13: u32 = from_scancode(104);
pub const F24: u32 = from_scancode(115);

pub const INSERT: u32 = from_scancode(73);
pub const HOME: u32 = from_scancode(74);
pub const PAGE_UP: u32 = from_scancode(75);
pub const END: u32 = from_scancode(77);
pub const PAGE_DOWN: u32 = from_scancode(78);
pub const RIGHT: u32 = from_scancode(79);
pub const LEFT: u32 = from_scancode(80);
pub const DOWN: u32 = from_scancode(81);
pub const UP: u32 = from_scancode(82);

/// Function key `F<n>` for n in 1..=24.
pub const fn function(n: u8) -> Option<u32> {
    match n {
        1..=12 => Some(F1 + (n as u32 - 1)),
        13..=24 => Some(F13 + (n as u32 - 13)),
        _ => None,
    }
}
