//! Type State Table - which event types are currently disabled.
//!
//! A sparse bitset over the 16-bit type space: 256 lazily allocated blocks
//! (indexed by the high byte of the code), each a 256-bit mask (indexed by
//! the low byte). A missing block means every type in that range is enabled.
//! Codes above `0xFFFF` alias onto their low 16 bits.
//!
//! The table lives inside the queue mutex, so a disable and the flush of
//! already queued events of that type happen atomically.

use tracing::warn;

use crate::types::EventType;

const BLOCK_COUNT: usize = 256;
const BLOCK_WORDS: usize = 256 / 32;

/// Current state of an event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventState {
    Enabled,
    Disabled,
}

impl EventState {
    pub fn is_enabled(self) -> bool {
        self == Self::Enabled
    }

    pub fn is_disabled(self) -> bool {
        self == Self::Disabled
    }
}

/// What `EventLoop::set_type_state` should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateRequest {
    /// Return the current state, change nothing.
    Query,
    Enable,
    /// Drop future events of this type and purge queued ones.
    Disable,
}

#[derive(Debug)]
pub struct TypeStateTable {
    blocks: Vec<Option<Box<[u32]>>>,
}

impl TypeStateTable {
    pub fn new() -> Self {
        let mut blocks = Vec::with_capacity(BLOCK_COUNT);
        blocks.resize_with(BLOCK_COUNT, || None);
        Self { blocks }
    }

    #[inline]
    fn split(ty: EventType) -> (usize, usize, u32) {
        let hi = ((ty.code() >> 8) & 0xff) as usize;
        let lo = (ty.code() & 0xff) as usize;
        (hi, lo / 32, 1u32 << (lo & 31))
    }

    /// Whether `a` and `b` share one entry in the table.
    ///
    /// Codes above `0xFFFF` alias onto their low 16 bits, so disabling one
    /// also disables every code it aliases with.
    #[inline]
    pub fn aliases(a: EventType, b: EventType) -> bool {
        a.code() & 0xffff == b.code() & 0xffff
    }

    pub fn state(&self, ty: EventType) -> EventState {
        let (hi, word, bit) = Self::split(ty);
        match &self.blocks[hi] {
            Some(block) if block[word] & bit != 0 => EventState::Disabled,
            _ => EventState::Enabled,
        }
    }

    #[inline]
    pub fn is_disabled(&self, ty: EventType) -> bool {
        self.state(ty) == EventState::Disabled
    }

    /// Mark `ty` disabled.
    ///
    /// Returns false if the block could not be allocated; the type then
    /// stays enabled.
    pub fn disable(&mut self, ty: EventType) -> bool {
        let (hi, word, bit) = Self::split(ty);
        if self.blocks[hi].is_none() {
            match alloc_block() {
                Some(block) => self.blocks[hi] = Some(block),
                None => {
                    warn!("out of memory disabling event type {}", ty);
                    return false;
                }
            }
        }
        if let Some(block) = self.blocks[hi].as_mut() {
            block[word] |= bit;
        }
        true
    }

    pub fn enable(&mut self, ty: EventType) {
        let (hi, word, bit) = Self::split(ty);
        if let Some(block) = self.blocks[hi].as_mut() {
            block[word] &= !bit;
        }
    }

    /// Whether any type in `first..=last` is enabled.
    pub fn any_enabled(&self, first: EventType, last: EventType) -> bool {
        (first.code()..=last.code()).any(|code| !self.is_disabled(EventType(code)))
    }

    /// Free every block, re-enabling all types.
    pub fn clear(&mut self) {
        self.blocks.iter_mut().for_each(|block| *block = None);
    }

    pub fn allocated_blocks(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_some()).count()
    }
}

impl Default for TypeStateTable {
    fn default() -> Self {
        Self::new()
    }
}

fn alloc_block() -> Option<Box<[u32]>> {
    let mut words = Vec::new();
    words.try_reserve_exact(BLOCK_WORDS).ok()?;
    words.resize(BLOCK_WORDS, 0u32);
    Some(words.into_boxed_slice())
}
