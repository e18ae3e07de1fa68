//! Error types for the particle slot allocator

use rigkit_shared::{MAX_SLOT_CAPACITY, SLOTS_PER_WORD};
use thiserror::Error;

/// Errors from constructing an allocator or returning slots to it.
///
/// Running out of slots is not an error; `find_available_slots` signals
/// it by returning `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    #[error(
        "slot capacity must be a positive multiple of {word} up to {max}, got {0}",
        word = SLOTS_PER_WORD,
        max = MAX_SLOT_CAPACITY
    )]
    InvalidCapacity(u32),

    #[error("slots {start}..{end} are not fully allocated")]
    NotAllocated { start: u32, end: u32 },

    #[error("slot range from generation {range} released in generation {current}")]
    StaleGeneration { range: u32, current: u32 },
}
