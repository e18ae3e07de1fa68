//! Particle slot allocator
//!
//! Hands out contiguous runs of fixed-size slots from a capped pool.
//! Occupancy is a bitmap of 32-bit words, one bit per slot (1 = occupied).
//! Runs always start on a word boundary: a run of `n` slots covers `n / 32`
//! whole words plus the first `n % 32` slots of the word after them.
//!
//! Slot offset `b` within a word is bit `0x8000_0000 >> b`.

use rigkit_shared::{MAX_PARTICLE_COUNT, MAX_SLOT_CAPACITY, ParticleConfig, SLOTS_PER_WORD};
use tracing::{debug, trace};

use crate::error::SlotError;

const WORD_SLOTS: usize = SLOTS_PER_WORD as usize;

/// Mask covering the first `count` slots of a word (`count` in `0..=32`).
const fn leading_slots(count: u32) -> u32 {
    if count == 0 {
        0
    } else {
        u32::MAX << (SLOTS_PER_WORD - count)
    }
}

/// Occupancy mask for the last word of a run, indexed by `amount % 32`.
/// Entry 0 means the last word is used in full.
const TAIL_MASKS: [u32; WORD_SLOTS] = {
    let mut masks = [u32::MAX; WORD_SLOTS];
    let mut k = 1;
    while k < WORD_SLOTS {
        masks[k] = leading_slots(k as u32);
        k += 1;
    }
    masks
};

/// A run of slots returned by [`ParticleSlotAllocator::find_available_slots`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotRange {
    /// First slot (always a multiple of 32)
    pub start: u32,
    /// One past the last slot
    pub end: u32,
    /// Amount asked for, before clamping to the remaining capacity
    pub requested: u32,
    /// Allocator generation the range was issued in
    pub generation: u32,
}

impl SlotRange {
    /// Number of slots actually granted.
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if fewer slots were granted than requested.
    pub fn was_shrunk(&self) -> bool {
        self.len() < self.requested
    }
}

/// Bitmap free-list over a fixed pool of particle slots.
///
/// Not synchronized; a host sharing one allocator between threads must wrap
/// it in a lock, since a request is a scan followed by a commit.
#[derive(Clone, Debug)]
pub struct ParticleSlotAllocator {
    words: Vec<u32>,
    capacity: u32,
    total_allocated: u32,
    generation: u32,
}

impl Default for ParticleSlotAllocator {
    fn default() -> Self {
        Self::empty(MAX_PARTICLE_COUNT)
    }
}

impl ParticleSlotAllocator {
    /// Create an allocator with `capacity` slots, all free.
    ///
    /// `capacity` must be a positive multiple of 32 no larger than
    /// [`MAX_SLOT_CAPACITY`].
    pub fn new(capacity: u32) -> Result<Self, SlotError> {
        if capacity == 0 || capacity % SLOTS_PER_WORD != 0 || capacity > MAX_SLOT_CAPACITY {
            return Err(SlotError::InvalidCapacity(capacity));
        }
        Ok(Self::empty(capacity))
    }

    pub fn from_config(config: &ParticleConfig) -> Result<Self, SlotError> {
        Self::new(config.max_particle_count)
    }

    fn empty(capacity: u32) -> Self {
        Self {
            words: vec![0; (capacity / SLOTS_PER_WORD) as usize],
            capacity,
            total_allocated: 0,
            generation: 1,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn total_allocated(&self) -> u32 {
        self.total_allocated
    }

    /// Counter advanced by [`reset`](Self::reset); starts at 1.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn is_allocated(&self, slot: u32) -> bool {
        if slot >= self.capacity {
            return false;
        }
        let word = self.words[(slot / SLOTS_PER_WORD) as usize];
        word & (0x8000_0000 >> (slot % SLOTS_PER_WORD)) != 0
    }

    /// Reserve a contiguous run of `amount` slots.
    ///
    /// A request larger than the remaining capacity is shrunk to fit; check
    /// [`SlotRange::was_shrunk`] to detect this. Returns `None` when nothing
    /// can be granted or no free run is long enough. The bitmap is only
    /// modified on success.
    pub fn find_available_slots(&mut self, amount: u32) -> Option<SlotRange> {
        let granted = amount.min(self.capacity - self.total_allocated);
        if granted < amount {
            debug!(
                requested = amount,
                granted,
                "Particle slot request shrunk to remaining capacity"
            );
        }
        if granted == 0 {
            return None;
        }

        let run = granted.div_ceil(SLOTS_PER_WORD) as usize;
        let last_mask = TAIL_MASKS[(granted % SLOTS_PER_WORD) as usize];
        let Some(first) = self.find_free_run(run, last_mask) else {
            debug!(
                amount = granted,
                total_allocated = self.total_allocated,
                "No free run of particle slots"
            );
            return None;
        };

        let start = first as u32 * SLOTS_PER_WORD;
        let end = start + granted;
        for (word, mask) in word_masks(start, end) {
            self.words[word] |= mask;
        }
        self.total_allocated += granted;
        debug_assert_eq!(self.occupied(), self.total_allocated);

        trace!(start, end, total_allocated = self.total_allocated, "Allocated particle slots");
        Some(SlotRange {
            start,
            end,
            requested: amount,
            generation: self.generation,
        })
    }

    /// [`find_available_slots`](Self::find_available_slots) as a
    /// `(start, end, ok)` triple; failure is `(-1, -1, false)`.
    pub fn find_available_slots_raw(&mut self, amount: u32) -> (i32, i32, bool) {
        match self.find_available_slots(amount) {
            // Capacity is capped at MAX_SLOT_CAPACITY, so both ends fit
            Some(range) => (range.start as i32, range.end as i32, true),
            None => (-1, -1, false),
        }
    }

    /// Return a range to the pool.
    ///
    /// Every slot of the range must still be allocated, and the range must
    /// come from the current generation.
    pub fn release(&mut self, range: &SlotRange) -> Result<(), SlotError> {
        if range.generation != self.generation {
            return Err(SlotError::StaleGeneration {
                range: range.generation,
                current: self.generation,
            });
        }

        let fully_allocated = !range.is_empty()
            && range.end <= self.capacity
            && word_masks(range.start, range.end).all(|(word, mask)| self.words[word] & mask == mask);
        if !fully_allocated {
            return Err(SlotError::NotAllocated {
                start: range.start,
                end: range.end,
            });
        }

        for (word, mask) in word_masks(range.start, range.end) {
            self.words[word] &= !mask;
        }
        self.total_allocated -= range.len();
        debug_assert_eq!(self.occupied(), self.total_allocated);

        trace!(
            start = range.start,
            end = range.end,
            total_allocated = self.total_allocated,
            "Released particle slots"
        );
        Ok(())
    }

    /// Free every slot and start a new generation.
    ///
    /// Ranges issued before the reset can no longer be released.
    pub fn reset(&mut self) {
        self.words.fill(0);
        self.total_allocated = 0;
        self.generation = self.generation.wrapping_add(1);
        debug!(generation = self.generation, "Particle slot pool reset");
    }

    /// Index of the first word of a run of `run` words whose leading words
    /// are empty and whose last word is free under `last_mask`.
    fn find_free_run(&self, run: usize, last_mask: u32) -> Option<usize> {
        let mut first = 0;
        while first + run <= self.words.len() {
            let last = first + run - 1;
            match self.words[first..last].iter().position(|&w| w != 0) {
                // No run can start at or before an occupied interior word
                Some(busy) => first += busy + 1,
                None if self.words[last] & last_mask == 0 => return Some(first),
                None => first = last + 1,
            }
        }
        None
    }

    fn occupied(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }
}

/// Each word overlapping `start..end`, with the mask of its slots inside the range.
fn word_masks(start: u32, end: u32) -> impl Iterator<Item = (usize, u32)> {
    let first = start / SLOTS_PER_WORD;
    let last = end.div_ceil(SLOTS_PER_WORD);
    (first..last).map(move |word| {
        let base = word * SLOTS_PER_WORD;
        let lo = start.max(base) - base;
        let hi = end.min(base + SLOTS_PER_WORD) - base;
        (word as usize, leading_slots(hi) & !leading_slots(lo))
    })
}
