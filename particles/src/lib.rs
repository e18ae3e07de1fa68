//! Rigkit Particles - slot allocation for particle vertex buffers
//!
//! [`ParticleSlotAllocator`] owns a bitmap over a fixed pool of slots and
//! hands out contiguous, word-aligned runs of them. Each particle system asks
//! for its slots when it starts and returns them with
//! [`ParticleSlotAllocator::release`] (or all at once with
//! [`ParticleSlotAllocator::reset`]).
//!
//! ```
//! use rigkit_particles::ParticleSlotAllocator;
//!
//! let mut slots = ParticleSlotAllocator::new(128).unwrap();
//! let range = slots.find_available_slots(10).unwrap();
//! assert_eq!((range.start, range.end), (0, 10));
//! assert_eq!(slots.total_allocated(), 10);
//! ```

pub mod error;
pub mod slots;

pub use error::SlotError;
pub use slots::{ParticleSlotAllocator, SlotRange};
