//! Centralized limits shared by the skinning and particle crates.

/// Maximum number of joints a single rigged mesh may reference.
///
/// Skin definitions with more joint names than this are still accepted,
/// but only the first `MAX_JOINT_COUNT` entries take part in skinning.
pub const MAX_JOINT_COUNT: usize = 110;

/// Default capacity of the particle vertex-buffer slot pool.
pub const MAX_PARTICLE_COUNT: u32 = 8192;

/// Number of slots tracked by one bitmap word.
pub const SLOTS_PER_WORD: u32 = 32;

/// Largest slot pool whose slot indices still fit the `i32` range triple.
pub const MAX_SLOT_CAPACITY: u32 = (i32::MAX as u32 / SLOTS_PER_WORD) * SLOTS_PER_WORD;

/// Joint that unresolvable joint names are redirected to.
pub const FALLBACK_JOINT_NAME: &str = "mPelvis";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particle_capacity_is_whole_words() {
        assert_eq!(MAX_PARTICLE_COUNT % SLOTS_PER_WORD, 0);
    }

    #[test]
    fn test_slot_capacity_fits_i32() {
        assert_eq!(MAX_SLOT_CAPACITY % SLOTS_PER_WORD, 0);
        assert!(i32::try_from(MAX_SLOT_CAPACITY).is_ok());
        assert!(MAX_PARTICLE_COUNT <= MAX_SLOT_CAPACITY);
    }
}
