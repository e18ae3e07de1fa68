//! Shared types for the rigkit skinning and particle crates.
//!
//! Kept free of math-library dependencies so that asset tools and
//! runtimes can agree on joint identifiers, limits and configuration
//! without pulling in glam.
//!
//! # Modules
//!
//! - [`constants`] - Platform limits (joint ceiling, particle capacity, fallback joint)
//! - [`joint`] - [`JointKey`] joint identifiers with a hashed fast-lookup key
//! - [`math`] - POD matrix types for GPU upload
//! - [`config`] - TOML configuration (`[skinning]` and `[particles]` sections)

pub mod config;
pub mod constants;
pub mod joint;
pub mod math;

pub use config::{BlendPath, ConfigError, ParticleConfig, RigConfig, SkinningConfig};
pub use constants::{
    FALLBACK_JOINT_NAME, MAX_JOINT_COUNT, MAX_PARTICLE_COUNT, MAX_SLOT_CAPACITY, SLOTS_PER_WORD,
};
pub use joint::JointKey;
pub use math::JointMatrix3x4;
