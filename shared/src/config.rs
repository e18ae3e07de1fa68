//! Configuration (`rigkit.toml`)
//!
//! Tunables for the skinning and particle crates. Every field has a default,
//! so an empty file (or a missing section) yields [`RigConfig::default`].
//!
//! ```toml
//! [skinning]
//! max_joint_count = 110
//! fallback_joint = "mPelvis"
//! handle_bad_scale = true
//! blend_path = "auto"
//! parallel_min_vertices = 4096
//!
//! [particles]
//! max_particle_count = 8192
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    FALLBACK_JOINT_NAME, MAX_JOINT_COUNT, MAX_PARTICLE_COUNT, MAX_SLOT_CAPACITY, SLOTS_PER_WORD,
};

/// Error type for loading and validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("max_joint_count must be between 1 and {max}, got {0}", max = MAX_JOINT_COUNT)]
    InvalidJointCount(usize),

    #[error(
        "max_particle_count must be a positive multiple of {word} up to {max}, got {0}",
        word = SLOTS_PER_WORD,
        max = MAX_SLOT_CAPACITY
    )]
    InvalidParticleCount(u32),

    #[error("fallback_joint must not be empty")]
    EmptyFallbackJoint,
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RigConfig {
    /// Skinning settings
    #[serde(default)]
    pub skinning: SkinningConfig,
    /// Particle slot pool settings
    #[serde(default)]
    pub particles: ParticleConfig,
}

/// Which per-vertex blend implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BlendPath {
    /// Pick the vectorized path when the target supports it
    #[default]
    Auto,
    /// Always use the scalar reference path
    Scalar,
    /// Always use the vectorized path (no degenerate-weight handling)
    Simd,
}

/// Skinning configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinningConfig {
    /// Joint ceiling per mesh (default: 110)
    #[serde(default = "default_max_joint_count")]
    pub max_joint_count: usize,
    /// Joint that unresolvable names are redirected to (default: mPelvis)
    #[serde(default = "default_fallback_joint")]
    pub fallback_joint: String,
    /// Fall back to full weight on the first joint when weights sum to zero (default: true)
    #[serde(default = "default_true")]
    pub handle_bad_scale: bool,
    /// Blend implementation (default: auto)
    #[serde(default)]
    pub blend_path: BlendPath,
    /// Vertex count at which deformation switches to the parallel path (default: 4096)
    #[serde(default = "default_parallel_min_vertices")]
    pub parallel_min_vertices: usize,
}

/// Particle slot pool configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleConfig {
    /// Total slots in the pool (default: 8192)
    #[serde(default = "default_max_particle_count")]
    pub max_particle_count: u32,
}

fn default_true() -> bool {
    true
}
fn default_max_joint_count() -> usize {
    MAX_JOINT_COUNT
}
fn default_fallback_joint() -> String {
    FALLBACK_JOINT_NAME.to_string()
}
fn default_parallel_min_vertices() -> usize {
    4096
}
fn default_max_particle_count() -> u32 {
    MAX_PARTICLE_COUNT
}

impl Default for SkinningConfig {
    fn default() -> Self {
        Self {
            max_joint_count: default_max_joint_count(),
            fallback_joint: default_fallback_joint(),
            handle_bad_scale: default_true(),
            blend_path: BlendPath::default(),
            parallel_min_vertices: default_parallel_min_vertices(),
        }
    }
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            max_particle_count: default_max_particle_count(),
        }
    }
}

impl RigConfig {
    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let joints = self.skinning.max_joint_count;
        if joints == 0 || joints > MAX_JOINT_COUNT {
            return Err(ConfigError::InvalidJointCount(joints));
        }
        if self.skinning.fallback_joint.is_empty() {
            return Err(ConfigError::EmptyFallbackJoint);
        }
        let particles = self.particles.max_particle_count;
        if particles == 0 || particles % SLOTS_PER_WORD != 0 || particles > MAX_SLOT_CAPACITY {
            return Err(ConfigError::InvalidParticleCount(particles));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = RigConfig::from_toml_str("").unwrap();
        assert_eq!(config, RigConfig::default());
        assert_eq!(config.skinning.max_joint_count, 110);
        assert_eq!(config.skinning.fallback_joint, "mPelvis");
        assert!(config.skinning.handle_bad_scale);
        assert_eq!(config.skinning.blend_path, BlendPath::Auto);
        assert_eq!(config.particles.max_particle_count, 8192);
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let config = RigConfig::from_toml_str(
            r#"
            [skinning]
            blend_path = "scalar"

            [particles]
            max_particle_count = 128
            "#,
        )
        .unwrap();
        assert_eq!(config.skinning.blend_path, BlendPath::Scalar);
        assert_eq!(config.skinning.max_joint_count, 110);
        assert_eq!(config.particles.max_particle_count, 128);
    }

    #[test]
    fn test_rejects_unaligned_particle_count() {
        let err = RigConfig::from_toml_str("[particles]\nmax_particle_count = 100\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParticleCount(100)));
    }

    #[test]
    fn test_rejects_particle_count_beyond_i32_range() {
        let err = RigConfig::from_toml_str("[particles]\nmax_particle_count = 4294967264\n")
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParticleCount(4_294_967_264)
        ));
    }

    #[test]
    fn test_rejects_joint_count_out_of_range() {
        let err = RigConfig::from_toml_str("[skinning]\nmax_joint_count = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidJointCount(0)));

        let err = RigConfig::from_toml_str("[skinning]\nmax_joint_count = 500\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidJointCount(500)));
    }

    #[test]
    fn test_rejects_bad_blend_path() {
        let err = RigConfig::from_toml_str("[skinning]\nblend_path = \"gpu\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[skinning]\nhandle_bad_scale = false").unwrap();

        let config = RigConfig::load(file.path()).unwrap();
        assert!(!config.skinning.handle_bad_scale);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RigConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let mut config = RigConfig::default();
        config.skinning.blend_path = BlendPath::Simd;
        let text = toml::to_string(&config).unwrap();
        assert!(text.contains("blend_path = \"simd\""));
        assert_eq!(RigConfig::from_toml_str(&text).unwrap(), config);
    }
}
