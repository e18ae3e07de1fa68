//! Skinning error types

use thiserror::Error;

/// Errors raised while building skin data or validating buffers.
///
/// The per-frame paths (`build_palette`, blending) never return these; they
/// repair or fall back instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkinError {
    #[error("Skin has no joints")]
    EmptySkin,

    #[error("Skin has {joints} joint names but {matrices} inverse bind matrices")]
    LengthMismatch { joints: usize, matrices: usize },

    #[error("Joint '{0}' already exists in skeleton")]
    DuplicateJoint(String),

    #[error("Joint index {0} is not part of the skeleton")]
    UnknownJoint(u32),

    #[error("Vertex {vertex}: influence {influence} references joint {joint}, but the skin has {joint_count} joints")]
    JointIndexOutOfRange {
        vertex: usize,
        influence: usize,
        joint: i64,
        joint_count: usize,
    },

    #[error("Vertex {vertex}: influence weights sum to {sum}, expected a positive value")]
    DegenerateWeights { vertex: usize, sum: f32 },

    #[error("{buffer} buffer has {actual} entries, expected {expected}")]
    BufferLength {
        buffer: &'static str,
        expected: usize,
        actual: usize,
    },
}
