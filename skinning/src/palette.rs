//! Joint matrix palette
//!
//! Each frame the palette maps bind-pose vertices into the current pose:
//! `palette[j] = world(j) * inverse_bind(j)`, i.e. the inverse bind matrix is
//! applied first and the joint's world transform second.

use glam::Mat4;
use rigkit_shared::{JointMatrix3x4, MAX_JOINT_COUNT};
use tracing::warn;

use crate::skeleton::SkeletonView;
use crate::skin::SkinDefinition;

/// Fill `palette[..joint_count]` from the skeleton's current pose.
///
/// `joint_count` is clamped to the skin's joint count and to the palette
/// length; the number of entries written is returned. Joint lookups are
/// cached on the skin, so after the first frame only indices are used.
/// A joint that cannot be resolved (which scrubbing should have prevented)
/// gets its inverse bind matrix unchanged and is reported once per skin.
pub fn build_palette<S: SkeletonView + ?Sized>(
    skin: &mut SkinDefinition,
    skeleton: &S,
    palette: &mut [Mat4],
    joint_count: usize,
) -> usize {
    let count = joint_count.min(skin.joint_count()).min(palette.len());

    for j in 0..count {
        let inverse_bind = skin.inverse_bind_matrices()[j];
        palette[j] = match skin.resolve_joint(j, skeleton) {
            Some(joint) => skeleton.world_matrix(joint) * inverse_bind,
            None => {
                if skin.take_unresolved_report() {
                    warn!(
                        joint = %skin.joint_names()[j],
                        scrubbed = skin.is_scrubbed(),
                        "Rigged to invalid joint name"
                    );
                }
                inverse_bind
            }
        };
    }

    count
}

/// Pack palette matrices into 3x4 rows for upload.
///
/// Clears `out` and reuses its allocation.
pub fn pack_palette_3x4(palette: &[Mat4], out: &mut Vec<JointMatrix3x4>) {
    out.clear();
    out.extend(
        palette
            .iter()
            .map(|m| JointMatrix3x4::from_cols_array(&m.to_cols_array())),
    );
}

/// Fixed-capacity palette storage owned by one skinned mesh.
///
/// Allocates once at construction; [`rebuild`](Self::rebuild) never allocates.
#[derive(Clone, Debug)]
pub struct MatrixPalette {
    matrices: Vec<Mat4>,
    len: usize,
}

impl MatrixPalette {
    /// Palette able to hold `capacity` joints (clamped to [`MAX_JOINT_COUNT`]).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            matrices: vec![Mat4::IDENTITY; capacity.min(MAX_JOINT_COUNT)],
            len: 0,
        }
    }

    /// Recompute every joint of `skin` from the current pose.
    pub fn rebuild<S: SkeletonView + ?Sized>(
        &mut self,
        skin: &mut SkinDefinition,
        skeleton: &S,
    ) -> &[Mat4] {
        let joint_count = skin.joint_count();
        self.len = build_palette(skin, skeleton, &mut self.matrices, joint_count);
        &self.matrices[..self.len]
    }

    pub fn as_slice(&self) -> &[Mat4] {
        &self.matrices[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.matrices.len()
    }
}

impl Default for MatrixPalette {
    fn default() -> Self {
        Self::with_capacity(MAX_JOINT_COUNT)
    }
}
