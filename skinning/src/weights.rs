//! Packed vertex weights
//!
//! Each vertex stores four influences packed into a `Vec4`: the integer part
//! of a lane is the joint index, the fractional part is the (unnormalized)
//! weight. `2.25` means joint 2 with weight 0.25.
//!
//! Content is cleaned once at load time by [`scrub_skin_weights`] so the
//! per-frame blend can assume in-range indices.

use glam::Vec4;
use tracing::warn;

use crate::error::SkinError;

/// Four decoded influences of one vertex.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JointInfluences {
    /// Joint index per influence, clamped to the skin's joint range
    pub joints: [usize; 4],
    /// Fractional weight per influence (not normalized)
    pub weights: [f32; 4],
}

impl JointInfluences {
    /// Sum of the four weights
    #[inline]
    pub fn scale(&self) -> f32 {
        self.weights.iter().sum()
    }
}

/// Pack `(joint, weight)` pairs into the per-vertex lane format.
///
/// Weights must lie in `[0, 1)`; larger values would spill into the index.
pub fn pack_weights(influences: [(usize, f32); 4]) -> Vec4 {
    Vec4::from_array(influences.map(|(joint, weight)| joint as f32 + weight))
}

#[inline]
fn max_joint_index(joint_count: usize) -> i64 {
    joint_count.saturating_sub(1) as i64
}

/// Split packed lanes into clamped joint indices and fractional weights.
#[inline]
pub fn decompose_weights(packed: Vec4, joint_count: usize) -> JointInfluences {
    let max_index = max_joint_index(joint_count);
    let mut joints = [0usize; 4];
    let mut weights = [0.0f32; 4];

    for (k, w) in packed.to_array().into_iter().enumerate() {
        let floor = w.floor();
        joints[k] = (floor as i64).clamp(0, max_index) as usize;
        weights[k] = w - floor;
    }

    JointInfluences { joints, weights }
}

/// Clamp every joint index into `[0, joint_count - 1]`, keeping the weight part.
///
/// Non-finite lanes are reset to joint 0 with weight 0. In debug builds the
/// scrubbed buffer is re-checked and problems that clamping cannot fix (all
/// weights zero) are logged.
pub fn scrub_skin_weights(weights: &mut [Vec4], joint_count: usize) {
    let max_index = max_joint_index(joint_count);

    for packed in weights.iter_mut() {
        let lanes = packed.to_array().map(|w| {
            if !w.is_finite() {
                return 0.0;
            }
            let floor = w.floor();
            let index = (floor as i64).clamp(0, max_index);
            index as f32 + (w - floor)
        });
        *packed = Vec4::from_array(lanes);
    }

    if cfg!(debug_assertions) {
        if let Err(err) = check_skin_weights(weights, joint_count) {
            warn!("Skin weights still invalid after scrub: {}", err);
        }
    }
}

/// Verify indices are in range and every vertex has a positive weight sum.
///
/// Reports the first offending vertex.
pub fn check_skin_weights(weights: &[Vec4], joint_count: usize) -> Result<(), SkinError> {
    for (vertex, packed) in weights.iter().enumerate() {
        let mut sum = 0.0;
        for (influence, w) in packed.to_array().into_iter().enumerate() {
            let index = w.floor();
            if !w.is_finite() || index < 0.0 || index as usize >= joint_count {
                return Err(SkinError::JointIndexOutOfRange {
                    vertex,
                    influence,
                    joint: index as i64,
                    joint_count,
                });
            }
            sum += w - index;
        }
        if sum <= 0.0 || sum.is_nan() {
            return Err(SkinError::DegenerateWeights { vertex, sum });
        }
    }
    Ok(())
}
