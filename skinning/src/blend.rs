//! Per-vertex linear blend skinning
//!
//! Combines up to four palette matrices, weighted by the vertex's normalized
//! influences, into one transform. The result is a weighted sum of matrices
//! (not a product): standard linear blend skinning.
//!
//! [`blend_scalar`] is the reference implementation and the only one that
//! handles all-zero weights. [`blend_simd`](crate::simd::blend_simd) performs
//! the same arithmetic with vector instructions and assumes scrubbed input.

use glam::{Mat4, Vec4};
use tracing::debug;

use crate::weights::decompose_weights;

/// Weights used when the influences of a vertex sum to zero.
const FALLBACK_WEIGHTS: [f32; 4] = [1.0, 0.0, 0.0, 0.0];

/// Blended transform of one vertex.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlendedMatrix {
    pub matrix: Mat4,
    /// False when the fallback weights replaced degenerate input
    pub valid_weights: bool,
}

/// Normalize the packed weights and sum the weighted palette entries.
///
/// Joint indices are clamped to `[0, joint_count - 1]` (and to the palette
/// length). With `handle_bad_scale`, a vertex whose weights sum to zero or
/// less takes its full transform from its first influence. An empty palette
/// yields the identity marked invalid.
pub fn blend_scalar(
    weights: Vec4,
    palette: &[Mat4],
    joint_count: usize,
    handle_bad_scale: bool,
) -> BlendedMatrix {
    let joint_count = joint_count.min(palette.len());
    if joint_count == 0 {
        return BlendedMatrix {
            matrix: Mat4::IDENTITY,
            valid_weights: false,
        };
    }

    let influences = decompose_weights(weights, joint_count);
    let scale = influences.scale();

    let (normalized, valid_weights) = if handle_bad_scale && scale <= 0.0 {
        debug!(scale, "Degenerate skin weights, using first influence only");
        (FALLBACK_WEIGHTS, false)
    } else {
        let inv_scale = 1.0 / scale;
        (influences.weights.map(|w| w * inv_scale), scale > 0.0)
    };

    let mut matrix = Mat4::ZERO;
    for (joint, w) in influences.joints.into_iter().zip(normalized) {
        matrix += palette[joint] * w;
    }

    BlendedMatrix {
        matrix,
        valid_weights,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::pack_weights;
    use glam::Vec3;

    fn palette() -> Vec<Mat4> {
        vec![
            Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)),
            Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)),
            Mat4::from_scale(Vec3::splat(3.0)),
        ]
    }

    #[test]
    fn test_single_influence_returns_palette_entry() {
        let palette = palette();
        for joint in 0..palette.len() {
            let weights = pack_weights([(joint, 0.5), (0, 0.0), (0, 0.0), (0, 0.0)]);
            let blended = blend_scalar(weights, &palette, palette.len(), true);
            assert!(blended.valid_weights);
            assert_eq!(blended.matrix, palette[joint]);
        }
    }

    #[test]
    fn test_weights_are_normalized() {
        let palette = vec![Mat4::IDENTITY; 3];
        // 0.2 + 0.3 + 0.1 = 0.6; the blend of identities must stay identity
        let weights = pack_weights([(0, 0.2), (1, 0.3), (2, 0.1), (0, 0.0)]);
        let blended = blend_scalar(weights, &palette, 3, true);
        assert!(blended.matrix.abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }

    #[test]
    fn test_degenerate_weights_fall_back_to_first_joint() {
        let palette = palette();
        let weights = Vec4::new(2.0, 1.0, 0.0, 0.0);
        let blended = blend_scalar(weights, &palette, palette.len(), true);
        assert!(!blended.valid_weights);
        assert_eq!(blended.matrix, palette[2]);
    }

    #[test]
    fn test_all_zero_lanes_fall_back_to_palette_zero() {
        let palette = palette();
        let blended = blend_scalar(Vec4::ZERO, &palette, palette.len(), true);
        assert!(!blended.valid_weights);
        assert_eq!(blended.matrix, palette[0]);
    }

    #[test]
    fn test_out_of_range_joint_uses_last_joint() {
        let palette = palette();
        let weights = pack_weights([(17, 0.5), (0, 0.0), (0, 0.0), (0, 0.0)]);
        let blended = blend_scalar(weights, &palette, palette.len(), true);
        assert_eq!(blended.matrix, palette[2]);
    }

    #[test]
    fn test_joint_count_limits_palette_access() {
        let palette = palette();
        // Joint 2 exists in the palette but lies outside joint_count = 2
        let weights = pack_weights([(2, 0.5), (0, 0.0), (0, 0.0), (0, 0.0)]);
        let blended = blend_scalar(weights, &palette, 2, true);
        assert_eq!(blended.matrix, palette[1]);
    }

    #[test]
    fn test_empty_palette_is_identity() {
        let blended = blend_scalar(Vec4::new(0.5, 0.0, 0.0, 0.0), &[], 4, true);
        assert!(!blended.valid_weights);
        assert_eq!(blended.matrix, Mat4::IDENTITY);
    }

    #[test]
    fn test_half_and_half_translation() {
        let palette = vec![Mat4::IDENTITY, Mat4::from_translation(Vec3::X)];
        let weights = pack_weights([(0, 0.5), (1, 0.5), (0, 0.0), (0, 0.0)]);
        let blended = blend_scalar(weights, &palette, 2, true);
        let moved = blended.matrix.transform_point3(Vec3::ZERO);
        assert!(moved.abs_diff_eq(Vec3::new(0.5, 0.0, 0.0), 1e-6));
    }
}
