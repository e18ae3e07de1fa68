//! Vectorized blend path
//!
//! Same arithmetic as [`blend_scalar`](crate::blend::blend_scalar): split the
//! packed lanes into index and fraction, normalize by the lane sum, then
//! accumulate the weighted palette entries. Differences:
//!
//! - indices are truncated toward zero instead of floored (identical for the
//!   non-negative values scrubbing produces)
//! - weights are divided by the sum rather than multiplied by its reciprocal
//! - there is no degenerate-weight fallback; all-zero weights produce NaNs
//!
//! On x86_64 the lane work uses SSE2 intrinsics (always available on that
//! target). Other targets go through glam's `Vec4`, which maps to the
//! platform's vector unit where glam supports one.

use glam::{Mat4, Vec4};

/// Blend with vector instructions. Requires scrubbed weights.
///
/// An empty palette yields the identity.
#[inline]
pub fn blend_simd(weights: Vec4, palette: &[Mat4], joint_count: usize) -> Mat4 {
    let joint_count = joint_count.min(palette.len());
    if joint_count == 0 {
        return Mat4::IDENTITY;
    }

    let max_index = (joint_count - 1) as i32;
    let (joints, normalized) = normalize_lanes(weights, max_index);

    let mut matrix = Mat4::ZERO;
    for (joint, w) in joints.into_iter().zip(normalized) {
        matrix += palette[joint as usize] * w;
    }
    matrix
}

/// Whether [`blend_simd`] runs on hand-written intrinsics on this target.
pub const fn has_intrinsics() -> bool {
    cfg!(target_arch = "x86_64")
}

#[cfg(target_arch = "x86_64")]
#[inline]
fn normalize_lanes(weights: Vec4, max_index: i32) -> ([i32; 4], [f32; 4]) {
    use core::arch::x86_64::*;

    let lanes = weights.to_array();
    let mut joints = [0i32; 4];
    let mut normalized = [0.0f32; 4];

    // SAFETY: SSE2 is part of the x86_64 baseline; loads and stores go
    // through unaligned intrinsics on 4-element stack arrays.
    unsafe {
        let w = _mm_loadu_ps(lanes.as_ptr());
        let idx = _mm_cvttps_epi32(w);
        let frac = _mm_sub_ps(w, _mm_cvtepi32_ps(idx));

        // Clamp to [0, max_index] with compare/select (no SSE4.1 min/max)
        let max = _mm_set1_epi32(max_index);
        let over = _mm_cmpgt_epi32(idx, max);
        let idx = _mm_or_si128(_mm_and_si128(over, max), _mm_andnot_si128(over, idx));
        let under = _mm_cmplt_epi32(idx, _mm_setzero_si128());
        let idx = _mm_andnot_si128(under, idx);

        // Horizontal sum broadcast to all lanes
        let sum = _mm_add_ps(frac, _mm_movehl_ps(frac, frac));
        let sum = _mm_add_ss(sum, _mm_shuffle_ps(sum, sum, 0b01));
        let sum = _mm_shuffle_ps(sum, sum, 0b00);

        let weight = _mm_div_ps(frac, sum);

        _mm_storeu_si128(joints.as_mut_ptr().cast::<__m128i>(), idx);
        _mm_storeu_ps(normalized.as_mut_ptr(), weight);
    }

    (joints, normalized)
}

#[cfg(not(target_arch = "x86_64"))]
#[inline]
fn normalize_lanes(weights: Vec4, max_index: i32) -> ([i32; 4], [f32; 4]) {
    use glam::IVec4;

    let whole = weights.trunc();
    let frac = weights - whole;
    let joints = whole
        .as_ivec4()
        .clamp(IVec4::ZERO, IVec4::splat(max_index));
    let normalized = frac / Vec4::splat(frac.element_sum());
    (joints.to_array(), normalized.to_array())
}
