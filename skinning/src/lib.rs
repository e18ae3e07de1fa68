//! Rigkit Skinning - joint palettes and linear blend skinning
//!
//! Deforms bind-pose mesh vertices by a posed skeleton. Work is split in two
//! phases:
//!
//! - **Load time**: build a [`SkinDefinition`], redirect joints the skeleton
//!   does not know with [`SkinDefinition::scrub_invalid_joints`], and clamp
//!   vertex weights with [`scrub_skin_weights`].
//! - **Per frame**: rebuild the [`MatrixPalette`] from the current pose and
//!   run [`VertexSkinner::skin_vertices`] over the mesh.
//!
//! # Modules
//!
//! - [`skeleton`] - [`SkeletonView`] trait and a flat [`Skeleton`]
//! - [`skin`] - Skin definitions and joint scrubbing
//! - [`weights`] - Packed `joint.weight` lanes
//! - [`palette`] - Per-frame joint matrix palette
//! - [`blend`] / [`simd`] - Scalar and vectorized per-vertex blending
//! - [`skinner`] - Whole-mesh deformation
//!
//! ```
//! use glam::{Mat4, Vec3};
//! use rigkit_skinning::{
//!     JointKey, MatrixPalette, Skeleton, SkinDefinition, VertexSkinner, pack_weights,
//! };
//!
//! let mut skeleton = Skeleton::new();
//! skeleton.add_joint("mPelvis", Mat4::IDENTITY).unwrap();
//! skeleton.add_joint("mHip", Mat4::IDENTITY).unwrap();
//!
//! let mut skin = SkinDefinition::new(
//!     vec![JointKey::new("mPelvis"), JointKey::new("mHip")],
//!     vec![Mat4::IDENTITY, Mat4::from_translation(Vec3::X)],
//! )
//! .unwrap();
//! skin.scrub_invalid_joints(&skeleton);
//!
//! let mut palette = MatrixPalette::default();
//! let matrices = palette.rebuild(&mut skin, &skeleton);
//!
//! let weights = pack_weights([(0, 0.5), (1, 0.5), (0, 0.0), (0, 0.0)]);
//! let blended = VertexSkinner::default().blend(weights, matrices, skin.joint_count());
//! let p = blended.transform_point3(Vec3::ZERO);
//! assert!(p.abs_diff_eq(Vec3::new(0.5, 0.0, 0.0), 1e-5));
//! ```

pub mod blend;
pub mod error;
pub mod palette;
pub mod simd;
pub mod skeleton;
pub mod skin;
pub mod skinner;
pub mod weights;

pub use blend::{BlendedMatrix, blend_scalar};
pub use error::SkinError;
pub use palette::{MatrixPalette, build_palette, pack_palette_3x4};
pub use simd::{blend_simd, has_intrinsics};
pub use skeleton::{JointHandle, Skeleton, SkeletonView};
pub use skin::{JointSlot, SkinDefinition};
pub use skinner::{BlendImpl, SkinningInput, SkinningOutput, VertexSkinner};
pub use weights::{
    JointInfluences, check_skin_weights, decompose_weights, pack_weights, scrub_skin_weights,
};

// Shared types used throughout the public API
pub use rigkit_shared::{JointKey, SkinningConfig};
