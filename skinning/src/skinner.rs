//! Vertex skinner
//!
//! Selects the blend implementation once (from [`SkinningConfig`]) and
//! applies it to whole vertex streams. Deformation is a pure function of the
//! inputs, so large meshes are split into chunks and processed in parallel
//! when the `parallel` feature is enabled.

use glam::{Mat4, Vec3, Vec4};
use rigkit_shared::{BlendPath, SkinningConfig};
use tracing::warn;

use crate::blend::blend_scalar;
use crate::error::SkinError;
use crate::simd::{blend_simd, has_intrinsics};

#[cfg(feature = "parallel")]
const PARALLEL_CHUNK: usize = 1024;

/// Bind-pose vertex data for one mesh.
#[derive(Clone, Copy, Debug)]
pub struct SkinningInput<'a> {
    pub positions: &'a [Vec3],
    /// Empty if the mesh has no normals
    pub normals: &'a [Vec3],
    /// Packed (joint.weight) lanes, already scrubbed
    pub weights: &'a [Vec4],
}

/// Deformed vertex data, same lengths as the input.
#[derive(Debug)]
pub struct SkinningOutput<'a> {
    pub positions: &'a mut [Vec3],
    pub normals: &'a mut [Vec3],
}

/// Implementation chosen for per-vertex blending.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendImpl {
    Scalar,
    Simd,
}

/// Per-vertex blender bound to one configuration.
#[derive(Clone, Debug)]
pub struct VertexSkinner {
    blend_impl: BlendImpl,
    handle_bad_scale: bool,
    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    parallel_min_vertices: usize,
}

impl Default for VertexSkinner {
    fn default() -> Self {
        Self::from_config(&SkinningConfig::default())
    }
}

impl VertexSkinner {
    /// `Auto` picks SIMD only on targets with intrinsics and only when
    /// degenerate weights need no handling; the vector path has no fallback.
    pub fn from_config(config: &SkinningConfig) -> Self {
        let blend_impl = match config.blend_path {
            BlendPath::Scalar => BlendImpl::Scalar,
            BlendPath::Simd => {
                if config.handle_bad_scale {
                    warn!("SIMD blend path ignores handle_bad_scale; weights must be scrubbed");
                }
                BlendImpl::Simd
            }
            BlendPath::Auto if has_intrinsics() && !config.handle_bad_scale => BlendImpl::Simd,
            BlendPath::Auto => BlendImpl::Scalar,
        };

        Self {
            blend_impl,
            handle_bad_scale: config.handle_bad_scale,
            parallel_min_vertices: config.parallel_min_vertices,
        }
    }

    pub fn blend_impl(&self) -> BlendImpl {
        self.blend_impl
    }

    /// Blended transform for one vertex.
    #[inline]
    pub fn blend(&self, weights: Vec4, palette: &[Mat4], joint_count: usize) -> Mat4 {
        match self.blend_impl {
            BlendImpl::Scalar => {
                blend_scalar(weights, palette, joint_count, self.handle_bad_scale).matrix
            }
            BlendImpl::Simd => blend_simd(weights, palette, joint_count),
        }
    }

    /// Blended transform for every vertex in `weights`.
    pub fn blend_all(
        &self,
        weights: &[Vec4],
        palette: &[Mat4],
        joint_count: usize,
        out: &mut [Mat4],
    ) -> Result<(), SkinError> {
        check_len("matrix output", weights.len(), out.len())?;
        for (matrix, &w) in out.iter_mut().zip(weights) {
            *matrix = self.blend(w, palette, joint_count);
        }
        Ok(())
    }

    /// Deform positions and normals by their blended joint transforms.
    ///
    /// Normals are transformed as directions and renormalized.
    pub fn skin_vertices(
        &self,
        input: SkinningInput<'_>,
        palette: &[Mat4],
        joint_count: usize,
        output: SkinningOutput<'_>,
    ) -> Result<(), SkinError> {
        let vertex_count = input.positions.len();
        check_len("weight", vertex_count, input.weights.len())?;
        check_len("position output", vertex_count, output.positions.len())?;
        if !input.normals.is_empty() {
            check_len("normal", vertex_count, input.normals.len())?;
        }
        check_len("normal output", input.normals.len(), output.normals.len())?;

        #[cfg(feature = "parallel")]
        {
            if vertex_count >= self.parallel_min_vertices {
                self.skin_parallel(input, palette, joint_count, output);
                return Ok(());
            }
        }

        self.skin_range(input, palette, joint_count, output);
        Ok(())
    }

    fn skin_range(
        &self,
        input: SkinningInput<'_>,
        palette: &[Mat4],
        joint_count: usize,
        output: SkinningOutput<'_>,
    ) {
        let has_normals = !input.normals.is_empty();
        for (i, (out_pos, &pos)) in output.positions.iter_mut().zip(input.positions).enumerate() {
            let matrix = self.blend(input.weights[i], palette, joint_count);
            *out_pos = matrix.transform_point3(pos);
            if has_normals {
                output.normals[i] = matrix.transform_vector3(input.normals[i]).normalize_or_zero();
            }
        }
    }

    #[cfg(feature = "parallel")]
    fn skin_parallel(
        &self,
        input: SkinningInput<'_>,
        palette: &[Mat4],
        joint_count: usize,
        output: SkinningOutput<'_>,
    ) {
        use rayon::prelude::*;

        let chunk_input = move |chunk: usize| {
            let start = chunk * PARALLEL_CHUNK;
            let end = (start + PARALLEL_CHUNK).min(input.positions.len());
            SkinningInput {
                positions: &input.positions[start..end],
                normals: if input.normals.is_empty() {
                    &[]
                } else {
                    &input.normals[start..end]
                },
                weights: &input.weights[start..end],
            }
        };

        if input.normals.is_empty() {
            output
                .positions
                .par_chunks_mut(PARALLEL_CHUNK)
                .enumerate()
                .for_each(|(chunk, positions)| {
                    let output = SkinningOutput {
                        positions,
                        normals: &mut [],
                    };
                    self.skin_range(chunk_input(chunk), palette, joint_count, output);
                });
        } else {
            output
                .positions
                .par_chunks_mut(PARALLEL_CHUNK)
                .zip(output.normals.par_chunks_mut(PARALLEL_CHUNK))
                .enumerate()
                .for_each(|(chunk, (positions, normals))| {
                    let output = SkinningOutput { positions, normals };
                    self.skin_range(chunk_input(chunk), palette, joint_count, output);
                });
        }
    }
}

fn check_len(buffer: &'static str, expected: usize, actual: usize) -> Result<(), SkinError> {
    if expected == actual {
        Ok(())
    } else {
        Err(SkinError::BufferLength {
            buffer,
            expected,
            actual,
        })
    }
}
