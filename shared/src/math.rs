//! POD matrix types for palette upload.
//!
//! Joint palettes are affine, so the GPU copy stores only the first three
//! rows of each 4x4 matrix. These types are glam-free; callers convert from
//! their math library through column-major `[f32; 16]` arrays.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// One palette entry as three rows of an affine transform.
///
/// Row `r` holds the `r`th row of the linear part followed by the `r`th
/// translation component, so the shader reconstructs the matrix with an
/// implicit `[0, 0, 0, 1]` bottom row. 48 bytes, no padding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct JointMatrix3x4 {
    pub row0: [f32; 4],
    pub row1: [f32; 4],
    pub row2: [f32; 4],
}

impl JointMatrix3x4 {
    pub const IDENTITY: Self = Self::from_scale(1.0, 1.0, 1.0);

    /// Bytes per packed matrix
    pub const SIZE: usize = 48;

    /// Axis-aligned scale with no translation.
    pub const fn from_scale(sx: f32, sy: f32, sz: f32) -> Self {
        Self {
            row0: [sx, 0.0, 0.0, 0.0],
            row1: [0.0, sy, 0.0, 0.0],
            row2: [0.0, 0.0, sz, 0.0],
        }
    }

    /// Create from a column-major 4x4 matrix, dropping the last row.
    pub fn from_cols_array(cols: &[f32; 16]) -> Self {
        Self {
            row0: [cols[0], cols[4], cols[8], cols[12]],
            row1: [cols[1], cols[5], cols[9], cols[13]],
            row2: [cols[2], cols[6], cols[10], cols[14]],
        }
    }

    /// Expand back to a column-major 4x4 matrix with last row [0, 0, 0, 1].
    pub fn to_cols_array(&self) -> [f32; 16] {
        [
            self.row0[0],
            self.row1[0],
            self.row2[0],
            0.0,
            self.row0[1],
            self.row1[1],
            self.row2[1],
            0.0,
            self.row0[2],
            self.row1[2],
            self.row2[2],
            0.0,
            self.row0[3],
            self.row1[3],
            self.row2[3],
            1.0,
        ]
    }

    /// Translation column
    pub fn translation(&self) -> [f32; 3] {
        [self.row0[3], self.row1[3], self.row2[3]]
    }
}
