//! Math types for model records
//!
//! Provides POD (Plain Old Data) math types that are serializable and
//! can be stored in model files without carrying glam types through serde.

use bitcode::{Decode, Encode};
use glam::Mat4;
use serde::{Deserialize, Serialize};

/// 4x4 transform matrix (column-major storage, POD type)
///
/// Columns follow glam's column-vector convention: the translation lives in
/// `cols[3]`. Use [`Matrix4::to_mat4`] / `From<Mat4>` to move between the
/// stored form and glam.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Encode, Decode)]
#[repr(C)]
pub struct Matrix4 {
    pub cols: [[f32; 4]; 4],
}

impl Matrix4 {
    /// Identity matrix (no transformation)
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Convert to a glam matrix
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.cols)
    }

    /// Flat column-major array for GPU upload
    pub fn to_array(&self) -> [f32; 16] {
        self.to_mat4().to_cols_array()
    }

    /// Translation component (last column)
    pub fn translation(&self) -> [f32; 3] {
        [self.cols[3][0], self.cols[3][1], self.cols[3][2]]
    }
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Mat4> for Matrix4 {
    fn from(m: Mat4) -> Self {
        Self {
            cols: m.to_cols_array_2d(),
        }
    }
}

impl From<Matrix4> for Mat4 {
    fn from(m: Matrix4) -> Self {
        m.to_mat4()
    }
}
