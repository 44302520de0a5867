//! Conversions from scene conventions to glam
//!
//! Scenes store doubles, Euler angles in degrees, and matrices row-major with
//! row vectors (translation in the last row). The baker works in glam's f32
//! column-vector convention, so matrices are transposed on the way in and
//! products read right-to-left.

use glam::{Mat4, Vec2, Vec3};

use crate::scene::TransformComponents;

#[inline]
pub fn vec3_from_scene(v: [f64; 3]) -> Vec3 {
    Vec3::new(v[0] as f32, v[1] as f32, v[2] as f32)
}

#[inline]
pub fn vec2_from_scene(v: [f64; 2]) -> Vec2 {
    Vec2::new(v[0] as f32, v[1] as f32)
}

/// Convert a scene matrix (row-major, row vectors) to glam
///
/// Each scene row becomes a glam column, which is exactly the transpose the
/// change of vector convention requires.
pub fn mat4_from_scene(m: &[[f64; 4]; 4]) -> Mat4 {
    let mut cols = [[0.0f32; 4]; 4];
    for (col, row) in cols.iter_mut().zip(m) {
        for (dst, src) in col.iter_mut().zip(row) {
            *dst = *src as f32;
        }
    }
    Mat4::from_cols_array_2d(&cols)
}

/// Compose scale, XYZ Euler rotation and translation
///
/// In row-vector notation this is `S × Rx × Ry × Rz × T`: scale first, then
/// rotate about X, Y, Z in that order, then translate.
pub fn compose_xyz(c: &TransformComponents) -> Mat4 {
    let rotation = Mat4::from_rotation_z(c.rotation.z.to_radians())
        * Mat4::from_rotation_y(c.rotation.y.to_radians())
        * Mat4::from_rotation_x(c.rotation.x.to_radians());
    Mat4::from_translation(c.translation) * rotation * Mat4::from_scale(c.scaling)
}

/// Flip a texture coordinate's V axis (`v' = 1 - v`)
#[inline]
pub fn flip_v(uv: Vec2) -> Vec2 {
    Vec2::new(uv.x, 1.0 - uv.y)
}
