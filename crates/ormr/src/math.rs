//! Math types and glam re-exports.
//!
//! We re-export [glam](https://docs.rs/glam) types so users don't need to
//! depend on it directly. The helpers here cover the two conversions the
//! object model needs everywhere: composing a local TRS into a matrix, and
//! moving vectors/matrices in and out of their flat serialized form.

pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

/// Compose a local matrix from position, rotation and scale.
///
/// The rotation is a quaternion stored as `(x, y, z, w)`. It is normalized
/// before use so slightly drifted values still produce a rigid rotation.
pub fn compose(position: Vec3, rotation: Vec4, scale: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, quat_from_vec4(rotation), position)
}

/// Interpret a `Vec4` as an `(x, y, z, w)` quaternion.
///
/// A zero-length vector yields the identity rotation.
pub fn quat_from_vec4(v: Vec4) -> Quat {
    let q = Quat::from_xyzw(v.x, v.y, v.z, v.w);
    if q.length_squared() <= f32::EPSILON {
        Quat::IDENTITY
    } else {
        q.normalize()
    }
}

/// The `(x, y, z, w)` components of a quaternion.
pub fn vec4_from_quat(q: Quat) -> Vec4 {
    Vec4::new(q.x, q.y, q.z, q.w)
}

/// Flatten a matrix to 16 floats in row-major order.
///
/// glam stores matrices column-major, so the transpose's columns are the
/// original's rows.
pub fn mat4_to_row_major(m: &Mat4) -> [f32; 16] {
    m.transpose().to_cols_array()
}

/// Inverse of [`mat4_to_row_major`].
pub fn mat4_from_row_major(values: &[f32; 16]) -> Mat4 {
    Mat4::from_cols_array(values).transpose()
}

/// The identity quaternion as a `Vec4`.
pub const IDENTITY_ROTATION: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);
