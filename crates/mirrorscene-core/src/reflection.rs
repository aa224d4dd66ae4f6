//! Planar reflection utilities.

use glam::{Mat3, Mat4, Vec3, Vec4};

/// Returns the normal-correcting matrix of a model matrix: the inverse
/// transpose of its upper-left 3x3 block.
#[must_use]
pub fn normal_matrix(model: Mat4) -> Mat3 {
    Mat3::from_mat4(model).inverse().transpose()
}

/// Builds the reflection across the plane `{x : n·x + d = 0}`.
///
/// `n` must be unit length.
#[must_use]
pub fn plane_reflection(n: Vec3, d: f32) -> Mat4 {
    // | 1-2nx²   -2nxny   -2nxnz   -2nxd |
    // | -2nxny   1-2ny²   -2nynz   -2nyd |
    // | -2nxnz   -2nynz   1-2nz²   -2nzd |
    // |    0        0        0       1   |
    Mat4::from_cols(
        Vec4::new(1.0 - 2.0 * n.x * n.x, -2.0 * n.x * n.y, -2.0 * n.x * n.z, 0.0),
        Vec4::new(-2.0 * n.x * n.y, 1.0 - 2.0 * n.y * n.y, -2.0 * n.y * n.z, 0.0),
        Vec4::new(-2.0 * n.x * n.z, -2.0 * n.y * n.z, 1.0 - 2.0 * n.z * n.z, 0.0),
        Vec4::new(-2.0 * n.x * d, -2.0 * n.y * d, -2.0 * n.z * d, 1.0),
    )
}

/// Computes a reflection matrix for a plane given by a point on it and its
/// world-space normal.
#[must_use]
pub fn reflection_matrix(plane_point: Vec3, plane_normal: Vec3) -> Mat4 {
    let n = plane_normal.normalize();
    plane_reflection(n, -plane_point.dot(n))
}

/// Computes the reflection across a mirror surface.
///
/// `model` places the mirror in the world and `surface_normal` is the mirror's
/// normal in object space. The normal is carried to world space with the
/// normal matrix so non-uniform scale does not tilt the plane; the plane
/// passes through the mirror's origin (the translation column of `model`).
///
/// A zero-length normal produces NaN entries.
#[must_use]
pub fn surface_reflection_matrix(model: Mat4, surface_normal: Vec3) -> Mat4 {
    let world_normal = (normal_matrix(model) * surface_normal).normalize();
    let origin = model.w_axis.truncate();
    plane_reflection(world_normal, -world_normal.dot(origin))
}
