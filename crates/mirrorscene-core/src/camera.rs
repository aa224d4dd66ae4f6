//! Scripted camera path and projection.

use glam::{Mat4, Quat, Vec3};

use crate::config::CameraConfig;

/// Rotates `point` about the vertical axis through `pivot`.
#[must_use]
pub fn rotate_about_y(point: Vec3, pivot: Vec3, angle: f32) -> Vec3 {
    pivot + Quat::from_rotation_y(angle) * (point - pivot)
}

/// Rotates `point` about the Z-parallel axis through `pivot`.
#[must_use]
pub fn rotate_about_z(point: Vec3, pivot: Vec3, angle: f32) -> Vec3 {
    pivot + Quat::from_rotation_z(angle) * (point - pivot)
}

/// A camera that orbits a pivot on a fixed path.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// Position at time zero.
    pub base: Vec3,
    /// Orbit pivot.
    pub pivot: Vec3,
    /// Radians per second.
    pub speed: f32,
    /// Look-at target.
    pub target: Vec3,
    /// Up vector.
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Horizontal stretch applied to the screen aspect.
    pub aspect_stretch: f32,
}

impl OrbitCamera {
    /// Creates the camera described by `config`.
    #[must_use]
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            base: config.orbit_base,
            pivot: config.orbit_pivot,
            speed: config.orbit_speed,
            target: config.target,
            up: config.up,
            fov_y: config.fov_y,
            near: config.near,
            far: config.far,
            aspect_stretch: config.aspect_stretch,
        }
    }

    /// Camera position `time` seconds into the run.
    #[must_use]
    pub fn position_at(&self, time: f32) -> Vec3 {
        rotate_about_y(self.base, self.pivot, time * self.speed)
    }

    /// View matrix for an eye at `position`.
    #[must_use]
    pub fn view_matrix(&self, position: Vec3) -> Mat4 {
        Mat4::look_at_rh(position, self.target, self.up)
    }

    /// Aspect ratio used by the projection.
    #[must_use]
    pub fn aspect_ratio(&self, width: u32, height: u32) -> f32 {
        self.aspect_stretch * width as f32 / height.max(1) as f32
    }

    /// Returns the projection matrix.
    #[must_use]
    pub fn projection_matrix(&self, width: u32, height: u32) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y,
            self.aspect_ratio(width, height),
            self.near,
            self.far,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_at_zero_is_base() {
        let cam = OrbitCamera::new(&CameraConfig::default());
        assert!((cam.position_at(0.0) - Vec3::new(0.0, 1.0, 5.0)).length() < 1e-6);
    }

    #[test]
    fn test_orbit_keeps_distance_to_pivot_and_height() {
        let cam = OrbitCamera::new(&CameraConfig::default());
        let r0 = (cam.base - cam.pivot).length();
        for i in 0..20 {
            let p = cam.position_at(i as f32 * 0.37);
            assert!(((p - cam.pivot).length() - r0).abs() < 1e-4);
            assert!((p.y - cam.base.y).abs() < 1e-5);
        }
    }

    #[test]
    fn test_rotate_about_y_quarter_turn() {
        // Right-handed: +Z rotates onto +X after a quarter turn.
        let p = rotate_about_y(Vec3::new(0.0, 2.0, 1.0), Vec3::ZERO, std::f32::consts::FRAC_PI_2);
        assert!((p - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_rotate_about_z_with_pivot() {
        let p = rotate_about_z(Vec3::new(2.0, 1.0, 3.0), Vec3::new(1.0, 1.0, 0.0), std::f32::consts::PI);
        assert!((p - Vec3::new(0.0, 1.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn test_aspect_ratio_is_stretched() {
        let cam = OrbitCamera::new(&CameraConfig::default());
        assert!((cam.aspect_ratio(800, 400) - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_view_matrix_maps_target_onto_view_axis() {
        let cam = OrbitCamera::new(&CameraConfig::default());
        let eye = cam.position_at(1.0);
        let v = cam.view_matrix(eye).transform_point3(cam.target);
        assert!(v.x.abs() < 1e-5 && v.y.abs() < 1e-5);
        assert!(v.z < 0.0);
    }
}
