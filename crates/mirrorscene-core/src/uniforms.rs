//! Uniform blocks of the four programs.
//!
//! Layouts follow WGSL uniform address-space rules: `mat3x3<f32>` occupies
//! three 16-byte columns and `vec3` values are stored as `vec4`.

use glam::{Mat3, Mat4, Vec3};

/// Converts a 3x3 matrix to padded WGSL `mat3x3<f32>` columns.
#[must_use]
pub fn mat3_to_padded_cols(m: Mat3) -> [[f32; 4]; 3] {
    [
        m.x_axis.extend(0.0).to_array(),
        m.y_axis.extend(0.0).to_array(),
        m.z_axis.extend(0.0).to_array(),
    ]
}

/// Shadow caster uniforms.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShadowUniforms {
    pub light_model_view_projection: [[f32; 4]; 4],
}

impl Default for ShadowUniforms {
    fn default() -> Self {
        Self {
            light_model_view_projection: Mat4::IDENTITY.to_cols_array_2d(),
        }
    }
}

/// Skybox uniforms.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SkyboxUniforms {
    pub view_projection_inverse: [[f32; 4]; 4],
}

impl Default for SkyboxUniforms {
    fn default() -> Self {
        Self {
            view_projection_inverse: Mat4::IDENTITY.to_cols_array_2d(),
        }
    }
}

/// Lit object uniforms. The light position and color arrays follow this
/// block in the same buffer, `NUM_LIGHTS` rows each.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniforms {
    pub model_view_projection: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub light_model_view_projection: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 3],
    pub camera_position: [f32; 4],
    pub base_color: [f32; 4],
    pub ambient_color: [f32; 4],
}

impl ObjectUniforms {
    /// Uniforms with identity transforms and the given material colors.
    #[must_use]
    pub fn new(base_color: Vec3, ambient_color: Vec3) -> Self {
        Self {
            model_view_projection: Mat4::IDENTITY.to_cols_array_2d(),
            model: Mat4::IDENTITY.to_cols_array_2d(),
            light_model_view_projection: Mat4::IDENTITY.to_cols_array_2d(),
            normal_matrix: mat3_to_padded_cols(Mat3::IDENTITY),
            camera_position: [0.0, 0.0, 0.0, 1.0],
            base_color: base_color.extend(1.0).to_array(),
            ambient_color: ambient_color.extend(1.0).to_array(),
        }
    }
}

/// Mirror composite uniforms.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(clippy::pub_underscore_fields)]
pub struct MirrorUniforms {
    pub model_view_projection: [[f32; 4]; 4],
    pub screen_size: [f32; 2],
    pub distortion_strength: f32,
    pub _padding: f32,
}

impl Default for MirrorUniforms {
    fn default() -> Self {
        Self {
            model_view_projection: Mat4::IDENTITY.to_cols_array_2d(),
            screen_size: [1.0, 1.0],
            distortion_strength: 0.03,
            _padding: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes() {
        // Ensure uniforms are correctly aligned for GPU
        assert_eq!(std::mem::size_of::<ShadowUniforms>(), 64);
        assert_eq!(std::mem::size_of::<SkyboxUniforms>(), 64);
        assert_eq!(std::mem::size_of::<MirrorUniforms>(), 64 + 8 + 4 + 4);
        assert_eq!(
            std::mem::size_of::<ObjectUniforms>(),
            3 * 64 + 48 + 3 * 16 // 3 mat4 + mat3 + 3 vec4
        );
        assert_eq!(std::mem::size_of::<ObjectUniforms>() % 16, 0);
    }

    #[test]
    fn test_mat3_padding() {
        let cols = mat3_to_padded_cols(Mat3::from_cols(Vec3::X, Vec3::Y * 2.0, Vec3::Z * 3.0));
        assert_eq!(cols[0], [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(cols[1], [0.0, 2.0, 0.0, 0.0]);
        assert_eq!(cols[2], [0.0, 0.0, 3.0, 0.0]);
    }

    #[test]
    fn test_object_uniforms_colors() {
        let u = ObjectUniforms::new(Vec3::new(0.2, 1.0, 1.0), Vec3::new(0.8, 0.0, 0.4));
        assert_eq!(u.base_color, [0.2, 1.0, 1.0, 1.0]);
        assert_eq!(u.ambient_color, [0.8, 0.0, 0.4, 1.0]);
    }
}
