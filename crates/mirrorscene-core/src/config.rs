//! Scene configuration.
//!
//! Every field defaults to the constants of the stock demo scene, so an empty
//! JSON object (`{}`) is a valid config file.

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneError};

/// Top-level scene configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Window (screen target) width in pixels.
    pub width: u32,
    /// Window (screen target) height in pixels.
    pub height: u32,
    /// Clear color of every color target.
    pub clear_color: Vec3,
    /// Directory holding `nx.png` .. `pz.png` and `texture.jpg`.
    /// When unset, procedurally generated images are used.
    pub assets_dir: Option<PathBuf>,
    /// Camera path and projection.
    pub camera: CameraConfig,
    /// The lit sphere.
    pub object: ObjectConfig,
    /// Point lights.
    pub lights: LightsConfig,
    /// Shadow caster.
    pub shadow: ShadowConfig,
    /// Mirror plane.
    pub mirror: MirrorConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            clear_color: Vec3::ZERO,
            assets_dir: None,
            camera: CameraConfig::default(),
            object: ObjectConfig::default(),
            lights: LightsConfig::default(),
            shadow: ShadowConfig::default(),
            mirror: MirrorConfig::default(),
        }
    }
}

/// Orbital camera path and perspective projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Horizontal stretch applied to `width / height`.
    pub aspect_stretch: f32,
    /// Camera position at time zero.
    pub orbit_base: Vec3,
    /// Point the camera orbits around (about the Y axis).
    pub orbit_pivot: Vec3,
    /// Orbit speed in radians per second.
    pub orbit_speed: f32,
    /// Look-at target.
    pub target: Vec3,
    /// Up vector for the look-at.
    pub up: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y: std::f32::consts::PI / 2.5,
            near: 0.1,
            far: 100.0,
            aspect_stretch: 2.0,
            orbit_base: Vec3::new(0.0, 1.0, 5.0),
            orbit_pivot: Vec3::new(1.0, 4.0, 4.0),
            orbit_speed: 0.55,
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }
}

/// Material and animation of the lit sphere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectConfig {
    /// Surface color.
    pub base_color: Vec3,
    /// Ambient light color.
    pub ambient_color: Vec3,
    /// Uniform scale of the unit sphere.
    pub scale: f32,
    /// Spin about X in radians per second.
    pub spin_x: f32,
    /// Spin about Z in radians per second.
    pub spin_z: f32,
    /// Latitude bands of the generated sphere.
    pub rings: u32,
    /// Longitude segments of the generated sphere.
    pub segments: u32,
}

impl Default for ObjectConfig {
    fn default() -> Self {
        Self {
            base_color: Vec3::new(0.2, 1.0, 1.0),
            ambient_color: Vec3::new(0.8, 0.0, 0.4),
            scale: 0.5,
            spin_x: 0.0,
            spin_z: 0.0,
            rings: 32,
            segments: 64,
        }
    }
}

/// A single point light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLightConfig {
    /// Light color (RGB).
    pub color: Vec3,
    /// Position at time zero.
    pub position: Vec3,
}

/// The point light rig.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightsConfig {
    /// Rotation speed about the world Z axis, radians per second.
    pub orbit_speed: f32,
    /// Lights in shader order. The count is baked into the object shader.
    pub points: Vec<PointLightConfig>,
}

impl Default for LightsConfig {
    fn default() -> Self {
        Self {
            orbit_speed: 1.0,
            points: vec![
                PointLightConfig {
                    color: Vec3::new(1.0, 1.0, 1.0),
                    position: Vec3::new(5.0, 0.0, 2.0),
                },
                PointLightConfig {
                    color: Vec3::new(0.9, 0.0, 0.3),
                    position: Vec3::new(-5.0, 0.0, 2.0),
                },
            ],
        }
    }
}

/// Shadow map and the light it is rendered from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    /// Width and height of the square shadow depth target.
    pub resolution: u32,
    /// Position of the shadow-casting light.
    pub light_position: Vec3,
    /// Point the shadow light looks at.
    pub target: Vec3,
    /// Vertical field of view of the light projection, radians.
    pub fov_y: f32,
    /// Near plane of the light projection.
    pub near: f32,
    /// Far plane of the light projection.
    pub far: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            resolution: 1000,
            light_position: Vec3::new(0.0, 1.0, 1.0),
            target: Vec3::ZERO,
            fov_y: std::f32::consts::FRAC_PI_2,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// Mirror plane placement and reflection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Translation applied after the spin.
    pub offset: Vec3,
    /// Uniform scale of the unit quad.
    pub scale: f32,
    /// Spin about Y in radians per second.
    pub spin_speed: f32,
    /// Object-space surface normal.
    pub normal: Vec3,
    /// Reflection target size relative to the screen, in (0, 1].
    pub reflection_scale: f32,
    /// Horizontal ripple strength of the distortion lookup.
    pub distortion_strength: f32,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            offset: Vec3::new(0.0, -1.0, 0.0),
            scale: 3.0,
            spin_speed: 1.0,
            normal: Vec3::Y,
            reflection_scale: 0.2,
            distortion_strength: 0.03,
        }
    }
}

impl SceneConfig {
    /// Loads a config from a JSON file and validates it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        log::info!("loaded scene config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Serializes the config as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of point lights, fixed for the lifetime of a renderer.
    pub fn light_count(&self) -> usize {
        self.lights.points.len()
    }

    /// Checks value ranges that would otherwise produce unusable GPU resources.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SceneError::InvalidConfig(format!(
                "screen size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.lights.points.is_empty() {
            return Err(SceneError::InvalidConfig(
                "at least one point light is required".into(),
            ));
        }
        if self.shadow.resolution == 0 {
            return Err(SceneError::InvalidConfig(
                "shadow resolution must be non-zero".into(),
            ));
        }
        let scale = self.mirror.reflection_scale;
        if !(scale > 0.0 && scale <= 1.0) {
            return Err(SceneError::InvalidConfig(format!(
                "reflection scale must be in (0, 1], got {scale}"
            )));
        }
        for (name, near, far) in [
            ("camera", self.camera.near, self.camera.far),
            ("shadow", self.shadow.near, self.shadow.far),
        ] {
            if !(near > 0.0 && far > near) {
                return Err(SceneError::InvalidConfig(format!(
                    "{name} clip planes must satisfy 0 < near < far, got {near}..{far}"
                )));
            }
        }
        if self.object.rings < 2 || self.object.segments < 3 {
            return Err(SceneError::InvalidConfig(
                "sphere needs at least 2 rings and 3 segments".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SceneConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.light_count(), 2);
        assert_eq!(config.shadow.resolution, 1000);
        assert_eq!(config.mirror.reflection_scale, 0.2);
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: SceneConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn test_partial_json_overrides() {
        let json = r#"{ "width": 640, "mirror": { "distortion_strength": 0.1 } }"#;
        let config: SceneConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.width, 640);
        assert_eq!(config.height, 720);
        assert_eq!(config.mirror.distortion_strength, 0.1);
        assert_eq!(config.mirror.scale, 3.0);
    }

    #[test]
    fn test_json_roundtrip_keeps_lights() {
        let config = SceneConfig::default();
        let json = config.to_json().unwrap();
        let back: SceneConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.lights, config.lights);
    }

    #[test]
    fn test_validate_rejects_no_lights() {
        let mut config = SceneConfig::default();
        config.lights.points.clear();
        assert!(matches!(
            config.validate(),
            Err(SceneError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_reflection_scale() {
        let mut config = SceneConfig::default();
        config.mirror.reflection_scale = 0.0;
        assert!(config.validate().is_err());
        config.mirror.reflection_scale = 1.5;
        assert!(config.validate().is_err());
        config.mirror.reflection_scale = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_clip_planes() {
        let mut config = SceneConfig::default();
        config.camera.near = 10.0;
        config.camera.far = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = SceneConfig::load("/nonexistent/mirrorscene.json");
        assert!(matches!(result, Err(SceneError::IoError(_))));
    }
}
