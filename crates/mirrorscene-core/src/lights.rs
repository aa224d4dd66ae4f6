//! Animated point lights.

use glam::Vec3;

use crate::camera::rotate_about_z;
use crate::config::LightsConfig;

/// A point light with a fixed color and an animated position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    /// Light color (RGB), never changes.
    pub color: Vec3,
    /// Position at time zero.
    pub initial_position: Vec3,
    /// Position for the current frame.
    pub position: Vec3,
}

/// Fixed-size set of point lights orbiting the world Z axis.
///
/// The number of lights is fixed at construction because it is compiled into
/// the object shader.
#[derive(Debug, Clone)]
pub struct LightRig {
    lights: Vec<PointLight>,
    orbit_speed: f32,
}

impl LightRig {
    /// Builds the rig described by `config`.
    #[must_use]
    pub fn new(config: &LightsConfig) -> Self {
        let lights = config
            .points
            .iter()
            .map(|p| PointLight {
                color: p.color,
                initial_position: p.position,
                position: p.position,
            })
            .collect();
        Self {
            lights,
            orbit_speed: config.orbit_speed,
        }
    }

    /// Number of lights.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    /// Whether the rig has no lights.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// The lights in shader order.
    #[must_use]
    pub fn lights(&self) -> &[PointLight] {
        &self.lights
    }

    /// Moves every light to its position `time` seconds into the run.
    pub fn update(&mut self, time: f32) {
        let angle = time * self.orbit_speed;
        for light in &mut self.lights {
            light.position = rotate_about_z(light.initial_position, Vec3::ZERO, angle);
        }
    }

    /// Packs positions into `out`, one `vec4` row per light (w = 1).
    pub fn pack_positions(&self, out: &mut Vec<[f32; 4]>) {
        out.clear();
        out.extend(self.lights.iter().map(|l| l.position.extend(1.0).to_array()));
    }

    /// Packs colors into `out`, one `vec4` row per light (w = 0).
    pub fn pack_colors(&self, out: &mut Vec<[f32; 4]>) {
        out.clear();
        out.extend(self.lights.iter().map(|l| l.color.extend(0.0).to_array()));
    }
}
