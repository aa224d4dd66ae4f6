//! Per-frame scene state.

use glam::{Mat4, Vec3};

use crate::camera::OrbitCamera;
use crate::config::{MirrorConfig, ObjectConfig, SceneConfig, ShadowConfig};
use crate::lights::LightRig;

/// Composite matrices derived during a frame.
///
/// Each field is rebuilt from its inputs by the pass that uses it; nothing
/// here is carried over incrementally from a previous frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMatrices {
    pub view_projection: Mat4,
    pub model_view: Mat4,
    pub model_view_projection: Mat4,
    pub skybox_view_projection_inverse: Mat4,
    pub light_view_projection: Mat4,
    pub light_model_view_projection: Mat4,
    pub mirror_model_view_projection: Mat4,
    pub reflection: Mat4,
}

impl Default for FrameMatrices {
    fn default() -> Self {
        Self {
            view_projection: Mat4::IDENTITY,
            model_view: Mat4::IDENTITY,
            model_view_projection: Mat4::IDENTITY,
            skybox_view_projection_inverse: Mat4::IDENTITY,
            light_view_projection: Mat4::IDENTITY,
            light_model_view_projection: Mat4::IDENTITY,
            mirror_model_view_projection: Mat4::IDENTITY,
            reflection: Mat4::IDENTITY,
        }
    }
}

/// Everything the render passes read, recomputed from elapsed time.
///
/// Owned by the frame driver and handed to the orchestrator each frame;
/// passes share data only through this struct.
#[derive(Debug, Clone)]
pub struct FrameContext {
    camera: OrbitCamera,
    lights: LightRig,
    object: ObjectConfig,
    mirror: MirrorConfig,
    shadow: ShadowConfig,
    screen: (u32, u32),

    /// Seconds since the start of the run.
    pub time: f32,
    pub camera_position: Vec3,
    pub view: Mat4,
    pub projection: Mat4,
    pub model: Mat4,
    pub mirror_model: Mat4,
    /// Object-space mirror normal fed to the reflection builder.
    pub mirror_normal: Vec3,
    pub light_view: Mat4,
    pub light_projection: Mat4,
    /// Light positions, one `vec4` per light.
    pub light_positions: Vec<[f32; 4]>,
    /// Light colors, one `vec4` per light.
    pub light_colors: Vec<[f32; 4]>,
    /// Composites written by the passes.
    pub matrices: FrameMatrices,
}

impl FrameContext {
    /// Creates the context for a screen of `config.width` x `config.height`
    /// and computes the state at time zero.
    #[must_use]
    pub fn new(config: &SceneConfig) -> Self {
        let mut ctx = Self {
            camera: OrbitCamera::new(&config.camera),
            lights: LightRig::new(&config.lights),
            object: config.object.clone(),
            mirror: config.mirror.clone(),
            shadow: config.shadow.clone(),
            screen: (config.width, config.height),
            time: 0.0,
            camera_position: Vec3::ZERO,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            model: Mat4::IDENTITY,
            mirror_model: Mat4::IDENTITY,
            mirror_normal: config.mirror.normal,
            light_view: Mat4::IDENTITY,
            light_projection: Mat4::IDENTITY,
            light_positions: Vec::with_capacity(config.light_count()),
            light_colors: Vec::with_capacity(config.light_count()),
            matrices: FrameMatrices::default(),
        };
        ctx.update(0.0);
        ctx
    }

    /// The camera path.
    #[must_use]
    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    /// The light rig.
    #[must_use]
    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    /// Screen size the projection is built for.
    #[must_use]
    pub fn screen_size(&self) -> (u32, u32) {
        self.screen
    }

    /// Rebuilds the projection for the size the screen target actually got.
    pub fn set_screen_size(&mut self, (width, height): (u32, u32)) {
        self.screen = (width, height);
        self.projection = self.camera.projection_matrix(width, height);
    }

    /// Recomputes camera, lights and model transforms for `elapsed_ms`
    /// milliseconds into the run.
    pub fn update(&mut self, elapsed_ms: f64) {
        let time = (elapsed_ms / 1000.0) as f32;
        self.time = time;

        let (width, height) = self.screen;
        self.projection = self.camera.projection_matrix(width, height);
        self.camera_position = self.camera.position_at(time);
        self.view = self.camera.view_matrix(self.camera_position);

        self.lights.update(time);
        self.lights.pack_positions(&mut self.light_positions);
        self.lights.pack_colors(&mut self.light_colors);

        self.model = Mat4::from_rotation_x(time * self.object.spin_x)
            * Mat4::from_rotation_z(time * self.object.spin_z)
            * Mat4::from_scale(Vec3::splat(self.object.scale));

        self.mirror_model = Mat4::from_rotation_y(time * self.mirror.spin_speed)
            * Mat4::from_translation(self.mirror.offset)
            * Mat4::from_scale(Vec3::splat(self.mirror.scale));

        self.light_view = shadow_light_view(self.shadow.light_position, self.shadow.target);
        self.light_projection = Mat4::perspective_rh(
            self.shadow.fov_y,
            1.0,
            self.shadow.near,
            self.shadow.far,
        );
    }
}

/// Look-at from the shadow light toward `target`, with an up vector that is
/// never parallel to the viewing direction.
#[must_use]
pub fn shadow_light_view(light_position: Vec3, target: Vec3) -> Mat4 {
    let dir = (target - light_position).normalize_or_zero();
    let up = if dir.y.abs() > 0.99 { Vec3::Z } else { Vec3::Y };
    Mat4::look_at_rh(light_position, target, up)
}
