//! Per-frame render pass sequencing.
//!
//! A frame is always the same four passes in the same order:
//! 1. shadow map (light's view, depth only)
//! 2. planar reflection (scene seen by the mirrored camera)
//! 3. main pass (skybox + lit sphere)
//! 4. mirror composite (quad sampling the reflection target)
//!
//! The two offscreen passes leave the facade bound to the screen with a
//! full-screen viewport and back-face culling.

use glam::{Mat4, Vec3};

use crate::config::SceneConfig;
use crate::draw_call::DrawCall;
use crate::facade::{Capability, CullFace, GpuFacade, Program, RenderTarget, Viewport};
use crate::reflection::{normal_matrix, surface_reflection_matrix};
use crate::scene::FrameContext;
use crate::uniforms::{
    mat3_to_padded_cols, MirrorUniforms, ObjectUniforms, ShadowUniforms, SkyboxUniforms,
};

/// Owns the long-lived draw calls and issues a frame's passes.
#[derive(Debug, Clone)]
pub struct FrameRenderer {
    shadow_call: DrawCall<ShadowUniforms>,
    skybox_call: DrawCall<SkyboxUniforms>,
    object_call: DrawCall<ObjectUniforms>,
    mirror_call: DrawCall<MirrorUniforms>,
}

impl FrameRenderer {
    /// Creates the draw calls with the scene's material constants.
    #[must_use]
    pub fn new(config: &SceneConfig) -> Self {
        let mirror_uniforms = MirrorUniforms {
            distortion_strength: config.mirror.distortion_strength,
            ..MirrorUniforms::default()
        };
        Self {
            shadow_call: DrawCall::new(Program::Shadow, ShadowUniforms::default()),
            skybox_call: DrawCall::new(Program::Skybox, SkyboxUniforms::default()),
            object_call: DrawCall::new(
                Program::Object,
                ObjectUniforms::new(config.object.base_color, config.object.ambient_color),
            ),
            mirror_call: DrawCall::new(Program::Mirror, mirror_uniforms),
        }
    }

    /// Runs all four passes for the frame described by `ctx`.
    pub fn render_frame(&mut self, gpu: &mut impl GpuFacade, ctx: &mut FrameContext) {
        self.shadow_pass(gpu, ctx);
        self.reflection_pass(gpu, ctx);
        self.main_pass(gpu, ctx);
        self.mirror_pass(gpu, ctx);
    }

    /// Renders the sphere's depth from the shadow light into the shadow target.
    pub fn shadow_pass(&mut self, gpu: &mut impl GpuFacade, ctx: &mut FrameContext) {
        gpu.bind_framebuffer(RenderTarget::Shadow);
        let (width, height) = gpu.target_size(RenderTarget::Shadow);
        gpu.set_viewport(Viewport::full(width, height));
        // Seen from the light, the sphere's winding is inverted.
        gpu.set_cull_face(CullFace::Front);

        let m = &mut ctx.matrices;
        m.light_view_projection = ctx.light_projection * ctx.light_view;
        m.light_model_view_projection = m.light_view_projection * ctx.model;

        gpu.clear();
        self.shadow_call.uniforms.light_model_view_projection =
            m.light_model_view_projection.to_cols_array_2d();
        self.shadow_call.draw(gpu);

        gpu.set_cull_face(CullFace::Back);
        gpu.bind_default_framebuffer();
        gpu.set_default_viewport();
    }

    /// Renders the scene as seen through the mirror into the reflection target.
    pub fn reflection_pass(&mut self, gpu: &mut impl GpuFacade, ctx: &mut FrameContext) {
        gpu.bind_framebuffer(RenderTarget::Reflection);
        let (width, height) = gpu.target_size(RenderTarget::Reflection);
        gpu.set_viewport(Viewport::full(width, height));
        // The mirror flips handedness, so the reflected scene winds the other way.
        gpu.set_cull_face(CullFace::Front);

        let reflection = surface_reflection_matrix(ctx.mirror_model, ctx.mirror_normal);
        ctx.matrices.reflection = reflection;
        let view = ctx.view * reflection;
        let camera_position = reflection.transform_point3(ctx.camera_position);
        self.draw_objects(gpu, ctx, camera_position, view);

        gpu.set_cull_face(CullFace::Back);
        gpu.bind_default_framebuffer();
        gpu.set_default_viewport();
    }

    /// Renders skybox and sphere to the screen from the real camera.
    pub fn main_pass(&mut self, gpu: &mut impl GpuFacade, ctx: &mut FrameContext) {
        let (camera_position, view) = (ctx.camera_position, ctx.view);
        self.draw_objects(gpu, ctx, camera_position, view);
    }

    /// Draws the mirror quad over the main pass.
    ///
    /// Uses the view-projection left by the main pass.
    pub fn mirror_pass(&mut self, gpu: &mut impl GpuFacade, ctx: &mut FrameContext) {
        let m = &mut ctx.matrices;
        m.mirror_model_view_projection = m.view_projection * ctx.mirror_model;

        let (width, height) = gpu.target_size(RenderTarget::Screen);
        let uniforms = &mut self.mirror_call.uniforms;
        uniforms.model_view_projection = m.mirror_model_view_projection.to_cols_array_2d();
        uniforms.screen_size = [width as f32, height as f32];
        self.mirror_call.draw(gpu);
    }

    /// Clears the bound target and draws skybox then sphere for the given
    /// eye. Shared by the reflection and main passes.
    pub fn draw_objects(
        &mut self,
        gpu: &mut impl GpuFacade,
        ctx: &mut FrameContext,
        camera_position: Vec3,
        view: Mat4,
    ) {
        let m = &mut ctx.matrices;
        m.view_projection = ctx.projection * view;
        m.model_view = view * ctx.model;
        m.model_view_projection = m.view_projection * ctx.model;
        m.skybox_view_projection_inverse = (ctx.projection * view).inverse();

        gpu.clear();

        gpu.disable(Capability::DepthTest);
        gpu.disable(Capability::CullFace);
        self.skybox_call.uniforms.view_projection_inverse =
            m.skybox_view_projection_inverse.to_cols_array_2d();
        self.skybox_call.draw(gpu);

        gpu.enable(Capability::DepthTest);
        gpu.enable(Capability::CullFace);
        let object = &mut self.object_call.uniforms;
        object.model_view_projection = m.model_view_projection.to_cols_array_2d();
        object.model = ctx.model.to_cols_array_2d();
        object.light_model_view_projection = m.light_model_view_projection.to_cols_array_2d();
        object.normal_matrix = mat3_to_padded_cols(normal_matrix(ctx.model));
        object.camera_position = camera_position.extend(1.0).to_array();

        let trailer = self.object_call.trailer_mut();
        trailer.clear();
        trailer.extend_from_slice(&ctx.light_positions);
        trailer.extend_from_slice(&ctx.light_colors);
        self.object_call.draw(gpu);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::TargetSizes;
    use crate::recording::{Command, DrawRecord, RecordingFacade};

    fn setup() -> (FrameRenderer, FrameContext, RecordingFacade) {
        let config = SceneConfig::default();
        let sizes = TargetSizes::new(
            (config.width, config.height),
            config.shadow.resolution,
            config.mirror.reflection_scale,
        );
        (
            FrameRenderer::new(&config),
            FrameContext::new(&config),
            RecordingFacade::new(sizes),
        )
    }

    fn mat(cols: [[f32; 4]; 4]) -> Mat4 {
        Mat4::from_cols_array_2d(&cols)
    }

    fn assert_mat_near(a: Mat4, b: Mat4) {
        for (x, y) in a.to_cols_array().iter().zip(b.to_cols_array().iter()) {
            assert!((x - y).abs() < 1e-4 * (1.0 + y.abs()), "{a} != {b}");
        }
    }

    #[test]
    fn test_frame_issues_six_draws_in_order() {
        let (mut renderer, mut ctx, mut gpu) = setup();
        ctx.update(1500.0);
        renderer.render_frame(&mut gpu, &mut ctx);

        let draws: Vec<(Program, RenderTarget)> = gpu
            .draws()
            .map(|d| (d.program, d.state.framebuffer))
            .collect();
        assert_eq!(
            draws,
            vec![
                (Program::Shadow, RenderTarget::Shadow),
                (Program::Skybox, RenderTarget::Reflection),
                (Program::Object, RenderTarget::Reflection),
                (Program::Skybox, RenderTarget::Screen),
                (Program::Object, RenderTarget::Screen),
                (Program::Mirror, RenderTarget::Screen),
            ]
        );
    }

    #[test]
    fn test_state_restored_after_offscreen_passes() {
        let (mut renderer, mut ctx, mut gpu) = setup();
        let screen = Viewport::full(1280, 720);

        renderer.shadow_pass(&mut gpu, &mut ctx);
        let s = gpu.state();
        assert_eq!(s.framebuffer, RenderTarget::Screen);
        assert_eq!(s.viewport, screen);
        assert_eq!(s.cull_face, CullFace::Back);

        renderer.reflection_pass(&mut gpu, &mut ctx);
        let s = gpu.state();
        assert_eq!(s.framebuffer, RenderTarget::Screen);
        assert_eq!(s.viewport, screen);
        assert_eq!(s.cull_face, CullFace::Back);
    }

    #[test]
    fn test_offscreen_draws_use_front_culling_and_target_viewport() {
        let (mut renderer, mut ctx, mut gpu) = setup();
        renderer.render_frame(&mut gpu, &mut ctx);
        let draws: Vec<&DrawRecord> = gpu.draws().collect();

        let shadow = draws[0];
        assert_eq!(shadow.state.cull_face, CullFace::Front);
        assert_eq!(shadow.state.viewport, Viewport::full(1000, 1000));

        let reflected_object = draws[2];
        assert_eq!(reflected_object.state.cull_face, CullFace::Front);
        assert!(reflected_object.state.culling && reflected_object.state.depth_test);
        assert_eq!(reflected_object.state.viewport, Viewport::full(256, 144));

        let main_object = draws[4];
        assert_eq!(main_object.state.cull_face, CullFace::Back);
        assert_eq!(main_object.state.viewport, Viewport::full(1280, 720));
    }

    #[test]
    fn test_skybox_drawn_without_depth_or_culling() {
        let (mut renderer, mut ctx, mut gpu) = setup();
        renderer.render_frame(&mut gpu, &mut ctx);
        for draw in gpu.draws().filter(|d| d.program == Program::Skybox) {
            assert!(!draw.state.depth_test);
            assert!(!draw.state.culling);
        }
    }

    #[test]
    fn test_each_scene_draw_is_preceded_by_clear_of_its_target() {
        let (mut renderer, mut ctx, mut gpu) = setup();
        renderer.render_frame(&mut gpu, &mut ctx);
        let clears: Vec<RenderTarget> = gpu
            .commands()
            .iter()
            .filter_map(|c| match c {
                Command::Clear(t) => Some(*t),
                _ => None,
            })
            .collect();
        assert_eq!(
            clears,
            vec![
                RenderTarget::Shadow,
                RenderTarget::Reflection,
                RenderTarget::Screen
            ]
        );
    }

    #[test]
    fn test_main_object_mvp_matches_direct_product() {
        let (mut renderer, mut ctx, mut gpu) = setup();
        for ms in [0.0, 16.7, 1000.0, 9876.5] {
            gpu.clear_commands();
            ctx.update(ms);
            renderer.render_frame(&mut gpu, &mut ctx);

            let main_object = gpu
                .draws()
                .filter(|d| d.program == Program::Object)
                .last()
                .unwrap();
            let u: ObjectUniforms = main_object.uniforms_as();
            let expected = ctx.projection * ctx.view * ctx.model;
            assert_mat_near(mat(u.model_view_projection), expected);
            assert_mat_near(ctx.matrices.model_view_projection, expected);
        }
    }

    #[test]
    fn test_reflected_object_uses_mirrored_camera() {
        let (mut renderer, mut ctx, mut gpu) = setup();
        ctx.update(2000.0);
        renderer.render_frame(&mut gpu, &mut ctx);

        let reflected: ObjectUniforms = gpu
            .draws()
            .find(|d| d.program == Program::Object)
            .unwrap()
            .uniforms_as();
        let r = surface_reflection_matrix(ctx.mirror_model, Vec3::Y);
        let expected_mvp = ctx.projection * ctx.view * r * ctx.model;
        assert_mat_near(mat(reflected.model_view_projection), expected_mvp);

        // mirror at y = -1: camera height h reflects to -2 - h
        let cam = Vec3::from_slice(&reflected.camera_position[..3]);
        assert!((cam.y - (-2.0 - ctx.camera_position.y)).abs() < 1e-4);
    }

    #[test]
    fn test_object_draw_carries_lights() {
        let (mut renderer, mut ctx, mut gpu) = setup();
        ctx.update(500.0);
        renderer.render_frame(&mut gpu, &mut ctx);

        let object = gpu.draws().find(|d| d.program == Program::Object).unwrap();
        let rows = object.trailer_after::<ObjectUniforms>();
        assert_eq!(rows.len(), 4);
        assert_eq!(&rows[..2], ctx.light_positions.as_slice());
        assert_eq!(&rows[2..], ctx.light_colors.as_slice());
    }

    #[test]
    fn test_shadow_uses_light_view() {
        let (mut renderer, mut ctx, mut gpu) = setup();
        renderer.render_frame(&mut gpu, &mut ctx);

        let shadow: ShadowUniforms = gpu.draws().next().unwrap().uniforms_as();
        let expected = ctx.light_projection * ctx.light_view * ctx.model;
        assert_mat_near(mat(shadow.light_model_view_projection), expected);
        assert_ne!(ctx.light_view, Mat4::IDENTITY);

        // the object samples the shadow map with the same transform
        let object: ObjectUniforms = gpu
            .draws()
            .filter(|d| d.program == Program::Object)
            .last()
            .unwrap()
            .uniforms_as();
        assert_mat_near(mat(object.light_model_view_projection), expected);
    }

    #[test]
    fn test_mirror_uniforms() {
        let (mut renderer, mut ctx, mut gpu) = setup();
        ctx.update(750.0);
        renderer.render_frame(&mut gpu, &mut ctx);

        let mirror: MirrorUniforms = gpu.draws().last().unwrap().uniforms_as();
        assert_eq!(mirror.screen_size, [1280.0, 720.0]);
        assert!((mirror.distortion_strength - 0.03).abs() < 1e-6);
        let expected = ctx.projection * ctx.view * ctx.mirror_model;
        assert_mat_near(mat(mirror.model_view_projection), expected);
    }

    #[test]
    fn test_skybox_inverse_unprojects_to_view_direction() {
        let (mut renderer, mut ctx, mut gpu) = setup();
        renderer.render_frame(&mut gpu, &mut ctx);

        let sky: SkyboxUniforms = gpu
            .draws()
            .filter(|d| d.program == Program::Skybox)
            .last()
            .unwrap()
            .uniforms_as();
        // The screen centre unprojects onto the ray toward the look target.
        let p = mat(sky.view_projection_inverse).project_point3(Vec3::new(0.0, 0.0, 1.0));
        let dir = (p - ctx.camera_position).normalize();
        let forward = (ctx.camera().target - ctx.camera_position).normalize();
        assert!(dir.dot(forward) > 0.999);
    }
}
