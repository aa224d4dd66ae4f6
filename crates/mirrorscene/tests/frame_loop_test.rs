//! Frame loop tests against the recording facade.
//!
//! These drive the same renderer and frame context the windowed app uses,
//! over many frames, without a GPU.

use mirrorscene::*;
use mirrorscene_core::{Command, CullFace, ObjectUniforms, Program, RenderTarget, Viewport};
use proptest::prelude::*;

fn setup(config: &SceneConfig) -> (FrameRenderer, FrameContext, RecordingFacade) {
    let sizes = TargetSizes::new(
        (config.width, config.height),
        config.shadow.resolution,
        config.mirror.reflection_scale,
    );
    (
        FrameRenderer::new(config),
        FrameContext::new(config),
        RecordingFacade::new(sizes),
    )
}

fn assert_mat_near(a: Mat4, b: Mat4) {
    for (x, y) in a.to_cols_array().iter().zip(b.to_cols_array().iter()) {
        assert!((x - y).abs() < 1e-3 * (1.0 + y.abs()), "{a} != {b}");
    }
}

#[test]
fn every_frame_issues_the_same_pass_structure() {
    let config = SceneConfig::default();
    let (mut renderer, mut ctx, mut gpu) = setup(&config);

    // ~60 fps for two seconds
    for frame in 0..120 {
        gpu.clear_commands();
        ctx.update(f64::from(frame) * 16.6);
        renderer.render_frame(&mut gpu, &mut ctx);

        let programs: Vec<Program> = gpu.draws().map(|d| d.program).collect();
        assert_eq!(
            programs,
            [
                Program::Shadow,
                Program::Skybox,
                Program::Object,
                Program::Skybox,
                Program::Object,
                Program::Mirror
            ]
        );
        let clears = gpu
            .commands()
            .iter()
            .filter(|c| matches!(c, Command::Clear(_)))
            .count();
        assert_eq!(clears, 3);

        let state = gpu.state();
        assert_eq!(state.framebuffer, RenderTarget::Screen);
        assert_eq!(state.cull_face, CullFace::Back);
    }
}

#[test]
fn lights_sweep_around_the_z_axis() {
    let config = SceneConfig::default();
    let (mut renderer, mut ctx, mut gpu) = setup(&config);

    let mut previous = None;
    for ms in [0.0, 250.0, 500.0, 750.0] {
        gpu.clear_commands();
        ctx.update(ms);
        renderer.render_frame(&mut gpu, &mut ctx);

        let object = gpu.draws().find(|d| d.program == Program::Object).unwrap();
        let rows = object.trailer_after::<ObjectUniforms>();
        let first_light = Vec3::from_slice(&rows[0][..3]);
        // rotation about Z keeps z and the distance from the axis
        assert!((first_light.z - 2.0).abs() < 1e-4);
        assert!((first_light.truncate().length() - 5.0).abs() < 1e-3);
        assert_ne!(previous, Some(first_light));
        previous = Some(first_light);
    }
}

#[test]
fn config_file_changes_what_is_drawn() {
    let path = std::env::temp_dir().join(format!("mirrorscene-frame-{}.json", std::process::id()));
    let json = serde_json::json!({
        "width": 640,
        "height": 480,
        "mirror": { "reflection_scale": 0.5 },
        "lights": {
            "points": [
                { "color": [1.0, 1.0, 1.0], "position": [5.0, 0.0, 2.0] },
                { "color": [0.9, 0.0, 0.3], "position": [-5.0, 0.0, 2.0] },
                { "color": [0.0, 0.5, 1.0], "position": [0.0, 5.0, 2.0] }
            ]
        }
    });
    std::fs::write(&path, json.to_string()).unwrap();
    let config = load_config(Some(&path)).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(config.light_count(), 3);
    let (mut renderer, mut ctx, mut gpu) = setup(&config);
    renderer.render_frame(&mut gpu, &mut ctx);

    let draws: Vec<_> = gpu.draws().collect();
    assert_eq!(draws[2].state.viewport, Viewport::full(320, 240));
    assert_eq!(draws[2].trailer_after::<ObjectUniforms>().len(), 6);
    assert_eq!(draws[4].state.viewport, Viewport::full(640, 480));
}

proptest! {
    #[test]
    fn passes_leave_screen_state_for_any_time(ms in 0.0f64..1.0e6) {
        let config = SceneConfig::default();
        let (mut renderer, mut ctx, mut gpu) = setup(&config);
        ctx.update(ms);

        renderer.shadow_pass(&mut gpu, &mut ctx);
        renderer.reflection_pass(&mut gpu, &mut ctx);
        let state = gpu.state();
        prop_assert_eq!(state.framebuffer, RenderTarget::Screen);
        prop_assert_eq!(state.viewport, Viewport::full(config.width, config.height));
        prop_assert_eq!(state.cull_face, CullFace::Back);
    }

    #[test]
    fn main_mvp_is_projection_view_model(ms in 0.0f64..1.0e5) {
        let config = SceneConfig::default();
        let (mut renderer, mut ctx, mut gpu) = setup(&config);
        ctx.update(ms);
        renderer.render_frame(&mut gpu, &mut ctx);

        let object: ObjectUniforms = gpu
            .draws()
            .filter(|d| d.program == Program::Object)
            .last()
            .unwrap()
            .uniforms_as();
        assert_mat_near(
            Mat4::from_cols_array_2d(&object.model_view_projection),
            ctx.projection * ctx.view * ctx.model,
        );
    }
}
