//! Application window and frame loop.

mod input;

use std::sync::Arc;
use std::time::Instant;

use pollster::FutureExt;
use winit::event_loop::EventLoop;
use winit::window::Window;

use mirrorscene_core::{FrameContext, FrameRenderer, SceneConfig};
use mirrorscene_render::RenderEngine;

use crate::{MirrorError, Result};

/// The demo application state.
pub struct App {
    config: SceneConfig,
    window: Option<Arc<Window>>,
    engine: Option<RenderEngine>,
    renderer: FrameRenderer,
    context: FrameContext,
    /// Set when the first frame is drawn.
    start_time: Option<Instant>,
    frame_count: u64,
    /// First fatal error; ends the event loop.
    error: Option<MirrorError>,
}

impl App {
    /// Creates the application for `config`. The window and GPU are set up
    /// once the event loop resumes.
    pub fn new(config: SceneConfig) -> Self {
        Self {
            renderer: FrameRenderer::new(&config),
            context: FrameContext::new(&config),
            config,
            window: None,
            engine: None,
            start_time: None,
            frame_count: 0,
            error: None,
        }
    }

    /// Milliseconds since the first frame.
    fn elapsed_ms(&mut self) -> f64 {
        let start = *self.start_time.get_or_insert_with(Instant::now);
        start.elapsed().as_secs_f64() * 1000.0
    }

    /// Advances the scene to the current time and renders all passes.
    pub(super) fn render(&mut self) {
        let elapsed_ms = self.elapsed_ms();
        let Some(engine) = &mut self.engine else {
            return;
        };

        self.context.update(elapsed_ms);
        match engine.render_frame(&mut self.renderer, &mut self.context) {
            Ok(()) => {
                self.frame_count += 1;
                if self.frame_count == 1 {
                    log::info!("first frame rendered");
                }
            }
            Err(mirrorscene_render::RenderError::OutOfMemory) => {
                self.error = Some(mirrorscene_render::RenderError::OutOfMemory.into());
            }
            Err(e) => log::debug!("frame {} skipped: {e}", self.frame_count),
        }
    }
}

/// Runs the demo until the window is closed.
pub fn run_app(config: SceneConfig) -> Result<()> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);

    event_loop.run_app(&mut app)?;

    log::info!("rendered {} frames", app.frame_count);
    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Creates the render engine for `window`.
fn create_engine(window: Arc<Window>, config: &SceneConfig) -> Result<RenderEngine> {
    let loader = crate::image_loader(config);
    let engine = RenderEngine::new_windowed(window, config, loader.as_ref()).block_on()?;
    Ok(engine)
}
