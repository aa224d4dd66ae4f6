//! Headless rendering API for mirrorscene.
//!
//! Renders frames of the scene at chosen timestamps to image buffers or
//! files without opening a window. Useful for integration tests and
//! generating stills.

use std::path::Path;

use image::RgbaImage;
use pollster::FutureExt;

use mirrorscene_core::{FrameContext, FrameRenderer, SceneConfig};
use mirrorscene_render::RenderEngine;

use crate::Result;

/// Renders the scene as it appears `elapsed_ms` milliseconds after startup.
///
/// The image is `config.width` x `config.height`, rows top to bottom.
///
/// # Example
/// ```no_run
/// use mirrorscene::*;
///
/// let config = SceneConfig::default();
/// let image = render_to_image(&config, 0.0).unwrap();
/// assert_eq!(image.dimensions(), (1280, 720));
/// ```
pub fn render_to_image(config: &SceneConfig, elapsed_ms: f64) -> Result<RgbaImage> {
    let mut frames = render_frames(config, &[elapsed_ms])?;
    Ok(frames.remove(0))
}

/// Renders one image per timestamp with a single GPU context.
///
/// Returns an empty list for no timestamps without touching the GPU.
pub fn render_frames(config: &SceneConfig, timestamps_ms: &[f64]) -> Result<Vec<RgbaImage>> {
    if timestamps_ms.is_empty() {
        return Ok(Vec::new());
    }
    config.validate()?;

    let loader = crate::image_loader(config);
    let mut engine = RenderEngine::new_headless(config, loader.as_ref()).block_on()?;
    let mut renderer = FrameRenderer::new(config);
    let mut context = FrameContext::new(config);

    let mut images = Vec::with_capacity(timestamps_ms.len());
    for &elapsed_ms in timestamps_ms {
        context.update(elapsed_ms);
        engine.render_frame(&mut renderer, &mut context)?;
        images.push(engine.capture_frame()?);
    }
    log::debug!(
        "rendered {} headless frames with {} pipeline variants",
        images.len(),
        engine.pipeline_count()
    );
    Ok(images)
}

/// Renders the scene at `elapsed_ms` and saves it as PNG or JPEG.
pub fn render_to_file(
    config: &SceneConfig,
    elapsed_ms: f64,
    filename: impl AsRef<Path>,
) -> Result<()> {
    let image = render_to_image(config, elapsed_ms)?;
    mirrorscene_render::save_image(filename.as_ref(), &image)
        .map_err(|e| mirrorscene_render::RenderError::from(e).into())
}
