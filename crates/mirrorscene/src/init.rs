//! Configuration loading and the windowed entry point.

use std::path::Path;

use mirrorscene_core::SceneConfig;
use mirrorscene_render::{DirectoryImageLoader, ImageLoader, ProceduralImageLoader};

use crate::Result;

/// Loads and validates the scene configuration.
///
/// Without a path the stock scene is used.
///
/// # Example
///
/// ```no_run
/// use mirrorscene::*;
///
/// let config = load_config(Some(std::path::Path::new("scene.json"))).unwrap();
/// assert!(config.light_count() > 0);
/// ```
pub fn load_config(path: Option<&Path>) -> Result<SceneConfig> {
    let config = match path {
        Some(path) => {
            log::info!("loading scene config from {}", path.display());
            SceneConfig::load(path)?
        }
        None => {
            log::info!("using default scene config");
            SceneConfig::default()
        }
    };
    config.validate()?;
    Ok(config)
}

/// Picks the image source for `config`: its assets directory when set,
/// generated images otherwise.
#[must_use]
pub fn image_loader(config: &SceneConfig) -> Box<dyn ImageLoader> {
    match &config.assets_dir {
        Some(dir) => {
            log::info!("loading images from {}", dir.display());
            Box::new(DirectoryImageLoader::new(dir))
        }
        None => {
            log::info!("no assets directory configured, generating images");
            Box::new(ProceduralImageLoader::default())
        }
    }
}

/// Opens the demo window and runs the frame loop until it is closed.
///
/// Initialization errors (GPU, images) end the loop and are returned.
pub fn show(config: SceneConfig) -> Result<()> {
    let _ = env_logger::try_init();
    crate::app::run_app(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = load_config(None).unwrap();
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn test_missing_config_file() {
        let result = load_config(Some(Path::new("/nonexistent/mirrorscene.json")));
        assert!(matches!(result, Err(crate::MirrorError::Scene(_))));
    }
}
