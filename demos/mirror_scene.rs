//! Opens the mirror scene in a window.
//!
//! Usage: `cargo run --example mirror_scene [scene.json]`
//!
//! Set `assets_dir` in the config to a directory with `nx.png` .. `pz.png`
//! and `texture.jpg` to use real skybox images.

use std::path::PathBuf;

use mirrorscene::*;

fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = load_config(config_path.as_deref())?;
    show(config)
}
