//! Renders a few frames of the mirror scene to PNG files without a window.
//!
//! Usage: `cargo run --example render_stills [output_dir]`

use std::path::PathBuf;

use mirrorscene::*;

fn main() -> Result<()> {
    let _ = env_logger::try_init();

    let out_dir = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from("stills"), PathBuf::from);
    if let Err(e) = std::fs::create_dir_all(&out_dir) {
        eprintln!("cannot create {}: {e}", out_dir.display());
        return Ok(());
    }

    let config = SceneConfig {
        width: 800,
        height: 450,
        ..SceneConfig::default()
    };
    let timestamps = [0.0, 1000.0, 2500.0, 5000.0];
    let frames = render_frames(&config, &timestamps)?;

    for (ms, frame) in timestamps.iter().zip(&frames) {
        let path = out_dir.join(format!("frame_{ms:05.0}ms.png"));
        if let Err(e) = frame.save(&path) {
            eprintln!("failed to save {}: {e}", path.display());
        } else {
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}
