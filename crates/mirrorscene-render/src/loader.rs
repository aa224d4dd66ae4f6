//! Image sources for the skybox cubemap and the mirror distortion map.

use std::f32::consts::TAU;
use std::path::PathBuf;

use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{RenderError, RenderResult};

/// Cubemap face files in layer order (+X, -X, +Y, -Y, +Z, -Z).
pub const CUBEMAP_FACES: [&str; 6] = ["px.png", "nx.png", "py.png", "ny.png", "pz.png", "nz.png"];

/// Distortion map file.
pub const DISTORTION_MAP: &str = "texture.jpg";

/// Source of named RGBA images.
pub trait ImageLoader {
    /// Loads the image called `name`.
    fn load(&self, name: &str) -> RenderResult<RgbaImage>;
}

/// Decodes images from files in a directory.
#[derive(Debug, Clone)]
pub struct DirectoryImageLoader {
    root: PathBuf,
}

impl DirectoryImageLoader {
    /// Creates a loader reading from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageLoader for DirectoryImageLoader {
    fn load(&self, name: &str) -> RenderResult<RgbaImage> {
        let path = self.root.join(name);
        log::debug!("loading image {}", path.display());
        let image = image::open(&path).map_err(|e| RenderError::ImageLoadFailed {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        Ok(image.to_rgba8())
    }
}

/// Generates the scene's images instead of reading them: a gradient sky for
/// each cubemap face and a seeded ripple pattern for the distortion map.
#[derive(Debug, Clone)]
pub struct ProceduralImageLoader {
    pub face_size: u32,
    pub distortion_size: u32,
    pub seed: u64,
}

impl Default for ProceduralImageLoader {
    fn default() -> Self {
        Self {
            face_size: 64,
            distortion_size: 256,
            seed: 7,
        }
    }
}

impl ProceduralImageLoader {
    fn cubemap_face(&self, layer: usize) -> RgbaImage {
        // Horizon and zenith tints per face; +Y is all sky, -Y all ground.
        let (low, high): ([f32; 3], [f32; 3]) = match layer {
            2 => ([0.35, 0.55, 0.85], [0.35, 0.55, 0.85]),
            3 => ([0.25, 0.22, 0.2], [0.25, 0.22, 0.2]),
            _ => ([0.25, 0.22, 0.2], [0.35, 0.55, 0.85]),
        };
        let tint = [0.0, 0.03, 0.06, 0.09, 0.12, 0.15][layer];
        let size = self.face_size.max(1);

        RgbaImage::from_fn(size, size, |_, y| {
            // row 0 is the top of a side face
            let t = 1.0 - y as f32 / (size.max(2) - 1) as f32;
            let channel = |i: usize| {
                let v = low[i] + (high[i] - low[i]) * t + if i == 0 { tint } else { 0.0 };
                (v.clamp(0.0, 1.0) * 255.0).round() as u8
            };
            Rgba([channel(0), channel(1), channel(2), 255])
        })
    }

    fn distortion(&self) -> RgbaImage {
        let size = self.distortion_size.max(1);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let phase: f32 = rng.gen_range(0.0..TAU);
        let center = size as f32 * 0.5;

        RgbaImage::from_fn(size, size, |x, y| {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            let r = (dx * dx + dy * dy).sqrt() / size as f32;
            let noise: f32 = rng.gen_range(-0.04..0.04);
            let v = 0.5 + 0.4 * (r * 6.0 * TAU + phase).sin() + noise;
            let v = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
            Rgba([v, v, v, 255])
        })
    }
}

impl ImageLoader for ProceduralImageLoader {
    fn load(&self, name: &str) -> RenderResult<RgbaImage> {
        if let Some(layer) = CUBEMAP_FACES.iter().position(|face| *face == name) {
            return Ok(self.cubemap_face(layer));
        }
        if name == DISTORTION_MAP {
            return Ok(self.distortion());
        }
        Err(RenderError::ImageLoadFailed {
            name: name.to_string(),
            reason: "no generator for this image".into(),
        })
    }
}

/// All images the scene samples.
#[derive(Debug, Clone)]
pub struct SceneImages {
    /// Faces in [`CUBEMAP_FACES`] order.
    pub cubemap_faces: [RgbaImage; 6],
    pub distortion: RgbaImage,
}

impl SceneImages {
    /// Loads every image through `loader`. Cubemap faces must be square and
    /// of equal size.
    pub fn load(loader: &dyn ImageLoader) -> RenderResult<Self> {
        let [px, nx, py, ny, pz, nz] = CUBEMAP_FACES;
        let cubemap_faces = [
            loader.load(px)?,
            loader.load(nx)?,
            loader.load(py)?,
            loader.load(ny)?,
            loader.load(pz)?,
            loader.load(nz)?,
        ];

        let size = cubemap_faces[0].dimensions();
        for (name, face) in CUBEMAP_FACES.iter().zip(&cubemap_faces) {
            let (w, h) = face.dimensions();
            if w != h || (w, h) != size {
                return Err(RenderError::ImageLoadFailed {
                    name: (*name).to_string(),
                    reason: format!(
                        "cubemap face is {w}x{h}, expected square {}x{}",
                        size.0, size.0
                    ),
                });
            }
        }

        let distortion = loader.load(DISTORTION_MAP)?;
        log::info!(
            "loaded cubemap ({}x{} faces) and {}x{} distortion map",
            size.0,
            size.1,
            distortion.width(),
            distortion.height()
        );

        Ok(Self {
            cubemap_faces,
            distortion,
        })
    }

    /// Edge length of each cubemap face.
    #[must_use]
    pub fn face_size(&self) -> u32 {
        self.cubemap_faces[0].width()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct LopsidedLoader;

    impl ImageLoader for LopsidedLoader {
        fn load(&self, name: &str) -> RenderResult<RgbaImage> {
            let size = if name == "pz.png" { 16 } else { 8 };
            Ok(RgbaImage::new(size, size))
        }
    }

    #[test]
    fn test_procedural_images() {
        let images = SceneImages::load(&ProceduralImageLoader::default()).unwrap();
        assert_eq!(images.face_size(), 64);
        for face in &images.cubemap_faces {
            assert_eq!(face.dimensions(), (64, 64));
        }
        assert_eq!(images.distortion.dimensions(), (256, 256));
    }

    #[test]
    fn test_procedural_distortion_is_seeded() {
        let loader = ProceduralImageLoader::default();
        let a = loader.load(DISTORTION_MAP).unwrap();
        let b = loader.load(DISTORTION_MAP).unwrap();
        assert_eq!(a, b);

        let other = ProceduralImageLoader {
            seed: 8,
            ..ProceduralImageLoader::default()
        };
        assert_ne!(a, other.load(DISTORTION_MAP).unwrap());
    }

    #[test]
    fn test_sky_brighter_above_horizon() {
        let face = ProceduralImageLoader::default().load("pz.png").unwrap();
        let top = face.get_pixel(0, 0);
        let bottom = face.get_pixel(0, 63);
        assert!(top[2] > bottom[2]);
    }

    #[test]
    fn test_unknown_procedural_image() {
        let err = ProceduralImageLoader::default().load("missing.png").unwrap_err();
        assert!(matches!(err, RenderError::ImageLoadFailed { name, .. } if name == "missing.png"));
    }

    #[test]
    fn test_mismatched_faces_rejected() {
        let err = SceneImages::load(&LopsidedLoader).unwrap_err();
        assert!(matches!(err, RenderError::ImageLoadFailed { name, .. } if name == "pz.png"));
    }

    #[test]
    fn test_directory_loader_reads_files() {
        let dir = std::env::temp_dir().join(format!("mirrorscene-loader-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let procedural = ProceduralImageLoader {
            face_size: 4,
            distortion_size: 4,
            seed: 1,
        };
        for name in CUBEMAP_FACES {
            procedural.load(name).unwrap().save(dir.join(name)).unwrap();
        }

        let loader = DirectoryImageLoader::new(&dir);
        assert_eq!(loader.load("px.png").unwrap().dimensions(), (4, 4));
        // no distortion map was written
        let err = SceneImages::load(&loader).unwrap_err();
        assert!(matches!(err, RenderError::ImageLoadFailed { name, .. } if name == DISTORTION_MAP));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
