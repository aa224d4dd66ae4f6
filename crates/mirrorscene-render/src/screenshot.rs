//! Turning read-back frames into images.

use image::RgbaImage;
use std::path::Path;

/// Error type for screenshot operations.
#[derive(Debug, thiserror::Error)]
pub enum ScreenshotError {
    #[error("Image encoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid image data")]
    InvalidImageData,

    #[error("GPU buffer mapping failed")]
    BufferMapFailed,

    #[error("No offscreen target to capture")]
    NoCaptureTarget,
}

/// Calculates bytes per row with proper alignment for wgpu buffer copies.
#[must_use]
pub fn aligned_bytes_per_row(width: u32) -> u32 {
    let unaligned = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unaligned.div_ceil(align) * align
}

/// Removes the per-row padding of a texture-to-buffer copy.
#[must_use]
pub fn strip_row_padding(data: &[u8], width: u32, height: u32, bytes_per_row: u32) -> Vec<u8> {
    let row_bytes = (width * 4) as usize;
    let mut result = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * bytes_per_row as usize;
        result.extend_from_slice(&data[start..start + row_bytes]);
    }
    result
}

/// Wraps tightly packed pixels of `format` as an RGBA image.
///
/// BGRA surface formats are swizzled; wgpu uses a top-left origin so rows
/// are kept as they are.
pub fn pixels_to_image(
    mut data: Vec<u8>,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
) -> Result<RgbaImage, ScreenshotError> {
    if matches!(
        format,
        wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
    ) {
        for chunk in data.chunks_exact_mut(4) {
            chunk.swap(0, 2); // Swap B and R
        }
    }
    RgbaImage::from_raw(width, height, data).ok_or(ScreenshotError::InvalidImageData)
}

/// Saves `image` as PNG or JPEG, chosen by the file extension.
pub fn save_image(path: &Path, image: &RgbaImage) -> Result<(), ScreenshotError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "png" => {
            image.save_with_format(path, image::ImageFormat::Png)?;
        }
        "jpg" | "jpeg" => {
            // Convert to RGB for JPEG (no alpha)
            let rgb = image::DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            rgb.save_with_format(path, image::ImageFormat::Jpeg)?;
        }
        _ => {
            return Err(ScreenshotError::UnsupportedFormat(extension));
        }
    }

    log::info!("saved {}x{} frame to {}", image.width(), image.height(), path.display());
    Ok(())
}
