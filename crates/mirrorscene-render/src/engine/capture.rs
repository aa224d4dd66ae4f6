use image::RgbaImage;

use super::RenderEngine;
use crate::error::RenderResult;
use crate::screenshot::{aligned_bytes_per_row, pixels_to_image, strip_row_padding, ScreenshotError};

impl RenderEngine {
    /// Reads back the last frame rendered by a headless engine.
    pub fn capture_frame(&mut self) -> RenderResult<RgbaImage> {
        let texture = &self
            .targets
            .offscreen_screen()
            .ok_or(ScreenshotError::NoCaptureTarget)?
            .texture;
        let (width, height) = self.targets.sizes().screen;
        let bytes_per_row = aligned_bytes_per_row(width);

        let device = &self.device;
        let buffer = self.capture_buffer.get_or_insert_with(|| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("capture buffer"),
                size: u64::from(bytes_per_row) * u64::from(height),
                usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
                mapped_at_creation: false,
            })
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("capture copy encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = device.poll(wgpu::Maintain::Wait);
        rx.recv()
            .map_err(|_| ScreenshotError::BufferMapFailed)?
            .map_err(|_| ScreenshotError::BufferMapFailed)?;

        let data = buffer_slice.get_mapped_range();
        let pixels = strip_row_padding(&data, width, height, bytes_per_row);
        drop(data);
        buffer.unmap();

        Ok(pixels_to_image(pixels, width, height, self.targets.formats().screen)?)
    }
}
