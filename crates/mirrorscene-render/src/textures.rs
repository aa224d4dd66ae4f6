//! Sampled scene textures: the skybox cubemap, the distortion map and their
//! samplers.

use image::RgbaImage;

use crate::error::{RenderError, RenderResult};
use crate::loader::SceneImages;

fn write_rgba(queue: &wgpu::Queue, texture: &wgpu::Texture, layer: u32, image: &RgbaImage) {
    let (width, height) = image.dimensions();
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d {
                x: 0,
                y: 0,
                z: layer,
            },
            aspect: wgpu::TextureAspect::All,
        },
        image.as_raw(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

/// Textures and samplers shared by the skybox, object and mirror programs.
pub struct SceneTextures {
    pub cubemap: wgpu::Texture,
    pub cubemap_view: wgpu::TextureView,
    pub distortion: wgpu::Texture,
    pub distortion_view: wgpu::TextureView,
    /// Trilinear, clamped.
    pub linear_sampler: wgpu::Sampler,
    /// Depth comparison for shadow lookups.
    pub shadow_sampler: wgpu::Sampler,
}

impl SceneTextures {
    /// Uploads `images`.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        images: &SceneImages,
    ) -> RenderResult<Self> {
        let face = images.face_size();
        let max = device.limits().max_texture_dimension_2d;
        if face == 0 || face > max {
            return Err(RenderError::TextureCreationFailed(format!(
                "cubemap face size {face} outside 1..={max}"
            )));
        }

        let cubemap = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("skybox cubemap"),
            size: wgpu::Extent3d {
                width: face,
                height: face,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        for (layer, image) in (0u32..).zip(&images.cubemap_faces) {
            write_rgba(queue, &cubemap, layer, image);
        }
        let cubemap_view = cubemap.create_view(&wgpu::TextureViewDescriptor {
            label: Some("skybox cubemap view"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });

        let (width, height) = images.distortion.dimensions();
        if width == 0 || height == 0 || width > max || height > max {
            return Err(RenderError::TextureCreationFailed(format!(
                "distortion map size {width}x{height} outside 1..={max}"
            )));
        }
        // Distortion values are data, not color.
        let distortion = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("distortion map"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        write_rgba(queue, &distortion, 0, &images.distortion);
        let distortion_view = distortion.create_view(&wgpu::TextureViewDescriptor::default());

        let linear_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("linear sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow comparison sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        Ok(Self {
            cubemap,
            cubemap_view,
            distortion,
            distortion_view,
            linear_sampler,
            shadow_sampler,
        })
    }
}
