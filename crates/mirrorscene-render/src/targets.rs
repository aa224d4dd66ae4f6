//! Offscreen render targets: shadow map, reflection color/depth and the
//! screen depth buffer.

use mirrorscene_core::{RenderTarget, TargetSizes};

/// Depth format of every target.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Color format of the reflection target.
pub const REFLECTION_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Color format of the headless screen target.
pub const HEADLESS_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// A texture with its default view.
pub struct TargetTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl TargetTexture {
    /// Creates a single-level 2D texture.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        (width, height): (u32, u32),
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// Color formats per target; the shadow target has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetFormats {
    pub screen: wgpu::TextureFormat,
    pub reflection: wgpu::TextureFormat,
}

impl TargetFormats {
    /// Color format of `target`.
    #[must_use]
    pub fn color(&self, target: RenderTarget) -> Option<wgpu::TextureFormat> {
        match target {
            RenderTarget::Screen => Some(self.screen),
            RenderTarget::Reflection => Some(self.reflection),
            RenderTarget::Shadow => None,
        }
    }
}

/// All textures the passes render into.
pub struct RenderTargets {
    sizes: TargetSizes,
    formats: TargetFormats,
    shadow_depth: TargetTexture,
    reflection_color: TargetTexture,
    reflection_depth: TargetTexture,
    screen_depth: TargetTexture,
    /// Screen color when there is no surface.
    offscreen_screen: Option<TargetTexture>,
}

impl RenderTargets {
    /// Creates the targets. With `headless` set the screen also gets a
    /// color texture that can be copied out.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        sizes: TargetSizes,
        screen_format: wgpu::TextureFormat,
        headless: bool,
    ) -> Self {
        let sampled = wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING;

        let shadow_depth =
            TargetTexture::new(device, "shadow depth", sizes.shadow, DEPTH_FORMAT, sampled);
        let reflection_color = TargetTexture::new(
            device,
            "reflection color",
            sizes.reflection,
            REFLECTION_FORMAT,
            sampled,
        );
        let reflection_depth = TargetTexture::new(
            device,
            "reflection depth",
            sizes.reflection,
            DEPTH_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );
        let screen_depth = TargetTexture::new(
            device,
            "screen depth",
            sizes.screen,
            DEPTH_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );
        let offscreen_screen = headless.then(|| {
            TargetTexture::new(
                device,
                "offscreen screen",
                sizes.screen,
                screen_format,
                wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            )
        });

        log::info!(
            "render targets: screen {}x{}, shadow {}x{}, reflection {}x{}",
            sizes.screen.0,
            sizes.screen.1,
            sizes.shadow.0,
            sizes.shadow.1,
            sizes.reflection.0,
            sizes.reflection.1
        );

        Self {
            sizes,
            formats: TargetFormats {
                screen: screen_format,
                reflection: REFLECTION_FORMAT,
            },
            shadow_depth,
            reflection_color,
            reflection_depth,
            screen_depth,
            offscreen_screen,
        }
    }

    #[must_use]
    pub fn sizes(&self) -> TargetSizes {
        self.sizes
    }

    #[must_use]
    pub fn formats(&self) -> TargetFormats {
        self.formats
    }

    /// Depth attachment of `target`.
    #[must_use]
    pub fn depth_view(&self, target: RenderTarget) -> &wgpu::TextureView {
        match target {
            RenderTarget::Screen => &self.screen_depth.view,
            RenderTarget::Shadow => &self.shadow_depth.view,
            RenderTarget::Reflection => &self.reflection_depth.view,
        }
    }

    /// Shadow map as sampled by the object shader.
    #[must_use]
    pub fn shadow_view(&self) -> &wgpu::TextureView {
        &self.shadow_depth.view
    }

    /// Reflection color as sampled by the mirror shader.
    #[must_use]
    pub fn reflection_view(&self) -> &wgpu::TextureView {
        &self.reflection_color.view
    }

    /// Headless screen texture, if any.
    #[must_use]
    pub fn offscreen_screen(&self) -> Option<&TargetTexture> {
        self.offscreen_screen.as_ref()
    }
}
