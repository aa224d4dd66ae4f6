//! The render engine: device setup, scene resources and frame submission.

mod capture;

use std::collections::HashMap;
use std::sync::Arc;

use mirrorscene_core::{FrameContext, FrameRenderer, Program, SceneConfig, TargetSizes};

use crate::buffer::SceneMeshes;
use crate::error::{RenderError, RenderResult};
use crate::facade::WgpuFacade;
use crate::loader::{ImageLoader, SceneImages};
use crate::pipelines::PipelineCache;
use crate::targets::{RenderTargets, HEADLESS_FORMAT};
use crate::textures::SceneTextures;
use crate::uniform_arena::ProgramArenas;

/// Owns the GPU and everything the four passes render with.
pub struct RenderEngine {
    /// wgpu instance.
    pub instance: wgpu::Instance,
    /// wgpu adapter.
    pub adapter: wgpu::Adapter,
    /// wgpu device.
    pub device: wgpu::Device,
    /// wgpu queue.
    pub queue: wgpu::Queue,
    /// Window surface (None for headless rendering).
    surface: Option<wgpu::Surface<'static>>,
    /// Surface configuration; describes the offscreen screen when headless.
    surface_config: wgpu::SurfaceConfiguration,
    pipelines: PipelineCache,
    arenas: ProgramArenas,
    targets: RenderTargets,
    /// Kept alive for the texture bind groups.
    #[allow(dead_code)]
    textures: SceneTextures,
    texture_groups: HashMap<Program, wgpu::BindGroup>,
    meshes: SceneMeshes,
    clear_color: wgpu::Color,
    /// Readback buffer (lazily initialized).
    capture_buffer: Option<wgpu::Buffer>,
}

async fn request_device(
    adapter: &wgpu::Adapter,
    label: &str,
) -> RenderResult<(wgpu::Device, wgpu::Queue)> {
    let info = adapter.get_info();
    log::info!("using adapter {} ({:?})", info.name, info.backend);

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some(label),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
            },
            None,
        )
        .await?;
    Ok((device, queue))
}

impl RenderEngine {
    /// Creates a new windowed render engine.
    pub async fn new_windowed(
        window: Arc<winit::window::Window>,
        config: &SceneConfig,
        loader: &dyn ImageLoader,
    ) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::AdapterCreationFailed)?;

        let (device, queue) = request_device(&adapter, "mirrorscene device").await?;

        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(RenderError::SurfaceConfigurationFailed)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .ok_or(RenderError::SurfaceConfigurationFailed)?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);
        log::info!("surface {width}x{height} {surface_format:?}");

        Self::build(
            instance,
            adapter,
            device,
            queue,
            Some(surface),
            surface_config,
            config,
            loader,
        )
    }

    /// Creates a new headless render engine sized by `config`.
    pub async fn new_headless(
        config: &SceneConfig,
        loader: &dyn ImageLoader,
    ) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::AdapterCreationFailed)?;

        let (device, queue) = request_device(&adapter, "mirrorscene device (headless)").await?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            format: HEADLESS_FORMAT,
            width: config.width.max(1),
            height: config.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        Self::build(
            instance,
            adapter,
            device,
            queue,
            None,
            surface_config,
            config,
            loader,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn build(
        instance: wgpu::Instance,
        adapter: wgpu::Adapter,
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface: Option<wgpu::Surface<'static>>,
        surface_config: wgpu::SurfaceConfiguration,
        config: &SceneConfig,
        loader: &dyn ImageLoader,
    ) -> RenderResult<Self> {
        let sizes = TargetSizes::new(
            (surface_config.width, surface_config.height),
            config.shadow.resolution,
            config.mirror.reflection_scale,
        );
        let targets = RenderTargets::new(&device, sizes, surface_config.format, surface.is_none());

        let num_lights = config.light_count();
        let pipelines = PipelineCache::new(&device, targets.formats(), num_lights)?;
        let arenas = ProgramArenas::new(&device, pipelines.uniform_layout(), num_lights);

        let images = SceneImages::load(loader)?;
        let textures = SceneTextures::new(&device, &queue, &images)?;
        let texture_groups = pipelines.texture_bind_groups(&device, &targets, &textures);
        let meshes = SceneMeshes::new(&device, &config.object);

        let c = config.clear_color;
        let clear_color = wgpu::Color {
            r: f64::from(c.x),
            g: f64::from(c.y),
            b: f64::from(c.z),
            a: 1.0,
        };

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
            surface,
            surface_config,
            pipelines,
            arenas,
            targets,
            textures,
            texture_groups,
            meshes,
            clear_color,
            capture_buffer: None,
        })
    }

    /// Sizes of the screen, shadow and reflection targets.
    #[must_use]
    pub fn target_sizes(&self) -> TargetSizes {
        self.targets.sizes()
    }

    /// Number of pipeline variants created so far.
    #[must_use]
    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    /// Renders and presents one frame.
    ///
    /// A lost or outdated surface is reconfigured at its original size and
    /// the frame is skipped.
    pub fn render_frame(
        &mut self,
        renderer: &mut FrameRenderer,
        ctx: &mut FrameContext,
    ) -> RenderResult<()> {
        let Some(surface) = &self.surface else {
            return self.submit_frame(None, renderer, ctx);
        };

        let frame = match surface.get_current_texture() {
            Ok(frame) => frame,
            Err(err @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                log::warn!("surface {err}, reconfiguring and skipping frame");
                surface.configure(&self.device, &self.surface_config);
                return Ok(());
            }
            Err(err) => {
                log::error!("failed to acquire surface texture: {err}");
                return Err(err.into());
            }
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.submit_frame(Some(&view), renderer, ctx)?;
        frame.present();
        Ok(())
    }

    /// Records all passes into one encoder, uploads the frame's uniforms and
    /// submits.
    fn submit_frame(
        &mut self,
        surface_view: Option<&wgpu::TextureView>,
        renderer: &mut FrameRenderer,
        ctx: &mut FrameContext,
    ) -> RenderResult<()> {
        let screen_view = match surface_view {
            Some(view) => view,
            None => {
                &self
                    .targets
                    .offscreen_screen()
                    .ok_or(RenderError::SurfaceConfigurationFailed)?
                    .view
            }
        };

        self.arenas.reset();
        let mut gpu = WgpuFacade::new(
            &self.device,
            &mut self.pipelines,
            &mut self.arenas,
            &self.texture_groups,
            &self.meshes,
            &self.targets,
            screen_view,
            self.clear_color,
        );
        renderer.render_frame(&mut gpu, ctx);
        let encoder = gpu.finish();

        self.arenas.flush(&self.queue);
        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}
