//! [`GpuFacade`] on top of wgpu.
//!
//! Binding a target opens a render pass lazily on the next draw; `clear`
//! makes that pass start with clear load ops. Cull and depth toggles select
//! a cached pipeline variant. All passes of a frame go into one encoder.

use std::collections::HashMap;

use mirrorscene_core::{
    Capability, CullFace, GpuFacade, Program, RenderTarget, TargetSizes, Viewport,
};

use crate::buffer::SceneMeshes;
use crate::pipelines::{PipelineCache, PipelineKey};
use crate::targets::RenderTargets;
use crate::uniform_arena::ProgramArenas;

/// Fixed-function state as last set through the facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacadeState {
    pub target: RenderTarget,
    pub viewport: Viewport,
    pub cull_face: CullFace,
    pub depth_test: bool,
    pub culling: bool,
    /// The next pass on `target` starts by clearing it.
    pub pending_clear: bool,
}

impl FacadeState {
    /// Screen bound, full viewport, back-face culling and depth test on.
    #[must_use]
    pub fn new(sizes: &TargetSizes) -> Self {
        Self {
            target: RenderTarget::Screen,
            viewport: Viewport::full(sizes.screen.0, sizes.screen.1),
            cull_face: CullFace::Back,
            depth_test: true,
            culling: true,
            pending_clear: false,
        }
    }

    /// Pipeline variant for drawing `program` in this state.
    #[must_use]
    pub fn pipeline_key(&self, program: Program) -> PipelineKey {
        PipelineKey {
            program,
            target: self.target,
            depth_test: self.depth_test,
            cull: self.culling.then_some(self.cull_face),
        }
    }
}

/// Clips `viewport` to a `width` x `height` target. Returns `None` when
/// nothing is left.
#[must_use]
pub fn clamp_viewport(viewport: Viewport, (width, height): (u32, u32)) -> Option<Viewport> {
    if viewport.x >= width || viewport.y >= height {
        return None;
    }
    let clamped = Viewport {
        x: viewport.x,
        y: viewport.y,
        width: viewport.width.min(width - viewport.x),
        height: viewport.height.min(height - viewport.y),
    };
    (clamped.width > 0 && clamped.height > 0).then_some(clamped)
}

/// Color attachment list of a pass: empty for depth-only targets, whose
/// pipelines declare no color targets.
fn color_slots<T>(attachment: &Option<T>) -> &[Option<T>] {
    if attachment.is_some() {
        std::slice::from_ref(attachment)
    } else {
        &[]
    }
}

/// Frame-scoped wgpu implementation of [`GpuFacade`].
pub struct WgpuFacade<'a> {
    device: &'a wgpu::Device,
    pipelines: &'a mut PipelineCache,
    arenas: &'a mut ProgramArenas,
    texture_groups: &'a HashMap<Program, wgpu::BindGroup>,
    meshes: &'a SceneMeshes,
    targets: &'a RenderTargets,
    screen_view: &'a wgpu::TextureView,
    clear_color: wgpu::Color,
    encoder: wgpu::CommandEncoder,
    pass: Option<wgpu::RenderPass<'static>>,
    state: FacadeState,
}

impl<'a> WgpuFacade<'a> {
    /// Starts recording a frame that presents to `screen_view`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: &'a wgpu::Device,
        pipelines: &'a mut PipelineCache,
        arenas: &'a mut ProgramArenas,
        texture_groups: &'a HashMap<Program, wgpu::BindGroup>,
        meshes: &'a SceneMeshes,
        targets: &'a RenderTargets,
        screen_view: &'a wgpu::TextureView,
        clear_color: wgpu::Color,
    ) -> Self {
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame encoder"),
        });
        Self {
            device,
            pipelines,
            arenas,
            texture_groups,
            meshes,
            targets,
            screen_view,
            clear_color,
            encoder,
            pass: None,
            state: FacadeState::new(&targets.sizes()),
        }
    }

    /// Current fixed-function state.
    #[must_use]
    pub fn state(&self) -> FacadeState {
        self.state
    }

    /// Ends the open pass and returns the recorded commands.
    pub fn finish(mut self) -> wgpu::CommandEncoder {
        self.end_pass();
        self.flush_clear();
        self.encoder
    }

    fn end_pass(&mut self) {
        self.pass = None;
    }

    /// Records a pass that only clears, for a clear nobody drew after.
    fn flush_clear(&mut self) {
        if self.state.pending_clear {
            self.begin_pass();
            self.end_pass();
        }
    }

    fn begin_pass(&mut self) {
        let target = self.state.target;
        let clear = std::mem::take(&mut self.state.pending_clear);

        let color_view = match target {
            RenderTarget::Screen => Some(self.screen_view),
            RenderTarget::Reflection => Some(self.targets.reflection_view()),
            RenderTarget::Shadow => None,
        };
        let color_attachment = color_view.map(|view| wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: if clear {
                    wgpu::LoadOp::Clear(self.clear_color)
                } else {
                    wgpu::LoadOp::Load
                },
                store: wgpu::StoreOp::Store,
            },
        });

        let pass = self
            .encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(match target {
                    RenderTarget::Screen => "screen pass",
                    RenderTarget::Shadow => "shadow pass",
                    RenderTarget::Reflection => "reflection pass",
                }),
                color_attachments: color_slots(&color_attachment),
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.targets.depth_view(target),
                    depth_ops: Some(wgpu::Operations {
                        load: if clear {
                            wgpu::LoadOp::Clear(1.0)
                        } else {
                            wgpu::LoadOp::Load
                        },
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            })
            .forget_lifetime();

        self.pass = Some(pass);
        self.apply_viewport();
    }

    fn apply_viewport(&mut self) {
        let size = self.target_size(self.state.target);
        let Some(pass) = self.pass.as_mut() else {
            return;
        };
        let viewport = match clamp_viewport(self.state.viewport, size) {
            Some(v) if v == self.state.viewport => v,
            Some(v) => {
                log::warn!(
                    "viewport {:?} exceeds {:?} target, clamped",
                    self.state.viewport,
                    self.state.target
                );
                v
            }
            None => {
                log::warn!(
                    "viewport {:?} lies outside {:?} target",
                    self.state.viewport,
                    self.state.target
                );
                Viewport::full(size.0, size.1)
            }
        };
        pass.set_viewport(
            viewport.x as f32,
            viewport.y as f32,
            viewport.width as f32,
            viewport.height as f32,
            0.0,
            1.0,
        );
    }
}

impl GpuFacade for WgpuFacade<'_> {
    fn bind_framebuffer(&mut self, target: RenderTarget) {
        if target == self.state.target {
            return;
        }
        self.end_pass();
        self.flush_clear();
        self.state.target = target;
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.state.viewport = viewport;
        self.apply_viewport();
    }

    fn set_cull_face(&mut self, face: CullFace) {
        self.state.cull_face = face;
    }

    fn enable(&mut self, cap: Capability) {
        match cap {
            Capability::DepthTest => self.state.depth_test = true,
            Capability::CullFace => self.state.culling = true,
        }
    }

    fn disable(&mut self, cap: Capability) {
        match cap {
            Capability::DepthTest => self.state.depth_test = false,
            Capability::CullFace => self.state.culling = false,
        }
    }

    fn clear(&mut self) {
        self.end_pass();
        self.state.pending_clear = true;
    }

    fn draw(&mut self, program: Program, uniforms: &[u8]) {
        let offset = self.arenas.push(program, uniforms);
        let key = self.state.pipeline_key(program);
        if self.pass.is_none() {
            self.begin_pass();
        }

        let Some(uniform_group) = self.arenas.bind_group(program) else {
            log::warn!("no uniform arena for {} program", program.name());
            return;
        };
        let Some(pipeline) = self.pipelines.get(self.device, key) else {
            log::warn!("no pipeline for {key:?}");
            return;
        };
        let Some(pass) = self.pass.as_mut() else {
            return;
        };

        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, uniform_group, &[offset]);
        if let Some(group) = self.texture_groups.get(&program) {
            pass.set_bind_group(1, group, &[]);
        }
        self.meshes.for_program(program).draw(pass);
    }

    fn target_size(&self, target: RenderTarget) -> (u32, u32) {
        self.targets.sizes().get(target)
    }
}
