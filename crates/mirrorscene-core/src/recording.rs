//! A [`GpuFacade`] that records commands and tracks state without a GPU.

use crate::facade::{
    Capability, CullFace, GpuFacade, Program, RenderTarget, TargetSizes, Viewport,
};

/// Fixed-function state as seen by the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuState {
    pub framebuffer: RenderTarget,
    pub viewport: Viewport,
    pub cull_face: CullFace,
    pub depth_test: bool,
    pub culling: bool,
}

/// A recorded draw together with the state it was issued under.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub program: Program,
    pub state: GpuState,
    pub uniforms: Vec<u8>,
}

impl DrawRecord {
    /// Reads the leading uniform block as `T`.
    #[must_use]
    pub fn uniforms_as<T: bytemuck::Pod>(&self) -> T {
        bytemuck::pod_read_unaligned(&self.uniforms[..std::mem::size_of::<T>()])
    }

    /// Reads the `vec4` rows following a leading block of type `T`.
    #[must_use]
    pub fn trailer_after<T>(&self) -> Vec<[f32; 4]> {
        self.uniforms[std::mem::size_of::<T>()..]
            .chunks_exact(16)
            .map(bytemuck::pod_read_unaligned)
            .collect()
    }
}

/// A recorded facade call.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    BindFramebuffer(RenderTarget),
    SetViewport(Viewport),
    SetCullFace(CullFace),
    Enable(Capability),
    Disable(Capability),
    Clear(RenderTarget),
    Draw(DrawRecord),
}

/// Records every call and mirrors GL-style state changes.
///
/// Initial state matches a freshly created context after setup: screen bound,
/// full-screen viewport, back-face culling, depth test and culling enabled.
#[derive(Debug, Clone)]
pub struct RecordingFacade {
    sizes: TargetSizes,
    state: GpuState,
    commands: Vec<Command>,
}

impl RecordingFacade {
    /// Creates a recorder for targets of the given sizes.
    #[must_use]
    pub fn new(sizes: TargetSizes) -> Self {
        Self {
            sizes,
            state: GpuState {
                framebuffer: RenderTarget::Screen,
                viewport: Viewport::full(sizes.screen.0, sizes.screen.1),
                cull_face: CullFace::Back,
                depth_test: true,
                culling: true,
            },
            commands: Vec::new(),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> GpuState {
        self.state
    }

    /// All recorded commands.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Recorded draws in issue order.
    pub fn draws(&self) -> impl Iterator<Item = &DrawRecord> {
        self.commands.iter().filter_map(|c| match c {
            Command::Draw(d) => Some(d),
            _ => None,
        })
    }

    /// Forgets recorded commands, keeping state.
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }
}

impl GpuFacade for RecordingFacade {
    fn bind_framebuffer(&mut self, target: RenderTarget) {
        self.state.framebuffer = target;
        self.commands.push(Command::BindFramebuffer(target));
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.state.viewport = viewport;
        self.commands.push(Command::SetViewport(viewport));
    }

    fn set_cull_face(&mut self, face: CullFace) {
        self.state.cull_face = face;
        self.commands.push(Command::SetCullFace(face));
    }

    fn enable(&mut self, cap: Capability) {
        match cap {
            Capability::DepthTest => self.state.depth_test = true,
            Capability::CullFace => self.state.culling = true,
        }
        self.commands.push(Command::Enable(cap));
    }

    fn disable(&mut self, cap: Capability) {
        match cap {
            Capability::DepthTest => self.state.depth_test = false,
            Capability::CullFace => self.state.culling = false,
        }
        self.commands.push(Command::Disable(cap));
    }

    fn clear(&mut self) {
        self.commands.push(Command::Clear(self.state.framebuffer));
    }

    fn draw(&mut self, program: Program, uniforms: &[u8]) {
        self.commands.push(Command::Draw(DrawRecord {
            program,
            state: self.state,
            uniforms: uniforms.to_vec(),
        }));
    }

    fn target_size(&self, target: RenderTarget) -> (u32, u32) {
        self.sizes.get(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> RecordingFacade {
        RecordingFacade::new(TargetSizes::new((640, 480), 256, 0.5))
    }

    #[test]
    fn test_initial_state() {
        let gpu = recorder();
        let s = gpu.state();
        assert_eq!(s.framebuffer, RenderTarget::Screen);
        assert_eq!(s.viewport, Viewport::full(640, 480));
        assert_eq!(s.cull_face, CullFace::Back);
        assert!(s.depth_test && s.culling);
    }

    #[test]
    fn test_default_helpers_restore_screen() {
        let mut gpu = recorder();
        gpu.bind_framebuffer(RenderTarget::Shadow);
        gpu.set_viewport(Viewport::full(256, 256));
        gpu.bind_default_framebuffer();
        gpu.set_default_viewport();
        assert_eq!(gpu.state().framebuffer, RenderTarget::Screen);
        assert_eq!(gpu.state().viewport, Viewport::full(640, 480));
    }

    #[test]
    fn test_draw_captures_state() {
        let mut gpu = recorder();
        gpu.disable(Capability::DepthTest);
        gpu.draw(Program::Skybox, &[0u8; 4]);
        gpu.enable(Capability::DepthTest);

        let draw = gpu.draws().next().unwrap();
        assert!(!draw.state.depth_test);
        assert!(gpu.state().depth_test);
        assert_eq!(gpu.commands().len(), 3);
    }
}
