//! The GPU command seam.
//!
//! The orchestrator drives the GPU only through [`GpuFacade`]: render-target
//! binding, viewport, face culling, depth test, clears and draws. The wgpu
//! backend lives in `mirrorscene-render`; [`crate::recording::RecordingFacade`]
//! records the same calls for tests.

/// A render destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderTarget {
    /// The window surface (or the headless screen texture) with its depth buffer.
    Screen,
    /// The depth-only shadow map.
    Shadow,
    /// Reflection color + depth targets.
    Reflection,
}

/// Shader program of a draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Program {
    /// Depth-only shadow caster.
    Shadow,
    /// Full-screen cubemap background.
    Skybox,
    /// Lit, shadowed sphere.
    Object,
    /// Mirror quad sampling the reflection target.
    Mirror,
}

impl Program {
    /// All programs in creation order.
    pub const ALL: [Program; 4] = [
        Program::Shadow,
        Program::Skybox,
        Program::Object,
        Program::Mirror,
    ];

    /// Debug label.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Program::Shadow => "shadow",
            Program::Skybox => "skybox",
            Program::Object => "object",
            Program::Mirror => "mirror",
        }
    }
}

/// Faces removed by culling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CullFace {
    /// Cull front faces.
    Front,
    /// Cull back faces.
    #[default]
    Back,
}

/// Toggleable fixed-function state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Depth testing and depth writes.
    DepthTest,
    /// Face culling (direction set by [`GpuFacade::set_cull_face`]).
    CullFace,
}

/// A pixel rectangle inside the bound target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Viewport covering a `width` x `height` target from the origin.
    #[must_use]
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }
}

/// Immutable sizes of the three render targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSizes {
    pub screen: (u32, u32),
    pub shadow: (u32, u32),
    pub reflection: (u32, u32),
}

impl TargetSizes {
    /// Derives target sizes from the screen size, the square shadow
    /// resolution and the reflection scale. The reflection target is never
    /// smaller than one pixel per side.
    #[must_use]
    pub fn new(screen: (u32, u32), shadow_resolution: u32, reflection_scale: f32) -> Self {
        let scaled = |v: u32| ((v as f32 * reflection_scale).floor() as u32).max(1);
        Self {
            screen,
            shadow: (shadow_resolution, shadow_resolution),
            reflection: (scaled(screen.0), scaled(screen.1)),
        }
    }

    /// Size of `target`.
    #[must_use]
    pub fn get(&self, target: RenderTarget) -> (u32, u32) {
        match target {
            RenderTarget::Screen => self.screen,
            RenderTarget::Shadow => self.shadow,
            RenderTarget::Reflection => self.reflection,
        }
    }
}

/// Stateful GPU command interface, modelled on a thin GL-style wrapper.
///
/// State set through this trait persists until changed: a bound target stays
/// bound, culling direction stays set, and so on. Callers that change state
/// for an offscreen pass restore it before returning.
pub trait GpuFacade {
    /// Makes `target` the destination of subsequent clears and draws.
    fn bind_framebuffer(&mut self, target: RenderTarget);

    /// Rebinds the screen target.
    fn bind_default_framebuffer(&mut self) {
        self.bind_framebuffer(RenderTarget::Screen);
    }

    /// Sets the viewport rectangle.
    fn set_viewport(&mut self, viewport: Viewport);

    /// Resets the viewport to the full screen.
    fn set_default_viewport(&mut self) {
        let (width, height) = self.target_size(RenderTarget::Screen);
        self.set_viewport(Viewport::full(width, height));
    }

    /// Chooses which faces culling removes.
    fn set_cull_face(&mut self, face: CullFace);

    /// Enables a capability.
    fn enable(&mut self, cap: Capability);

    /// Disables a capability.
    fn disable(&mut self, cap: Capability);

    /// Clears color and depth of the bound target.
    fn clear(&mut self);

    /// Draws `program`'s geometry with the given uniform block.
    fn draw(&mut self, program: Program, uniforms: &[u8]);

    /// Size of a render target in pixels.
    fn target_size(&self, target: RenderTarget) -> (u32, u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_sizes_scale_reflection() {
        let sizes = TargetSizes::new((1280, 720), 1000, 0.2);
        assert_eq!(sizes.get(RenderTarget::Screen), (1280, 720));
        assert_eq!(sizes.get(RenderTarget::Shadow), (1000, 1000));
        assert_eq!(sizes.get(RenderTarget::Reflection), (256, 144));
    }

    #[test]
    fn test_target_sizes_never_zero() {
        let sizes = TargetSizes::new((3, 2), 1, 0.1);
        assert_eq!(sizes.reflection, (1, 1));
    }

    #[test]
    fn test_default_cull_face_is_back() {
        assert_eq!(CullFace::default(), CullFace::Back);
    }
}
