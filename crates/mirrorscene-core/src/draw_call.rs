//! Long-lived draw calls.

use crate::facade::{GpuFacade, Program};

/// A program paired with a uniform block that is updated in place every
/// frame and issued to a [`GpuFacade`].
///
/// Optional trailing rows (`vec4` each) are appended after the block; the
/// object program uses them for its light arrays.
#[derive(Debug, Clone)]
pub struct DrawCall<U> {
    program: Program,
    /// The uniform block, mutated before each draw.
    pub uniforms: U,
    trailer: Vec<[f32; 4]>,
    bytes: Vec<u8>,
}

impl<U: bytemuck::Pod> DrawCall<U> {
    /// Creates a draw call for `program` with initial uniforms.
    pub fn new(program: Program, uniforms: U) -> Self {
        Self {
            program,
            uniforms,
            trailer: Vec::new(),
            bytes: Vec::new(),
        }
    }

    /// Mutable access to the trailing rows.
    pub fn trailer_mut(&mut self) -> &mut Vec<[f32; 4]> {
        &mut self.trailer
    }

    /// Serializes the current uniforms and issues the draw.
    pub fn draw(&mut self, gpu: &mut impl GpuFacade) {
        self.bytes.clear();
        self.bytes
            .extend_from_slice(bytemuck::bytes_of(&self.uniforms));
        self.bytes
            .extend_from_slice(bytemuck::cast_slice(&self.trailer));
        gpu.draw(self.program, &self.bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{Command, RecordingFacade};
    use crate::uniforms::SkyboxUniforms;
    use crate::facade::TargetSizes;

    #[test]
    fn test_draw_serializes_uniforms_and_trailer() {
        let mut gpu = RecordingFacade::new(TargetSizes::new((100, 100), 10, 0.5));
        let mut call = DrawCall::new(Program::Skybox, SkyboxUniforms::default());
        call.trailer_mut().push([1.0, 2.0, 3.0, 4.0]);
        call.draw(&mut gpu);

        let Command::Draw(draw) = &gpu.commands()[0] else {
            panic!("expected a draw");
        };
        assert_eq!(draw.program, Program::Skybox);
        assert_eq!(draw.uniforms.len(), 64 + 16);
        let tail: [f32; 4] = bytemuck::pod_read_unaligned(&draw.uniforms[64..]);
        assert_eq!(tail, [1.0, 2.0, 3.0, 4.0]);
    }
}
