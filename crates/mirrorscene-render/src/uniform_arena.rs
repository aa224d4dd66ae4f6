//! Per-program uniform buffers addressed with dynamic offsets.
//!
//! Each draw appends its uniform block to the program's arena and binds it at
//! the returned offset. Blocks are staged on the CPU and uploaded with a
//! single write before the frame's command buffer is submitted, so two draws
//! of the same program within a frame keep their own values.

use std::collections::HashMap;
use std::num::NonZeroU64;

use mirrorscene_core::{MirrorUniforms, ObjectUniforms, Program, ShadowUniforms, SkyboxUniforms};

/// Slots per program and frame. A frame draws each program at most twice.
pub const DEFAULT_SLOTS: u32 = 8;

/// Rounds `value` up to a multiple of `alignment`.
#[must_use]
pub fn align_up(value: u64, alignment: u64) -> u64 {
    value.div_ceil(alignment) * alignment
}

/// Byte size of `program`'s uniform block, light arrays included.
#[must_use]
pub fn block_size(program: Program, num_lights: usize) -> u64 {
    let size = match program {
        Program::Shadow => std::mem::size_of::<ShadowUniforms>(),
        Program::Skybox => std::mem::size_of::<SkyboxUniforms>(),
        Program::Object => std::mem::size_of::<ObjectUniforms>() + 2 * 16 * num_lights,
        Program::Mirror => std::mem::size_of::<MirrorUniforms>(),
    };
    size as u64
}

/// CPU side of an arena: fixed-stride slots filled in draw order.
#[derive(Debug, Clone)]
pub struct StagingBlocks {
    block_size: u64,
    stride: u64,
    capacity: u32,
    len: u32,
    data: Vec<u8>,
}

impl StagingBlocks {
    /// Creates `capacity` slots of `block_size` bytes spaced `alignment` apart.
    #[must_use]
    pub fn new(block_size: u64, alignment: u64, capacity: u32) -> Self {
        let stride = align_up(block_size, alignment);
        Self {
            block_size,
            stride,
            capacity,
            len: 0,
            data: vec![0; (stride * u64::from(capacity)) as usize],
        }
    }

    /// Copies `bytes` into the next slot and returns its offset. Short blocks
    /// are zero-padded, long ones truncated. When every slot is taken the
    /// last slot is overwritten.
    pub fn push(&mut self, bytes: &[u8]) -> u32 {
        if bytes.len() as u64 != self.block_size {
            log::warn!(
                "uniform block is {} bytes, expected {}",
                bytes.len(),
                self.block_size
            );
        }
        let slot = if self.len < self.capacity {
            self.len += 1;
            self.len - 1
        } else {
            log::warn!("uniform arena full ({} slots), reusing last slot", self.capacity);
            self.capacity - 1
        };

        let start = (u64::from(slot) * self.stride) as usize;
        let block = &mut self.data[start..start + self.block_size as usize];
        let n = bytes.len().min(block.len());
        block[..n].copy_from_slice(&bytes[..n]);
        block[n..].fill(0);
        (u64::from(slot) * self.stride) as u32
    }

    /// Bytes of every slot used so far.
    #[must_use]
    pub fn used(&self) -> &[u8] {
        &self.data[..(u64::from(self.len) * self.stride) as usize]
    }

    /// Number of filled slots.
    #[must_use]
    pub fn len(&self) -> u32 {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Distance between slots.
    #[must_use]
    pub fn stride(&self) -> u64 {
        self.stride
    }

    /// Forgets all slots.
    pub fn reset(&mut self) {
        self.len = 0;
    }
}

/// One program's uniform buffer with its bind group.
pub struct UniformArena {
    staging: StagingBlocks,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl UniformArena {
    /// Creates the buffer and a bind group exposing one block at a time.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        program: Program,
        block_size: u64,
        slots: u32,
    ) -> Self {
        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let staging = StagingBlocks::new(block_size, alignment, slots);

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{} uniforms", program.name())),
            size: staging.stride() * u64::from(slots),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} uniform bind group", program.name())),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(block_size),
                }),
            }],
        });

        Self {
            staging,
            buffer,
            bind_group,
        }
    }

    /// Bind group for group 0 of the program's pipelines.
    #[must_use]
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// Uniform arenas of all four programs.
pub struct ProgramArenas {
    arenas: HashMap<Program, UniformArena>,
}

impl ProgramArenas {
    /// Creates an arena per program sized for `num_lights` lights.
    #[must_use]
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, num_lights: usize) -> Self {
        let arenas = Program::ALL
            .iter()
            .map(|&program| {
                let size = block_size(program, num_lights);
                let arena = UniformArena::new(device, layout, program, size, DEFAULT_SLOTS);
                (program, arena)
            })
            .collect();
        Self { arenas }
    }

    /// Stages a block for `program` and returns its dynamic offset.
    pub fn push(&mut self, program: Program, bytes: &[u8]) -> u32 {
        self.arenas
            .get_mut(&program)
            .map_or(0, |arena| arena.staging.push(bytes))
    }

    /// Group 0 bind group of `program`.
    #[must_use]
    pub fn bind_group(&self, program: Program) -> Option<&wgpu::BindGroup> {
        self.arenas.get(&program).map(UniformArena::bind_group)
    }

    /// Uploads every staged block.
    pub fn flush(&self, queue: &wgpu::Queue) {
        for arena in self.arenas.values() {
            if !arena.staging.is_empty() {
                queue.write_buffer(&arena.buffer, 0, arena.staging.used());
            }
        }
    }

    /// Starts a new frame.
    pub fn reset(&mut self) {
        for arena in self.arenas.values_mut() {
            arena.staging.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(64, 256), 256);
        assert_eq!(align_up(256, 256), 256);
        assert_eq!(align_up(352, 256), 512);
        assert_eq!(align_up(80, 16), 80);
    }

    #[test]
    fn test_block_sizes() {
        assert_eq!(block_size(Program::Shadow, 2), 64);
        assert_eq!(block_size(Program::Skybox, 2), 64);
        assert_eq!(block_size(Program::Mirror, 2), 80);
        assert_eq!(block_size(Program::Object, 2), 288 + 64);
        assert_eq!(block_size(Program::Object, 3), 288 + 96);
    }

    #[test]
    fn test_slots_are_strided() {
        let mut blocks = StagingBlocks::new(64, 256, 4);
        assert_eq!(blocks.push(&[1; 64]), 0);
        assert_eq!(blocks.push(&[2; 64]), 256);
        assert_eq!(blocks.len(), 2);

        let used = blocks.used();
        assert_eq!(used.len(), 512);
        assert!(used[..64].iter().all(|&b| b == 1));
        assert!(used[256..320].iter().all(|&b| b == 2));
    }

    #[test]
    fn test_full_arena_reuses_last_slot() {
        let mut blocks = StagingBlocks::new(16, 16, 2);
        blocks.push(&[1; 16]);
        blocks.push(&[2; 16]);
        assert_eq!(blocks.push(&[3; 16]), 16);
        assert_eq!(blocks.len(), 2);
        assert!(blocks.used()[16..].iter().all(|&b| b == 3));
    }

    #[test]
    fn test_short_blocks_zero_padded_and_reset() {
        let mut blocks = StagingBlocks::new(8, 8, 2);
        blocks.push(&[9; 8]);
        blocks.reset();
        assert!(blocks.is_empty());
        blocks.push(&[5; 4]);
        assert_eq!(blocks.used(), &[5, 5, 5, 5, 0, 0, 0, 0]);
    }

    proptest! {
        #[test]
        fn prop_offsets_are_aligned_and_distinct(
            block in 1u64..600,
            align_pow in 2u32..9,
            pushes in 1usize..12,
        ) {
            let alignment = 1u64 << align_pow;
            let mut blocks = StagingBlocks::new(block, alignment, DEFAULT_SLOTS);
            let bytes = vec![7; block as usize];
            let offsets: Vec<u32> = (0..pushes).map(|_| blocks.push(&bytes)).collect();

            prop_assert!(blocks.stride() >= block);
            for (i, &offset) in offsets.iter().enumerate() {
                prop_assert_eq!(u64::from(offset) % alignment, 0);
                if i < DEFAULT_SLOTS as usize {
                    prop_assert_eq!(u64::from(offset), i as u64 * blocks.stride());
                }
            }
            prop_assert_eq!(blocks.len() as usize, pushes.min(DEFAULT_SLOTS as usize));
        }
    }
}
