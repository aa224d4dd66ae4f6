//! Render pipelines for the four programs.
//!
//! Culling and depth testing are fixed-function state in wgpu, so every
//! combination a frame uses becomes its own pipeline. Variants are created on
//! first use and cached by [`PipelineKey`].

use std::collections::HashMap;

use mirrorscene_core::{CullFace, Program, RenderTarget};

use crate::buffer::vertex_buffer_layout;
use crate::error::RenderResult;
use crate::shader::ShaderBuilder;
use crate::targets::{RenderTargets, TargetFormats, DEPTH_FORMAT};
use crate::textures::SceneTextures;

/// Everything that selects a pipeline variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub program: Program,
    pub target: RenderTarget,
    pub depth_test: bool,
    /// `None` when culling is disabled.
    pub cull: Option<CullFace>,
}

/// Primitive state for a cull setting. Front faces wind counter-clockwise.
#[must_use]
pub fn primitive_state(cull: Option<CullFace>) -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: cull.map(|face| match face {
            CullFace::Front => wgpu::Face::Front,
            CullFace::Back => wgpu::Face::Back,
        }),
        ..Default::default()
    }
}

/// Depth state. With the test off every fragment passes and depth is left
/// untouched.
#[must_use]
pub fn depth_stencil_state(depth_test: bool) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: depth_test,
        depth_compare: if depth_test {
            wgpu::CompareFunction::Less
        } else {
            wgpu::CompareFunction::Always
        },
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

fn texture_entry(
    binding: u32,
    sample_type: wgpu::TextureSampleType,
    view_dimension: wgpu::TextureViewDimension,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type,
            view_dimension,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32, ty: wgpu::SamplerBindingType) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(ty),
        count: None,
    }
}

/// Group 1 layout of `program`; the shadow program samples nothing.
fn texture_layout_entries(program: Program) -> Vec<wgpu::BindGroupLayoutEntry> {
    let float = wgpu::TextureSampleType::Float { filterable: true };
    match program {
        Program::Shadow => Vec::new(),
        Program::Skybox => vec![
            texture_entry(0, float, wgpu::TextureViewDimension::Cube),
            sampler_entry(1, wgpu::SamplerBindingType::Filtering),
        ],
        Program::Object => vec![
            texture_entry(
                0,
                wgpu::TextureSampleType::Depth,
                wgpu::TextureViewDimension::D2,
            ),
            sampler_entry(1, wgpu::SamplerBindingType::Comparison),
            texture_entry(2, float, wgpu::TextureViewDimension::Cube),
            sampler_entry(3, wgpu::SamplerBindingType::Filtering),
        ],
        Program::Mirror => vec![
            texture_entry(0, float, wgpu::TextureViewDimension::D2),
            texture_entry(1, float, wgpu::TextureViewDimension::D2),
            sampler_entry(2, wgpu::SamplerBindingType::Filtering),
        ],
    }
}

fn shader_source(program: Program) -> &'static str {
    match program {
        Program::Shadow => include_str!("shaders/shadow.wgsl"),
        Program::Skybox => include_str!("shaders/skybox.wgsl"),
        Program::Object => include_str!("shaders/object.wgsl"),
        Program::Mirror => include_str!("shaders/mirror.wgsl"),
    }
}

struct ProgramState {
    module: wgpu::ShaderModule,
    layout: wgpu::PipelineLayout,
    texture_layout: Option<wgpu::BindGroupLayout>,
}

/// Shader modules, layouts and the pipeline variants built from them.
pub struct PipelineCache {
    uniform_layout: wgpu::BindGroupLayout,
    programs: HashMap<Program, ProgramState>,
    formats: TargetFormats,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl PipelineCache {
    /// Compiles the four programs. The object shader is specialised for
    /// `num_lights` lights.
    pub fn new(
        device: &wgpu::Device,
        formats: TargetFormats,
        num_lights: usize,
    ) -> RenderResult<Self> {
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform bind group layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let mut programs = HashMap::new();
        for program in Program::ALL {
            let module = ShaderBuilder::new()
                .with_source(shader_source(program))
                .with_define("NUM_LIGHTS", num_lights)
                .with_label(format!("{} shader", program.name()))
                .build_module(device)?;

            let entries = texture_layout_entries(program);
            let texture_layout = (!entries.is_empty()).then(|| {
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some(&format!("{} texture bind group layout", program.name())),
                    entries: &entries,
                })
            });

            let mut bind_group_layouts = vec![&uniform_layout];
            bind_group_layouts.extend(texture_layout.as_ref());
            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("{} pipeline layout", program.name())),
                bind_group_layouts: &bind_group_layouts,
                push_constant_ranges: &[],
            });

            programs.insert(
                program,
                ProgramState {
                    module,
                    layout,
                    texture_layout,
                },
            );
        }

        Ok(Self {
            uniform_layout,
            programs,
            formats,
            pipelines: HashMap::new(),
        })
    }

    /// Layout of group 0, shared by all programs.
    #[must_use]
    pub fn uniform_layout(&self) -> &wgpu::BindGroupLayout {
        &self.uniform_layout
    }

    /// Layout of `program`'s group 1.
    #[must_use]
    pub fn texture_layout(&self, program: Program) -> Option<&wgpu::BindGroupLayout> {
        self.programs
            .get(&program)
            .and_then(|p| p.texture_layout.as_ref())
    }

    /// Number of variants created so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    /// Returns the variant for `key`, creating it on first use.
    pub fn get(
        &mut self,
        device: &wgpu::Device,
        key: PipelineKey,
    ) -> Option<&wgpu::RenderPipeline> {
        if !self.pipelines.contains_key(&key) {
            let pipeline = self.create(device, key)?;
            self.pipelines.insert(key, pipeline);
        }
        self.pipelines.get(&key)
    }

    fn create(&self, device: &wgpu::Device, key: PipelineKey) -> Option<wgpu::RenderPipeline> {
        let program = self.programs.get(&key.program)?;
        log::debug!("creating pipeline variant {key:?}");

        let label = format!("{} pipeline ({:?})", key.program.name(), key.target);
        let color_targets = [self.formats.color(key.target).map(|format| wgpu::ColorTargetState {
            format,
            blend: None,
            write_mask: wgpu::ColorWrites::ALL,
        })];

        // Depth-only targets run no fragment stage.
        let fragment = self
            .formats
            .color(key.target)
            .map(|_| wgpu::FragmentState {
                module: &program.module,
                entry_point: Some("fs_main"),
                targets: &color_targets,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&label),
            layout: Some(&program.layout),
            vertex: wgpu::VertexState {
                module: &program.module,
                entry_point: Some("vs_main"),
                buffers: &[vertex_buffer_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment,
            primitive: primitive_state(key.cull),
            depth_stencil: Some(depth_stencil_state(key.depth_test)),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });
        Some(pipeline)
    }

    /// Creates the group 1 bind groups of every program that samples textures.
    #[must_use]
    pub fn texture_bind_groups(
        &self,
        device: &wgpu::Device,
        targets: &RenderTargets,
        textures: &SceneTextures,
    ) -> HashMap<Program, wgpu::BindGroup> {
        let mut groups = HashMap::new();
        for program in Program::ALL {
            let Some(layout) = self.texture_layout(program) else {
                continue;
            };
            let resources: Vec<wgpu::BindingResource<'_>> = match program {
                Program::Shadow => continue,
                Program::Skybox => vec![
                    wgpu::BindingResource::TextureView(&textures.cubemap_view),
                    wgpu::BindingResource::Sampler(&textures.linear_sampler),
                ],
                Program::Object => vec![
                    wgpu::BindingResource::TextureView(targets.shadow_view()),
                    wgpu::BindingResource::Sampler(&textures.shadow_sampler),
                    wgpu::BindingResource::TextureView(&textures.cubemap_view),
                    wgpu::BindingResource::Sampler(&textures.linear_sampler),
                ],
                Program::Mirror => vec![
                    wgpu::BindingResource::TextureView(targets.reflection_view()),
                    wgpu::BindingResource::TextureView(&textures.distortion_view),
                    wgpu::BindingResource::Sampler(&textures.linear_sampler),
                ],
            };
            let entries: Vec<wgpu::BindGroupEntry<'_>> = (0u32..)
                .zip(resources)
                .map(|(binding, resource)| wgpu::BindGroupEntry { binding, resource })
                .collect();

            let group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("{} texture bind group", program.name())),
                layout,
                entries: &entries,
            });
            groups.insert(program, group);
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cull_mapping() {
        assert_eq!(primitive_state(None).cull_mode, None);
        assert_eq!(
            primitive_state(Some(CullFace::Front)).cull_mode,
            Some(wgpu::Face::Front)
        );
        assert_eq!(
            primitive_state(Some(CullFace::Back)).cull_mode,
            Some(wgpu::Face::Back)
        );
        assert_eq!(primitive_state(None).front_face, wgpu::FrontFace::Ccw);
    }

    #[test]
    fn test_depth_off_passes_everything_without_writes() {
        let off = depth_stencil_state(false);
        assert!(!off.depth_write_enabled);
        assert_eq!(off.depth_compare, wgpu::CompareFunction::Always);

        let on = depth_stencil_state(true);
        assert!(on.depth_write_enabled);
        assert_eq!(on.depth_compare, wgpu::CompareFunction::Less);
    }

    #[test]
    fn test_texture_layouts() {
        assert!(texture_layout_entries(Program::Shadow).is_empty());
        assert_eq!(texture_layout_entries(Program::Skybox).len(), 2);
        assert_eq!(texture_layout_entries(Program::Object).len(), 4);
        assert_eq!(texture_layout_entries(Program::Mirror).len(), 3);
    }

    #[test]
    fn test_every_program_resolves_its_template() {
        for program in Program::ALL {
            let source = ShaderBuilder::new()
                .with_source(shader_source(program))
                .with_define("NUM_LIGHTS", 2)
                .source()
                .unwrap();
            assert!(source.contains("fn vs_main"));
        }
    }
}
