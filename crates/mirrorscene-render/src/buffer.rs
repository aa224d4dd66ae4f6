//! GPU buffer management.

use mirrorscene_core::mesh::{uv_sphere, unit_plane, MeshData, Vertex};
use mirrorscene_core::{ObjectConfig, Program};
use wgpu::util::DeviceExt;

/// Creates a vertex buffer from data.
pub fn create_vertex_buffer<T: bytemuck::Pod>(
    device: &wgpu::Device,
    data: &[T],
    label: Option<&str>,
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label,
        contents: bytemuck::cast_slice(data),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    })
}

/// Creates an index buffer from data.
pub fn create_index_buffer(
    device: &wgpu::Device,
    data: &[u32],
    label: Option<&str>,
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label,
        contents: bytemuck::cast_slice(data),
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
    })
}

/// Vertex layout of [`Vertex`]: position, normal, uv at locations 0..2.
pub const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

/// Buffer layout shared by every pipeline.
#[must_use]
pub fn vertex_buffer_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRIBUTES,
    }
}

/// An uploaded indexed mesh.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl GpuMesh {
    /// Uploads `mesh`.
    #[must_use]
    pub fn upload(device: &wgpu::Device, mesh: &MeshData, label: &str) -> Self {
        Self {
            vertex_buffer: create_vertex_buffer(
                device,
                &mesh.vertices,
                Some(&format!("{label} vertices")),
            ),
            index_buffer: create_index_buffer(
                device,
                &mesh.indices,
                Some(&format!("{label} indices")),
            ),
            index_count: mesh.indices.len() as u32,
        }
    }

    /// Binds the buffers and draws every index.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// The two meshes of the scene.
pub struct SceneMeshes {
    /// Drawn by the shadow and object programs.
    pub sphere: GpuMesh,
    /// Skybox and mirror quad.
    pub plane: GpuMesh,
}

impl SceneMeshes {
    /// Builds and uploads the sphere and the unit plane.
    #[must_use]
    pub fn new(device: &wgpu::Device, object: &ObjectConfig) -> Self {
        let sphere = uv_sphere(object.rings, object.segments);
        log::debug!(
            "sphere mesh: {} vertices, {} triangles",
            sphere.vertices.len(),
            sphere.triangle_count()
        );
        Self {
            sphere: GpuMesh::upload(device, &sphere, "sphere"),
            plane: GpuMesh::upload(device, &unit_plane(), "plane"),
        }
    }

    /// Geometry drawn by `program`.
    #[must_use]
    pub fn for_program(&self, program: Program) -> &GpuMesh {
        match program {
            Program::Shadow | Program::Object => &self.sphere,
            Program::Skybox | Program::Mirror => &self.plane,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_attribute_offsets() {
        assert_eq!(VERTEX_ATTRIBUTES[0].offset, 0);
        assert_eq!(VERTEX_ATTRIBUTES[1].offset, 12);
        assert_eq!(VERTEX_ATTRIBUTES[2].offset, 24);
        assert_eq!(vertex_buffer_layout().array_stride, 32);
    }
}
