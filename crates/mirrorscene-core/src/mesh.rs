//! Generated scene geometry.
//!
//! The demo needs a sphere and a unit quad; both are built here instead of
//! being loaded from files.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

/// Interleaved vertex shared by every program.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Indexed triangle list.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Positions of triangle `i`.
    #[must_use]
    pub fn triangle(&self, i: usize) -> [Vec3; 3] {
        let corner =
            |k: usize| Vec3::from(self.vertices[self.indices[i * 3 + k] as usize].position);
        [corner(0), corner(1), corner(2)]
    }
}

/// UV sphere of radius 1 with outward normals and counter-clockwise
/// winding seen from outside.
#[must_use]
pub fn uv_sphere(rings: u32, segments: u32) -> MeshData {
    let mut vertices = Vec::with_capacity(((rings + 1) * (segments + 1)) as usize);
    for r in 0..=rings {
        let v = r as f32 / rings as f32;
        let theta = v * PI;
        for s in 0..=segments {
            let u = s as f32 / segments as f32;
            let phi = u * TAU;
            let n = Vec3::new(theta.sin() * phi.sin(), theta.cos(), theta.sin() * phi.cos());
            vertices.push(Vertex {
                position: n.to_array(),
                normal: n.to_array(),
                uv: Vec2::new(u, v).to_array(),
            });
        }
    }

    let stride = segments + 1;
    let mut indices = Vec::with_capacity((rings * segments * 6) as usize);
    for r in 0..rings {
        for s in 0..segments {
            let a = r * stride + s;
            let b = a + stride;
            if r != 0 {
                indices.extend_from_slice(&[a, b, a + 1]);
            }
            if r != rings - 1 {
                indices.extend_from_slice(&[a + 1, b, b + 1]);
            }
        }
    }

    MeshData { vertices, indices }
}

/// Quad spanning [-1, 1] on X and Z at y = 0, facing +Y.
///
/// The skybox reuses it as a full-screen quad by reading `position.xz` as
/// clip-space coordinates.
#[must_use]
pub fn unit_plane() -> MeshData {
    let corner = |x: f32, z: f32| Vertex {
        position: [x, 0.0, z],
        normal: [0.0, 1.0, 0.0],
        uv: [(x + 1.0) * 0.5, (z + 1.0) * 0.5],
    };
    MeshData {
        vertices: vec![
            corner(-1.0, -1.0),
            corner(-1.0, 1.0),
            corner(1.0, 1.0),
            corner(1.0, -1.0),
        ],
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}
