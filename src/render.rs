//! Flat buffers for a renderer.
//!
//! A renderer wants interleaved `f32` vertex data and a `u32` index list, not a
//! half-edge graph. [`RenderBuffers`] flattens one mesh level into exactly that,
//! with one render vertex per mesh vertex so the cached normals give smooth
//! shading and picked vertex indices map straight onto the buffer.

use bytemuck::{Pod, Zeroable};
use log::warn;

use crate::mesh::HalfEdgeMesh;

/// Interleaved vertex with position and normal.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct RenderVertex {
    /// Vertex position.
    pub position: [f32; 3],
    /// Unit vertex normal.
    pub normal: [f32; 3],
}

/// Vertex and index data ready for upload.
#[derive(Debug, Clone, Default)]
pub struct RenderBuffers {
    /// One entry per mesh vertex, in vertex index order.
    pub vertices: Vec<RenderVertex>,
    /// Three indices per triangle. Polygons are fan-triangulated.
    pub indices: Vec<u32>,
    /// Centroid of all vertices (for camera targeting).
    pub center: [f32; 3],
    /// Largest distance from `center` to a vertex (for camera distance).
    pub radius: f32,
}

impl RenderBuffers {
    /// Flatten a mesh for rendering.
    pub fn from_mesh(mesh: &HalfEdgeMesh) -> Self {
        let mut missing_normals = 0usize;
        let vertices: Vec<RenderVertex> = mesh
            .vertex_ids()
            .map(|v| {
                let p = mesh.position(v);
                let n = mesh.vertex_normal(v).unwrap_or_else(|| {
                    missing_normals += 1;
                    nalgebra::Vector3::z()
                });
                RenderVertex {
                    position: [p.x as f32, p.y as f32, p.z as f32],
                    normal: [n.x as f32, n.y as f32, n.z as f32],
                }
            })
            .collect();

        let mut indices = Vec::with_capacity(mesh.face_count() * 3);
        for f in mesh.face_ids() {
            let corners: Vec<u32> = mesh.face_vertices(f).map(|v| v.raw()).collect();
            for w in corners[1..].windows(2) {
                indices.extend_from_slice(&[corners[0], w[0], w[1]]);
            }
        }

        if missing_normals > 0 {
            warn!("{} vertices have no normal; using +Z", missing_normals);
        }

        let (center, radius) = bounding_sphere(&vertices);
        Self {
            vertices,
            indices,
            center,
            radius,
        }
    }

    /// Number of triangles in the index buffer.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Raw bytes of the vertex buffer.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw bytes of the index buffer.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Centroid and radius around it; a unit sphere at the origin when empty.
fn bounding_sphere(vertices: &[RenderVertex]) -> ([f32; 3], f32) {
    if vertices.is_empty() {
        return ([0.0; 3], 1.0);
    }

    let mut sum = [0.0_f64; 3];
    for v in vertices {
        for i in 0..3 {
            sum[i] += v.position[i] as f64;
        }
    }
    let n = vertices.len() as f64;
    let center = sum.map(|s| (s / n) as f32);

    let radius = vertices
        .iter()
        .map(|v| {
            let dx = v.position[0] - center[0];
            let dy = v.position[1] - center[1];
            let dz = v.position[2] - center[2];
            dx * dx + dy * dy + dz * dz
        })
        .fold(0.0_f32, f32::max)
        .sqrt();

    (center, radius)
}
