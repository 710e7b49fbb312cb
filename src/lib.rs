//! # Loupe
//!
//! Half-edge meshes, Loop subdivision, and vertex picking for interactive
//! mesh viewers.
//!
//! Loupe builds a manifold half-edge mesh from raw imported geometry, refines
//! it one Loop subdivision level at a time, and answers nearest-vertex queries
//! on whichever level is being shown. Every level is an independent, read-only
//! value, so a viewer can keep all of them and switch between them instantly.
//!
//! ## Features
//!
//! - **Half-edge data structure**: flat arenas with typed `u32` indices
//! - **Loop subdivision**: boundary-aware, never mutates its input
//! - **Subdivision levels**: [`MeshSequence`](sequence::MeshSequence) computes
//!   and keeps levels on demand
//! - **Picking**: deterministic nearest-vertex lookup in world or screen space
//! - **Render buffers**: interleaved `f32` vertices and `u32` indices
//! - **OBJ import/export**
//!
//! ## Quick Start
//!
//! ```
//! use loupe::prelude::*;
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//! let faces = vec![
//!     [0, 2, 1], // bottom
//!     [0, 1, 3], // front
//!     [1, 2, 3], // right
//!     [2, 0, 3], // left
//! ];
//!
//! let mut levels = MeshSequence::from_geometry(&positions, &faces).unwrap();
//! let level1 = levels.ensure_level(1).unwrap();
//! assert_eq!(level1.vertex_count(), 10);
//! assert_eq!(level1.face_count(), 16);
//!
//! let picked = nearest_vertex(levels.base(), &Point3::new(0.1, 0.0, 0.0), 0.5);
//! assert_eq!(picked, Some(0));
//! ```
//!
//! ## Mesh Traversal
//!
//! ```
//! use loupe::prelude::*;
//! use nalgebra::Point3;
//!
//! # let positions = vec![
//! #     Point3::new(0.0, 0.0, 0.0),
//! #     Point3::new(1.0, 0.0, 0.0),
//! #     Point3::new(0.5, 1.0, 0.0),
//! # ];
//! let mesh = build_from_triangles(&positions, &[[0, 1, 2]]).unwrap();
//!
//! // Ordered neighbours of a vertex
//! let v = VertexId::new(0);
//! for neighbor in mesh.one_ring(v).unwrap() {
//!     println!("Neighbor: {:?}", neighbor);
//! }
//!
//! // Vertices of a face
//! let corners: Vec<VertexId> = mesh.face_vertices(FaceId::new(0)).collect();
//! assert_eq!(corners.len(), 3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod io;
pub mod mesh;
pub mod render;
pub mod sequence;

/// Prelude module for convenient imports.
///
/// ```
/// use loupe::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::pick::nearest_vertex;
    pub use crate::algo::subdivide::subdivide;
    pub use crate::error::{BuildError, MeshError, Result, SubdivisionError, TopologyError};
    pub use crate::mesh::{
        build_from_triangles, build_mesh, FaceId, HalfEdgeId, HalfEdgeMesh, VertexId,
    };
    pub use crate::render::RenderBuffers;
    pub use crate::sequence::MeshSequence;
}

// Re-export nalgebra types for convenience
pub use nalgebra;
