//! Core mesh data structures.
//!
//! This module provides the half-edge mesh representation and the builder
//! that assembles it from raw geometry.
//!
//! # Overview
//!
//! The primary type is [`HalfEdgeMesh`], a half-edge (doubly-connected edge
//! list) structure stored as flat arenas of vertices, half-edges, and faces.
//! Links between elements are plain indices, so the cyclic adjacency graph
//! has no ownership ambiguity and a mesh can be cloned or shared freely.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe `u32` index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`FaceId`] - Identifies a face
//!
//! # Construction
//!
//! ```
//! use loupe::mesh::{build_from_triangles, VertexId};
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let mesh = build_from_triangles(&positions, &[[0, 1, 2]]).unwrap();
//!
//! assert!(mesh.is_boundary_vertex(VertexId::new(0)));
//! assert_eq!(mesh.one_ring(VertexId::new(0)).unwrap().len(), 2);
//! ```

mod builder;
mod halfedge;
mod index;

pub use builder::{build_from_triangles, build_mesh, to_face_vertex, triangulate, triangulate_polygons};
pub use halfedge::{Face, FaceHalfEdgeIter, HalfEdge, HalfEdgeMesh, Vertex};
pub use index::{FaceId, HalfEdgeId, VertexId};
