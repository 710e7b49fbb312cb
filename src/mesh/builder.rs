//! Mesh construction utilities.
//!
//! This module turns flat face-vertex lists, as produced by a file importer,
//! into fully linked half-edge meshes, and converts meshes back into lists.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use log::{debug, warn};
use nalgebra::{Point3, Vector3};

use super::halfedge::{Face, HalfEdge, HalfEdgeMesh, Vertex};
use super::index::{FaceId, HalfEdgeId, VertexId};
use crate::error::BuildError;

/// The half-edges seen so far for one undirected edge.
struct EdgeSlot {
    first: HalfEdgeId,
    paired: bool,
}

/// Build a half-edge mesh from vertex positions and polygon faces.
///
/// Each face is a sequence of at least three distinct vertex indices in
/// counter-clockwise order. Faces may have any degree; use
/// [`triangulate_polygons`] first if the mesh will be subdivided.
///
/// Construction is all-or-nothing: either every link is established or an
/// error is returned and nothing is built.
///
/// # Errors
///
/// - [`BuildError::DanglingIndex`] if a face references a missing vertex
/// - [`BuildError::DegenerateFace`] if a face has fewer than three vertices
///   or repeats a vertex
/// - [`BuildError::NonManifoldInput`] if an edge is used by more than two
///   faces, or twice with the same direction
///
/// # Example
/// ```
/// use loupe::mesh::build_mesh;
/// use nalgebra::Point3;
///
/// let positions = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let mesh = build_mesh(&positions, &[vec![0, 1, 2, 3]]).unwrap();
/// assert_eq!(mesh.vertex_count(), 4);
/// assert_eq!(mesh.face_count(), 1);
/// ```
pub fn build_mesh<F: AsRef<[u32]>>(
    positions: &[Point3<f64>],
    faces: &[F],
) -> Result<HalfEdgeMesh, BuildError> {
    validate_faces(positions.len(), faces)?;

    let num_halfedges = faces.iter().map(|f| f.as_ref().len()).sum();
    let mut mesh = HalfEdgeMesh::with_capacity(positions.len(), num_halfedges, faces.len());
    mesh.vertices.extend(positions.iter().map(|&p| Vertex::new(p)));

    let mut edge_map: HashMap<(u32, u32), EdgeSlot> = HashMap::with_capacity(num_halfedges);

    for (fi, face) in faces.iter().enumerate() {
        let face = face.as_ref();
        let n = face.len();
        let base = mesh.halfedges.len();
        let face_id = FaceId::new(fi);

        mesh.faces.push(Face {
            halfedge: HalfEdgeId::new(base),
        });

        for (k, &v) in face.iter().enumerate() {
            let he = HalfEdgeId::new(base + k);
            mesh.halfedges.push(HalfEdge {
                origin: VertexId::from(v),
                face: face_id,
                next: HalfEdgeId::new(base + (k + 1) % n),
                prev: HalfEdgeId::new(base + (k + n - 1) % n),
                twin: None,
            });

            let vertex = &mut mesh.vertices[v as usize];
            if vertex.halfedge.is_none() {
                vertex.halfedge = Some(he);
            }
        }

        for k in 0..n {
            let (a, b) = (face[k], face[(k + 1) % n]);
            let he = HalfEdgeId::new(base + k);
            let key = if a < b { (a, b) } else { (b, a) };

            match edge_map.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(EdgeSlot {
                        first: he,
                        paired: false,
                    });
                }
                Entry::Occupied(mut slot) => {
                    let slot = slot.get_mut();
                    // A second use in the same direction cannot be twinned
                    if slot.paired || mesh.halfedges[slot.first.index()].origin.raw() == a {
                        return Err(BuildError::NonManifoldInput { v0: a, v1: b });
                    }
                    slot.paired = true;
                    mesh.halfedges[slot.first.index()].twin = Some(he);
                    mesh.halfedges[he.index()].twin = Some(slot.first);
                }
            }
        }
    }

    anchor_boundary_vertices(&mut mesh);
    compute_vertex_normals(&mut mesh);

    let isolated = mesh.vertices.iter().filter(|v| v.halfedge.is_none()).count();
    if isolated > 0 {
        warn!("{} of {} vertices are not used by any face", isolated, mesh.vertex_count());
    }
    let outgoing = mesh.outgoing_counts();
    let split = mesh
        .vertex_ids()
        .filter(|&v| {
            !mesh
                .vertex_halfedges(v)
                .is_ok_and(|fan| fan.len() == outgoing[v.index()])
        })
        .count();
    if split > 0 {
        warn!("{} vertices join faces that do not form a single fan", split);
    }
    debug!(
        "Built mesh: {} vertices, {} faces, {} half-edges, {} boundary edges",
        mesh.vertex_count(),
        mesh.face_count(),
        mesh.halfedge_count(),
        mesh.boundary_edge_count()
    );

    Ok(mesh)
}

/// Build a half-edge mesh from vertex positions and triangles.
///
/// Shorthand for [`build_mesh`] with fixed-size faces.
pub fn build_from_triangles(
    positions: &[Point3<f64>],
    triangles: &[[u32; 3]],
) -> Result<HalfEdgeMesh, BuildError> {
    build_mesh(positions, triangles)
}

/// Check every face before anything is allocated.
fn validate_faces<F: AsRef<[u32]>>(num_vertices: usize, faces: &[F]) -> Result<(), BuildError> {
    for (fi, face) in faces.iter().enumerate() {
        let face = face.as_ref();
        if let Some(&vertex) = face.iter().find(|&&v| v as usize >= num_vertices) {
            return Err(BuildError::DanglingIndex { face: fi, vertex });
        }

        let mut sorted = face.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() < 3 || sorted.len() != face.len() {
            return Err(BuildError::DegenerateFace { face: fi });
        }
    }
    Ok(())
}

/// Point each boundary vertex at the outgoing half-edge that starts its fan.
///
/// A boundary half-edge `x -> v` is followed (within its face) by the first
/// outgoing half-edge of `v`'s open fan.
fn anchor_boundary_vertices(mesh: &mut HalfEdgeMesh) {
    for i in 0..mesh.halfedges.len() {
        let he = &mesh.halfedges[i];
        if he.twin.is_some() {
            continue;
        }
        let start = he.next;
        let v = mesh.halfedges[start.index()].origin;
        mesh.vertices[v.index()].halfedge = Some(start);
    }
}

/// Fill in area-weighted vertex normals.
fn compute_vertex_normals(mesh: &mut HalfEdgeMesh) {
    let mut sums = vec![Vector3::<f64>::zeros(); mesh.vertex_count()];
    for f in mesh.face_ids() {
        let n = mesh.face_area_vector(f);
        for v in mesh.face_vertices(f) {
            sums[v.index()] += n;
        }
    }

    for (vertex, sum) in mesh.vertices.iter_mut().zip(sums) {
        vertex.normal = match vertex.halfedge {
            Some(_) => sum.try_normalize(f64::EPSILON),
            None => None,
        };
    }
}

/// Fan-triangulate polygon faces around their first vertex.
///
/// Winding order is preserved; triangles pass through unchanged.
pub fn triangulate_polygons<F: AsRef<[u32]>>(faces: &[F]) -> Vec<[u32; 3]> {
    let mut triangles = Vec::with_capacity(faces.len());
    for face in faces {
        let face = face.as_ref();
        if let Some((&apex, rest)) = face.split_first() {
            for w in rest.windows(2) {
                triangles.push([apex, w[0], w[1]]);
            }
        }
    }
    triangles
}

/// Fan-triangulate every face of a mesh, returning a new mesh.
///
/// A mesh that already consists of triangles is cloned.
pub fn triangulate(mesh: &HalfEdgeMesh) -> Result<HalfEdgeMesh, BuildError> {
    if mesh.is_triangle_mesh() {
        return Ok(mesh.clone());
    }
    let (positions, faces) = to_face_vertex(mesh);
    build_from_triangles(&positions, &triangulate_polygons(&faces))
}

/// Convert a half-edge mesh back to a face-vertex representation.
///
/// Returns (positions, faces) with faces in winding order.
pub fn to_face_vertex(mesh: &HalfEdgeMesh) -> (Vec<Point3<f64>>, Vec<Vec<u32>>) {
    let positions: Vec<Point3<f64>> = mesh.positions().copied().collect();

    let faces: Vec<Vec<u32>> = mesh
        .face_ids()
        .map(|f| mesh.face_vertices(f).map(|v| v.raw()).collect())
        .collect();

    (positions, faces)
}
