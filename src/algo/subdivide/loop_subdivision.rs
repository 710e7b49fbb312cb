//! Loop subdivision for triangle meshes.

use std::collections::HashMap;

use log::{debug, error};
use nalgebra::{Point3, Vector3};

use crate::algo::Progress;
use crate::error::SubdivisionError;
use crate::mesh::{build_from_triangles, HalfEdgeMesh, VertexId};

use super::SubdivideOptions;

/// Neighbourhood of an original vertex, gathered before any position is computed.
enum Stencil {
    Isolated,
    Interior(Vec<VertexId>),
    Boundary(VertexId, VertexId),
}

/// Performs one pass of Loop subdivision.
///
/// The input is only read; the refined mesh is a new, independent value with
/// four times as many triangles. Original vertices keep their indices; the new
/// edge vertices follow them.
///
/// # Vertex Rules
///
/// - **Interior edge vertex**: `3/8 * (a + b) + 1/8 * (c + d)`
/// - **Boundary edge vertex**: `1/2 * (a + b)`
/// - **Interior vertex**: `(1 - n*β) * v + β * Σ(neighbors)`, see [`loop_beta`]
/// - **Boundary vertex**: `3/4 * v + 1/8 * (p + q)` over the two boundary neighbours
///
/// A mesh without faces is returned unchanged.
///
/// # Errors
///
/// - [`SubdivisionError::UnsupportedFaceDegree`] if any face is not a triangle
/// - [`SubdivisionError::NonManifoldVertex`] if a vertex's faces form several fans
/// - [`SubdivisionError::MalformedTopology`] if the input links are corrupt
/// - [`SubdivisionError::SubdivisionInvariantViolation`] if the refined
///   triangulation fails to rebuild
/// - [`SubdivisionError::IndexOverflow`] if the refined mesh would need more
///   than `u32::MAX + 1` vertices
///
/// All checks run before any new position is computed.
pub fn subdivide(mesh: &HalfEdgeMesh) -> Result<HalfEdgeMesh, SubdivisionError> {
    if mesh.face_count() == 0 {
        return Ok(mesh.clone());
    }

    let stencils = gather_stencils(mesh).inspect_err(|e| {
        if matches!(e, SubdivisionError::MalformedTopology(_)) {
            error!("Refusing to subdivide corrupt mesh: {}", e);
        }
    })?;

    let (edge_points, edge_index) = compute_edge_points(mesh)?;
    let mut positions = compute_vertex_points(mesh, &stencils);
    positions.extend(edge_points);

    let triangles = split_triangles(mesh, &edge_index)?;

    let refined = build_from_triangles(&positions, &triangles).map_err(|e| {
        error!("Loop subdivision produced an invalid triangulation: {}", e);
        SubdivisionError::SubdivisionInvariantViolation(e)
    })?;

    debug!(
        "Loop subdivision: {} -> {} vertices, {} -> {} faces",
        mesh.vertex_count(),
        refined.vertex_count(),
        mesh.face_count(),
        refined.face_count()
    );

    Ok(refined)
}

/// Applies `options.iterations` passes of Loop subdivision.
///
/// Zero iterations returns a copy of the input.
pub fn loop_subdivide(
    mesh: &HalfEdgeMesh,
    options: &SubdivideOptions,
) -> Result<HalfEdgeMesh, SubdivisionError> {
    loop_subdivide_with_progress(mesh, options, &Progress::none())
}

/// Loop subdivision with progress reporting, one report per pass.
pub fn loop_subdivide_with_progress(
    mesh: &HalfEdgeMesh,
    options: &SubdivideOptions,
    progress: &Progress,
) -> Result<HalfEdgeMesh, SubdivisionError> {
    let mut current = mesh.clone();
    for iter in 0..options.iterations {
        progress.report(iter, options.iterations, "Loop subdivision");
        current = subdivide(&current)?;
    }
    progress.finish(options.iterations, "Loop subdivision");
    Ok(current)
}

/// Compute the Loop subdivision weight β for an interior vertex of valence n.
///
/// `β = 1/n * (5/8 - (3/8 + 1/4 * cos(2π/n))²)`, which gives the classical
/// 3/16 for n = 3 and 1/16 for the regular valence 6.
pub fn loop_beta(n: usize) -> f64 {
    let n_f = n as f64;
    let cos_term = (2.0 * std::f64::consts::PI / n_f).cos();
    let inner = 3.0 / 8.0 + 0.25 * cos_term;
    (5.0 / 8.0 - inner * inner) / n_f
}

/// Validate the input and collect every vertex's neighbourhood.
fn gather_stencils(mesh: &HalfEdgeMesh) -> Result<Vec<Stencil>, SubdivisionError> {
    for f in mesh.face_ids() {
        let degree = mesh.face_degree(f);
        if degree != 3 {
            return Err(SubdivisionError::UnsupportedFaceDegree {
                face: f.index(),
                degree,
            });
        }
    }

    let outgoing = mesh.outgoing_counts();

    let mut stencils = Vec::with_capacity(mesh.vertex_count());
    for v in mesh.vertex_ids() {
        let fan = mesh.vertex_halfedges(v)?;
        if fan.len() != outgoing[v.index()] {
            return Err(SubdivisionError::NonManifoldVertex { vertex: v.raw() });
        }

        let ring = mesh.one_ring(v)?;
        let stencil = if ring.is_empty() {
            Stencil::Isolated
        } else if mesh.is_boundary_vertex(v) {
            Stencil::Boundary(ring[0], ring[ring.len() - 1])
        } else {
            Stencil::Interior(ring)
        };
        stencils.push(stencil);
    }

    Ok(stencils)
}

/// Compute one odd vertex per undirected edge.
///
/// Returns the new positions and a map from the unordered vertex pair to the
/// new vertex's index in the refined mesh.
fn compute_edge_points(
    mesh: &HalfEdgeMesh,
) -> Result<(Vec<Point3<f64>>, HashMap<(u32, u32), u32>), SubdivisionError> {
    let base = mesh.vertex_count();
    let mut points = Vec::with_capacity(mesh.halfedge_count());
    let mut index = HashMap::with_capacity(mesh.halfedge_count());

    for he in mesh.halfedge_ids() {
        let a = mesh.origin(he);
        let b = mesh.dest(he);
        let key = edge_key(a, b);
        if index.contains_key(&key) {
            continue;
        }

        let pa = mesh.position(a).coords;
        let pb = mesh.position(b).coords;
        let pos = match mesh.twin(he) {
            Some(twin) => {
                let c = mesh.position(mesh.origin(mesh.prev(he))).coords;
                let d = mesh.position(mesh.origin(mesh.prev(twin))).coords;
                (pa + pb) * (3.0 / 8.0) + (c + d) * (1.0 / 8.0)
            }
            None => (pa + pb) * 0.5,
        };

        index.insert(key, refined_index(base + points.len())?);
        points.push(Point3::from(pos));
    }

    Ok((points, index))
}

/// Index of a vertex in the refined mesh, checked against the `u32` range.
fn refined_index(i: usize) -> Result<u32, SubdivisionError> {
    u32::try_from(i).map_err(|_| {
        error!("Loop subdivision overflows u32 vertex indices at {}", i);
        SubdivisionError::IndexOverflow { vertices: i + 1 }
    })
}

/// Compute smoothed positions for the original vertices.
fn compute_vertex_points(mesh: &HalfEdgeMesh, stencils: &[Stencil]) -> Vec<Point3<f64>> {
    mesh.vertex_ids()
        .zip(stencils)
        .map(|(v, stencil)| {
            let p = mesh.position(v).coords;
            match stencil {
                Stencil::Isolated => Point3::from(p),
                Stencil::Boundary(left, right) => {
                    let l = mesh.position(*left).coords;
                    let r = mesh.position(*right).coords;
                    Point3::from(p * (3.0 / 4.0) + (l + r) * (1.0 / 8.0))
                }
                Stencil::Interior(ring) => {
                    let n = ring.len();
                    let beta = loop_beta(n);
                    let sum: Vector3<f64> = ring.iter().map(|&u| mesh.position(u).coords).sum();
                    Point3::from(p * (1.0 - n as f64 * beta) + sum * beta)
                }
            }
        })
        .collect()
}

/// Replace every triangle with its four children, preserving winding.
fn split_triangles(
    mesh: &HalfEdgeMesh,
    edge_index: &HashMap<(u32, u32), u32>,
) -> Result<Vec<[u32; 3]>, SubdivisionError> {
    let mut triangles = Vec::with_capacity(mesh.face_count() * 4);

    for f in mesh.face_ids() {
        let Some([a, b, c]) = mesh.face_triangle(f) else {
            return Err(SubdivisionError::UnsupportedFaceDegree {
                face: f.index(),
                degree: mesh.face_degree(f),
            });
        };

        // Every edge of every face was registered by compute_edge_points
        let ab = edge_index[&edge_key(a, b)];
        let bc = edge_index[&edge_key(b, c)];
        let ca = edge_index[&edge_key(c, a)];
        let (a, b, c) = (a.raw(), b.raw(), c.raw());

        triangles.push([a, ab, ca]);
        triangles.push([b, bc, ab]);
        triangles.push([c, ca, bc]);
        triangles.push([ab, bc, ca]);
    }

    Ok(triangles)
}

#[inline]
fn edge_key(a: VertexId, b: VertexId) -> (u32, u32) {
    let (a, b) = (a.raw(), b.raw());
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;
    use crate::mesh::{build_mesh, FaceId, HalfEdgeId};

    fn create_tetrahedron() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let faces = [[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        build_from_triangles(&vertices, &faces).unwrap()
    }

    fn create_single_triangle() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap()
    }

    /// Hexagonal fan whose centre is lifted off the rim's plane.
    fn create_raised_hexagon() -> HalfEdgeMesh {
        let mut vertices = vec![Point3::new(0.0, 0.0, 1.0)];
        for i in 0..6 {
            let a = i as f64 * std::f64::consts::PI / 3.0;
            vertices.push(Point3::new(a.cos(), a.sin(), 0.0));
        }
        let faces: Vec<[u32; 3]> = (0..6).map(|i| [0, 1 + i, 1 + (i + 1) % 6]).collect();
        build_from_triangles(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_single_triangle_uses_midpoints() {
        let mesh = create_single_triangle();
        let refined = subdivide(&mesh).unwrap();

        assert_eq!(refined.face_count(), 4);
        assert_eq!(refined.vertex_count(), 6);
        assert!(refined.is_valid());

        // Edge points follow the originals, in half-edge order
        let expected = [
            Point3::new(0.5, 0.0, 0.0),
            Point3::new(0.75, 0.5, 0.0),
            Point3::new(0.25, 0.5, 0.0),
        ];
        for (k, p) in expected.iter().enumerate() {
            let actual = refined.position(VertexId::new(3 + k));
            assert!((actual - p).norm() < 1e-12, "edge point {} at {:?}", k, actual);
        }
    }

    #[test]
    fn test_tetrahedron_counts() {
        let mesh = create_tetrahedron();
        let refined = subdivide(&mesh).unwrap();

        assert_eq!(refined.vertex_count(), 10);
        assert_eq!(refined.face_count(), 16);
        assert_eq!(refined.boundary_edge_count(), 0);
        assert!(refined.is_valid());
        for v in refined.vertex_ids() {
            assert!(!refined.is_boundary_vertex(v));
        }
    }

    #[test]
    fn test_input_is_untouched() {
        let mesh = create_tetrahedron();
        let before: Vec<Point3<f64>> = mesh.positions().copied().collect();

        let _ = subdivide(&mesh).unwrap();

        let after: Vec<Point3<f64>> = mesh.positions().copied().collect();
        assert_eq!(before, after);
        assert_eq!(mesh.face_count(), 4);
    }

    #[test]
    fn test_two_iterations() {
        let mesh = create_tetrahedron();
        let refined = loop_subdivide(&mesh, &SubdivideOptions::new(2)).unwrap();

        assert_eq!(refined.face_count(), 4 * 16);
        assert!(refined.is_valid());
    }

    #[test]
    fn test_zero_iterations() {
        let mesh = create_tetrahedron();
        let same = loop_subdivide(&mesh, &SubdivideOptions::new(0)).unwrap();

        assert_eq!(same.face_count(), mesh.face_count());
        assert_eq!(same.vertex_count(), mesh.vertex_count());
    }

    #[test]
    fn test_preserves_euler() {
        let mesh = create_tetrahedron();
        let refined = subdivide(&mesh).unwrap();
        assert_eq!(mesh.euler_characteristic(), 2);
        assert_eq!(refined.euler_characteristic(), 2);

        let disc = create_raised_hexagon();
        assert_eq!(subdivide(&disc).unwrap().euler_characteristic(), 1);
    }

    #[test]
    fn test_shared_edge_point_is_memoized() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(1.0, -2.0, 0.0),
        ];
        let mesh = build_from_triangles(&vertices, &[[0, 1, 2], [1, 0, 3]]).unwrap();
        let refined = subdivide(&mesh).unwrap();

        // 4 original + 5 edge vertices, not 6
        assert_eq!(refined.vertex_count(), 9);
        assert_eq!(refined.face_count(), 8);
        assert!(refined.is_valid());

        // The shared edge (0, 1) is seen first, so its point is vertex 4:
        // 3/8 * ((0,0,0) + (2,0,0)) + 1/8 * ((1,2,0) + (1,-2,0)) = (1,0,0)
        let p = refined.position(VertexId::new(4));
        assert!((p - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-12);

        // Both parents' corner children reference that same vertex
        let users: Vec<FaceId> = refined
            .face_ids()
            .filter(|&f| refined.face_vertices(f).any(|v| v.index() == 4))
            .collect();
        assert_eq!(users.len(), 6);
        assert!(users.iter().any(|f| f.index() < 4));
        assert!(users.iter().any(|f| f.index() >= 4));
    }

    #[test]
    fn test_loop_beta_coefficient() {
        assert!((loop_beta(3) - 3.0 / 16.0).abs() < 1e-12);
        assert!((loop_beta(6) - 1.0 / 16.0).abs() < 1e-12);
        // Weights stay positive and shrink with valence
        assert!(loop_beta(12) > 0.0 && loop_beta(12) < loop_beta(6));
    }

    #[test]
    fn test_regular_interior_vertex() {
        let mesh = create_raised_hexagon();
        let refined = subdivide(&mesh).unwrap();

        // (1 - 6/16) * (0,0,1) + 1/16 * Σ rim, and the rim sums to zero
        let centre = refined.position(VertexId::new(0));
        assert!((centre - Point3::new(0.0, 0.0, 0.625)).norm() < 1e-12);
    }

    #[test]
    fn test_boundary_vertex_ignores_interior_neighbours() {
        let mesh = create_raised_hexagon();
        let refined = subdivide(&mesh).unwrap();

        // 3/4 * (1,0,0) + 1/8 * ((0.5, s, 0) + (0.5, -s, 0))
        let rim = refined.position(VertexId::new(1));
        assert!((rim - Point3::new(0.875, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_quad_is_rejected() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mesh = build_mesh(&positions, &[vec![0, 1, 2, 3]]).unwrap();
        assert_eq!(
            subdivide(&mesh).unwrap_err(),
            SubdivisionError::UnsupportedFaceDegree { face: 0, degree: 4 }
        );
    }

    #[test]
    fn test_bowtie_is_rejected() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(-1.0, -1.0, 0.0),
        ];
        let mesh = build_from_triangles(&positions, &[[0, 1, 2], [0, 3, 4]]).unwrap();
        assert_eq!(
            subdivide(&mesh).unwrap_err(),
            SubdivisionError::NonManifoldVertex { vertex: 0 }
        );
    }

    #[test]
    fn test_collapsed_face_fails_rebuild() {
        let mut mesh = create_single_triangle();
        let hes: Vec<HalfEdgeId> = mesh.face_halfedges(FaceId::new(0)).collect();
        let (he0, he1, he2) = (hes[0], hes[1], hes[2]);
        assert_eq!(mesh.origin(he2), VertexId::new(2));

        // Fold vertex 2 onto vertex 1. The self-twin keeps vertex 1's fan
        // covering both of its outgoing half-edges, so every input check passes
        // and the face becomes [0, 1, 1].
        mesh.halfedges[he2.index()].origin = VertexId::new(1);
        mesh.halfedges[he1.index()].twin = Some(he1);
        mesh.vertices[1].halfedge = Some(he1);
        mesh.vertices[2].halfedge = None;
        assert_eq!(mesh.vertex_halfedges(VertexId::new(1)).unwrap(), vec![he1, he2]);
        assert_eq!(mesh.origin(he0), VertexId::new(0));

        // Children of [0, 1, 1] repeat the edge point of (0, 1)
        assert_eq!(
            subdivide(&mesh).unwrap_err(),
            SubdivisionError::SubdivisionInvariantViolation(BuildError::DegenerateFace { face: 0 })
        );
    }

    #[test]
    fn test_refined_index_range() {
        assert_eq!(refined_index(7), Ok(7));
        assert_eq!(refined_index(u32::MAX as usize), Ok(u32::MAX));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_refined_index_overflow() {
        let past_end = u32::MAX as usize + 1;
        assert_eq!(
            refined_index(past_end),
            Err(SubdivisionError::IndexOverflow {
                vertices: past_end + 1
            })
        );
    }

    #[test]
    fn test_empty_mesh_is_noop() {
        let positions = vec![Point3::new(1.0, 2.0, 3.0)];
        let faces: Vec<[u32; 3]> = Vec::new();
        let mesh = build_from_triangles(&positions, &faces).unwrap();

        let refined = subdivide(&mesh).unwrap();
        assert_eq!(refined.face_count(), 0);
        assert_eq!(refined.vertex_count(), 1);
    }

    #[test]
    fn test_progress_reports_each_pass() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let progress = Progress::new(move |_, _, _| {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        let mesh = create_tetrahedron();
        loop_subdivide_with_progress(&mesh, &SubdivideOptions::new(3), &progress).unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 4);
    }
}
