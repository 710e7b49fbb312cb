//! Nearest-vertex queries for interactive picking.
//!
//! Both queries are plain linear scans over the vertex arena. Ties on the
//! minimal distance go to the lowest vertex index, so picking is reproducible.

use nalgebra::{Matrix4, Point2, Point3};

use crate::mesh::HalfEdgeMesh;

/// Find the vertex closest to `point`, if it lies within `max_dist`.
///
/// Distances are Euclidean in the mesh's own coordinate space. Returns `None`
/// when the mesh has no vertices, when the closest vertex is farther than
/// `max_dist`, or when `max_dist` is negative or NaN.
///
/// # Example
///
/// ```
/// use loupe::algo::pick::nearest_vertex;
/// use loupe::mesh::build_from_triangles;
/// use nalgebra::Point3;
///
/// let positions = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(10.0, 0.0, 0.0),
///     Point3::new(0.0, 10.0, 0.0),
/// ];
/// let mesh = build_from_triangles(&positions, &[[0, 1, 2]]).unwrap();
///
/// assert_eq!(nearest_vertex(&mesh, &Point3::new(1.0, 0.0, 0.0), 5.0), Some(0));
/// assert_eq!(nearest_vertex(&mesh, &Point3::new(1.0, 0.0, 0.0), 0.5), None);
/// ```
pub fn nearest_vertex(mesh: &HalfEdgeMesh, point: &Point3<f64>, max_dist: f64) -> Option<u32> {
    closest_within(
        mesh.positions().map(|p| Some((p - point).norm_squared())),
        max_dist,
    )
}

/// Find the vertex whose screen projection is closest to `screen_point`.
///
/// Every vertex is transformed by `view_projection` and divided by `w` to get
/// normalized device coordinates; `screen_point` and `max_dist` are in the same
/// NDC units (see [`screen_to_ndc`]). Vertices behind the camera (`w <= 0`) are
/// never picked.
pub fn nearest_vertex_screen(
    mesh: &HalfEdgeMesh,
    view_projection: &Matrix4<f64>,
    screen_point: &Point2<f64>,
    max_dist: f64,
) -> Option<u32> {
    closest_within(
        mesh.positions().map(|p| {
            let clip = view_projection * p.to_homogeneous();
            if clip.w <= 0.0 {
                return None;
            }
            let ndc = Point2::new(clip.x / clip.w, clip.y / clip.w);
            Some((ndc - screen_point).norm_squared())
        }),
        max_dist,
    )
}

/// Convert a pixel position to normalized device coordinates.
///
/// The pixel origin is the top-left corner with y growing downwards; the result
/// has x and y in `[-1, 1]` with y growing upwards.
pub fn screen_to_ndc(x: f64, y: f64, width: f64, height: f64) -> Point2<f64> {
    Point2::new(2.0 * x / width - 1.0, 1.0 - 2.0 * y / height)
}

/// Index of the smallest squared distance, if it is within `max_dist`.
fn closest_within(distances: impl Iterator<Item = Option<f64>>, max_dist: f64) -> Option<u32> {
    if max_dist.is_nan() || max_dist < 0.0 {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;
    for (i, d2) in distances.enumerate() {
        let Some(d2) = d2 else { continue };
        // Strict comparison keeps the first of equally close vertices
        if best.map_or(d2.is_finite(), |(_, b)| d2 < b) {
            best = Some((i, d2));
        }
    }

    best.filter(|&(_, d2)| d2 <= max_dist * max_dist)
        .map(|(i, _)| i as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_triangles;

    fn two_far_points() -> HalfEdgeMesh {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(0.0, 10.0, 0.0),
        ];
        build_from_triangles(&positions, &[[0, 1, 2]]).unwrap()
    }

    #[test]
    fn test_within_threshold() {
        let mesh = two_far_points();
        assert_eq!(nearest_vertex(&mesh, &Point3::new(1.0, 0.0, 0.0), 5.0), Some(0));
        assert_eq!(nearest_vertex(&mesh, &Point3::new(9.0, 0.5, 0.0), 5.0), Some(1));
    }

    #[test]
    fn test_outside_threshold() {
        let mesh = two_far_points();
        assert_eq!(nearest_vertex(&mesh, &Point3::new(1.0, 0.0, 0.0), 0.5), None);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let mesh = two_far_points();
        assert_eq!(nearest_vertex(&mesh, &Point3::new(1.0, 0.0, 0.0), 1.0), Some(0));
    }

    #[test]
    fn test_tie_goes_to_lowest_index() {
        let mesh = two_far_points();
        // Equidistant from vertices 0 and 1
        assert_eq!(nearest_vertex(&mesh, &Point3::new(5.0, -3.0, 0.0), 100.0), Some(0));
        // Equidistant from vertices 1 and 2
        assert_eq!(nearest_vertex(&mesh, &Point3::new(10.0, 10.0, 0.0), 100.0), Some(1));
    }

    #[test]
    fn test_empty_and_invalid_threshold() {
        let mesh = HalfEdgeMesh::new();
        assert_eq!(nearest_vertex(&mesh, &Point3::origin(), 1.0), None);

        let mesh = two_far_points();
        assert_eq!(nearest_vertex(&mesh, &Point3::origin(), -1.0), None);
        assert_eq!(nearest_vertex(&mesh, &Point3::origin(), f64::NAN), None);
    }

    #[test]
    fn test_screen_pick_with_identity() {
        let positions = vec![
            Point3::new(-0.5, -0.5, 0.0),
            Point3::new(0.5, -0.5, 0.0),
            Point3::new(0.0, 0.5, 0.0),
        ];
        let mesh = build_from_triangles(&positions, &[[0, 1, 2]]).unwrap();
        let vp = Matrix4::identity();

        let hit = nearest_vertex_screen(&mesh, &vp, &Point2::new(0.45, -0.4), 0.2);
        assert_eq!(hit, Some(1));
        assert_eq!(nearest_vertex_screen(&mesh, &vp, &Point2::new(0.9, 0.9), 0.2), None);
    }

    #[test]
    fn test_screen_pick_skips_vertices_behind_camera() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mesh = build_from_triangles(&positions, &[[0, 1, 2]]).unwrap();
        // w = 1 - x, so vertex 1 sits on the camera plane
        let mut vp = Matrix4::identity();
        vp[(3, 0)] = -1.0;

        let hit = nearest_vertex_screen(&mesh, &vp, &Point2::new(1.0, 0.0), 10.0);
        assert_eq!(hit, Some(0));
    }

    #[test]
    fn test_screen_to_ndc() {
        let p = screen_to_ndc(0.0, 0.0, 800.0, 600.0);
        assert_eq!(p, Point2::new(-1.0, 1.0));
        let p = screen_to_ndc(400.0, 300.0, 800.0, 600.0);
        assert_eq!(p, Point2::new(0.0, 0.0));
    }
}
