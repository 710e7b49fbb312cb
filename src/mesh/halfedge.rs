//! Half-edge mesh data structure.
//!
//! This module provides a half-edge (doubly-connected edge list) representation
//! for polygon meshes, stored as three flat arenas addressed by typed indices.
//!
//! # Structure
//!
//! - Each face owns one half-edge per side, linked into a closed `next` cycle
//! - Each half-edge knows its **origin vertex**, **face**, **next** and **prev**
//!   half-edges around that face, and its **twin** (the half-edge of the
//!   neighbouring face running the other way)
//! - Each vertex stores one outgoing half-edge
//! - Each face stores one half-edge on its boundary
//!
//! # Boundary Handling
//!
//! Only face-bound half-edges are stored. An edge on the mesh boundary has a
//! single half-edge whose `twin` is `None`. The outgoing half-edge stored on a
//! boundary vertex is the one that starts its open fan (its `prev` has no
//! twin), so boundary classification is a constant-time check.
//!
//! A built mesh is immutable: nothing outside the crate can change positions
//! or links, so several subdivision levels can be read side by side.

use nalgebra::{Point3, Vector3};

use super::index::{FaceId, HalfEdgeId, VertexId};
use crate::error::TopologyError;

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// One outgoing half-edge from this vertex, `None` for isolated vertices.
    /// For boundary vertices this is the first half-edge of the open fan.
    pub halfedge: Option<HalfEdgeId>,

    /// Area-weighted unit normal, computed once when the mesh is built.
    /// `None` for isolated vertices and for fans with zero area.
    pub normal: Option<Vector3<f64>>,
}

impl Vertex {
    /// Create a new unlinked vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            halfedge: None,
            normal: None,
        }
    }
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge {
    /// The vertex this half-edge originates from.
    pub origin: VertexId,

    /// The face this half-edge borders.
    pub face: FaceId,

    /// The next half-edge around the face (counter-clockwise).
    pub next: HalfEdgeId,

    /// The previous half-edge around the face.
    pub prev: HalfEdgeId,

    /// The opposite half-edge, `None` on a boundary edge.
    pub twin: Option<HalfEdgeId>,
}

/// A face in the half-edge mesh.
#[derive(Debug, Clone, Copy)]
pub struct Face {
    /// One half-edge on the boundary of this face.
    pub halfedge: HalfEdgeId,
}

/// A half-edge mesh.
///
/// Built by [`build_mesh`](super::build_mesh) or produced by subdivision;
/// read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct HalfEdgeMesh {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) halfedges: Vec<HalfEdge>,
    pub(crate) faces: Vec<Face>,
}

impl HalfEdgeMesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(num_vertices: usize, num_halfedges: usize, num_faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_halfedges),
            faces: Vec::with_capacity(num_faces),
        }
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of half-edges.
    #[inline]
    pub fn halfedge_count(&self) -> usize {
        self.halfedges.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId) -> &HalfEdge {
        &self.halfedges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Iterate over all vertex positions in index order.
    pub fn positions(&self) -> impl Iterator<Item = &Point3<f64>> + '_ {
        self.vertices.iter().map(|v| &v.position)
    }

    /// Get the cached normal of a vertex.
    #[inline]
    pub fn vertex_normal(&self, v: VertexId) -> Option<Vector3<f64>> {
        self.vertex(v).normal
    }

    // ==================== Topology Queries ====================

    /// Get the twin (opposite) half-edge, if the edge is not on the boundary.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId) -> Option<HalfEdgeId> {
        self.halfedge(he).twin
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the face.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).prev
    }

    /// Get the origin vertex of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId) -> VertexId {
        self.halfedge(he).origin
    }

    /// Get the destination vertex of a half-edge.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId) -> VertexId {
        self.origin(self.next(he))
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId) -> FaceId {
        self.halfedge(he).face
    }

    /// Check if an edge (represented by one of its half-edges) is on the boundary.
    #[inline]
    pub fn is_boundary_edge(&self, he: HalfEdgeId) -> bool {
        self.twin(he).is_none()
    }

    /// Check if a vertex touches a boundary edge.
    ///
    /// Isolated vertices are not on the boundary: no edge touches them.
    #[inline]
    pub fn is_boundary_vertex(&self, v: VertexId) -> bool {
        match self.vertex(v).halfedge {
            Some(he) => self.is_boundary_edge(self.prev(he)),
            None => false,
        }
    }

    /// Check if a vertex has no incident faces.
    #[inline]
    pub fn is_isolated_vertex(&self, v: VertexId) -> bool {
        self.vertex(v).halfedge.is_none()
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Collect the outgoing half-edges around a vertex, in fan order.
    ///
    /// The walk starts at the vertex's stored half-edge and repeatedly steps to
    /// `next(twin(he))`. It stops when it returns to the start (interior vertex)
    /// or reaches a half-edge without a twin (boundary vertex).
    ///
    /// Only the fan containing the stored half-edge is visited. On a mesh that
    /// fails [`is_valid`](Self::is_valid) because faces meet at a single
    /// vertex, the other fans at that vertex are not reported.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::MalformedTopology`] if the walk takes more than
    /// `face_count() + 1` steps, leaves the vertex, or ends on a boundary without
    /// having started at the beginning of the fan.
    pub fn vertex_halfedges(&self, v: VertexId) -> Result<Vec<HalfEdgeId>, TopologyError> {
        let Some(start) = self.vertex(v).halfedge else {
            return Ok(Vec::new());
        };

        let limit = self.faces.len() + 1;
        let malformed = |steps| TopologyError::MalformedTopology {
            vertex: v.raw(),
            steps,
        };

        let mut fan = vec![start];
        let mut he = start;
        loop {
            let Some(twin) = self.twin(he) else {
                // Open fan: must have started at the other boundary edge.
                if !self.is_boundary_edge(self.prev(start)) {
                    return Err(malformed(fan.len()));
                }
                break;
            };
            he = self.next(twin);
            if he == start {
                break;
            }
            if fan.len() >= limit || self.origin(he) != v {
                return Err(malformed(fan.len()));
            }
            fan.push(he);
        }

        Ok(fan)
    }

    /// Get the ordered one-ring of neighbours around a vertex.
    ///
    /// For an interior vertex the sequence is cyclic. For a boundary vertex it is
    /// an open path whose first and last entries are the two boundary neighbours.
    /// Like [`vertex_halfedges`](Self::vertex_halfedges), this assumes the
    /// vertex's faces form one fan.
    ///
    /// # Errors
    ///
    /// See [`vertex_halfedges`](Self::vertex_halfedges).
    pub fn one_ring(&self, v: VertexId) -> Result<Vec<VertexId>, TopologyError> {
        let fan = self.vertex_halfedges(v)?;
        let Some(&first) = fan.first() else {
            return Ok(Vec::new());
        };

        let mut ring = Vec::with_capacity(fan.len() + 1);
        if self.is_boundary_edge(self.prev(first)) {
            ring.push(self.origin(self.prev(first)));
        }
        ring.extend(fan.iter().map(|&he| self.dest(he)));
        Ok(ring)
    }

    /// Get the two neighbours of a boundary vertex along the boundary.
    ///
    /// Returns `None` for interior and isolated vertices.
    pub fn boundary_neighbors(
        &self,
        v: VertexId,
    ) -> Result<Option<(VertexId, VertexId)>, TopologyError> {
        if !self.is_boundary_vertex(v) {
            return Ok(None);
        }
        let ring = self.one_ring(v)?;
        match (ring.first(), ring.last()) {
            (Some(&p), Some(&q)) => Ok(Some((p, q))),
            _ => Ok(None),
        }
    }

    /// Compute the valence (number of distinct neighbours) of a vertex.
    pub fn valence(&self, v: VertexId) -> Result<usize, TopologyError> {
        self.one_ring(v).map(|ring| ring.len())
    }

    /// Iterate over half-edges around a face.
    pub fn face_halfedges(&self, f: FaceId) -> FaceHalfEdgeIter<'_> {
        FaceHalfEdgeIter::new(self, f)
    }

    /// Iterate over vertices of a face, in winding order.
    pub fn face_vertices(&self, f: FaceId) -> impl Iterator<Item = VertexId> + '_ {
        self.face_halfedges(f).map(|he| self.origin(he))
    }

    /// Get the number of sides of a face.
    pub fn face_degree(&self, f: FaceId) -> usize {
        self.face_halfedges(f).count()
    }

    /// Get the three vertices of a face, or `None` if it is not a triangle.
    pub fn face_triangle(&self, f: FaceId) -> Option<[VertexId; 3]> {
        let he0 = self.face(f).halfedge;
        let he1 = self.next(he0);
        let he2 = self.next(he1);
        if self.next(he2) != he0 {
            return None;
        }
        Some([self.origin(he0), self.origin(he1), self.origin(he2)])
    }

    /// Check whether every face is a triangle.
    pub fn is_triangle_mesh(&self) -> bool {
        self.face_ids().all(|f| self.face_degree(f) == 3)
    }

    // ==================== Counts ====================

    /// Number of boundary edges (half-edges without a twin).
    pub fn boundary_edge_count(&self) -> usize {
        self.halfedges.iter().filter(|he| he.twin.is_none()).count()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        let boundary = self.boundary_edge_count();
        boundary + (self.halfedges.len() - boundary) / 2
    }

    /// Euler characteristic `V - E + F`.
    pub fn euler_characteristic(&self) -> i64 {
        self.vertex_count() as i64 - self.edge_count() as i64 + self.face_count() as i64
    }

    // ==================== Geometry ====================

    /// Area-weighted normal vector of a face (length is twice the area).
    ///
    /// Works for any planar-ish polygon by summing the fan cross products.
    pub fn face_area_vector(&self, f: FaceId) -> Vector3<f64> {
        let verts: Vec<VertexId> = self.face_vertices(f).collect();
        let p0 = self.position(verts[0]);
        verts
            .windows(2)
            .skip(1)
            .map(|w| (self.position(w[0]) - p0).cross(&(self.position(w[1]) - p0)))
            .sum()
    }

    /// Unit normal of a face, `None` if the face has zero area.
    pub fn face_normal(&self, f: FaceId) -> Option<Vector3<f64>> {
        self.face_area_vector(f).try_normalize(f64::EPSILON)
    }

    /// Compute the bounding box of the mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?.position;
        let mut min = first;
        let mut max = first;

        for v in &self.vertices {
            for i in 0..3 {
                min[i] = min[i].min(v.position[i]);
                max[i] = max[i].max(v.position[i]);
            }
        }

        Some((min, max))
    }

    // ==================== Validation ====================

    /// Check that all connectivity is consistent.
    ///
    /// Verifies twin symmetry and direction, `next`/`prev` agreement, face
    /// cycles, vertex back-references, and that every vertex fan can be walked
    /// and reaches all of the vertex's faces.
    pub fn is_valid(&self) -> bool {
        for (i, he) in self.halfedges.iter().enumerate() {
            let id = HalfEdgeId::new(i);
            if let Some(twin) = he.twin {
                if self.twin(twin) != Some(id) || self.origin(twin) != self.dest(id) {
                    return false;
                }
            }
            if self.prev(he.next) != id || self.next(he.prev) != id {
                return false;
            }
            if self.face_of(he.next) != he.face {
                return false;
            }
        }

        for f in self.face_ids() {
            let start = self.face(f).halfedge;
            if self.face_of(start) != f {
                return false;
            }
            // Bounded walk so corrupt cycles cannot hang validation.
            let mut he = self.next(start);
            let mut steps = 1;
            while he != start {
                steps += 1;
                if steps > self.halfedges.len() {
                    return false;
                }
                he = self.next(he);
            }
            if steps < 3 {
                return false;
            }
        }

        let outgoing = self.outgoing_counts();
        self.vertex_ids().all(|v| match self.vertex(v).halfedge {
            // A fan shorter than the outgoing count means the faces around
            // `v` split into several fans (a bowtie).
            Some(he) => {
                self.origin(he) == v
                    && self
                        .vertex_halfedges(v)
                        .is_ok_and(|fan| fan.len() == outgoing[v.index()])
            }
            None => outgoing[v.index()] == 0,
        })
    }

    /// Number of stored half-edges leaving each vertex.
    pub(crate) fn outgoing_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.vertices.len()];
        for he in &self.halfedges {
            counts[he.origin.index()] += 1;
        }
        counts
    }
}

/// Iterator over half-edges around a face.
pub struct FaceHalfEdgeIter<'a> {
    mesh: &'a HalfEdgeMesh,
    start: HalfEdgeId,
    current: HalfEdgeId,
    done: bool,
}

impl<'a> FaceHalfEdgeIter<'a> {
    fn new(mesh: &'a HalfEdgeMesh, f: FaceId) -> Self {
        let start = mesh.face(f).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: false,
        }
    }
}

impl Iterator for FaceHalfEdgeIter<'_> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.next(self.current);

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}
