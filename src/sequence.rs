//! Subdivision levels of one imported mesh.
//!
//! A [`MeshSequence`] holds the imported mesh at level 0 and, at level `k`, the
//! result of subdividing it `k` times. Levels are computed on demand and kept,
//! so switching back and forth between levels never recomputes anything. Each
//! level is an independent mesh; none borrows from another.

use log::debug;
use nalgebra::Point3;

use crate::algo::subdivide::subdivide;
use crate::algo::Progress;
use crate::error::{BuildError, SubdivisionError};
use crate::mesh::{build_mesh, HalfEdgeMesh};

/// An append-only list of subdivision levels.
#[derive(Debug, Clone)]
pub struct MeshSequence {
    levels: Vec<HalfEdgeMesh>,
}

impl MeshSequence {
    /// Start a sequence from an already built level-0 mesh.
    pub fn new(base: HalfEdgeMesh) -> Self {
        Self { levels: vec![base] }
    }

    /// Build level 0 from raw geometry, exactly as imported.
    ///
    /// Polygonal faces are kept; triangulate them first if the sequence is
    /// going to be subdivided.
    pub fn from_geometry<F: AsRef<[u32]>>(
        positions: &[Point3<f64>],
        faces: &[F],
    ) -> Result<Self, BuildError> {
        build_mesh(positions, faces).map(Self::new)
    }

    /// Replace everything with a freshly imported level 0.
    pub fn reset(&mut self, base: HalfEdgeMesh) {
        self.levels.clear();
        self.levels.push(base);
    }

    /// Number of levels computed so far (at least 1).
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Get a computed level, if it exists.
    pub fn level(&self, k: usize) -> Option<&HalfEdgeMesh> {
        self.levels.get(k)
    }

    /// All computed levels, coarsest first.
    pub fn levels(&self) -> &[HalfEdgeMesh] {
        &self.levels
    }

    /// The imported mesh.
    pub fn base(&self) -> &HalfEdgeMesh {
        &self.levels[0]
    }

    /// The most refined level computed so far.
    pub fn finest(&self) -> &HalfEdgeMesh {
        &self.levels[self.levels.len() - 1]
    }

    /// Get level `k`, subdividing the finest existing level as often as needed.
    ///
    /// On error the levels computed before the failing pass are kept.
    pub fn ensure_level(&mut self, k: usize) -> Result<&HalfEdgeMesh, SubdivisionError> {
        self.ensure_level_with_progress(k, &Progress::none())
    }

    /// Like [`ensure_level`](Self::ensure_level), reporting one step per new level.
    pub fn ensure_level_with_progress(
        &mut self,
        k: usize,
        progress: &Progress,
    ) -> Result<&HalfEdgeMesh, SubdivisionError> {
        let first_missing = self.levels.len();
        let total = (k + 1).saturating_sub(first_missing);

        while self.levels.len() <= k {
            let done = self.levels.len() - first_missing;
            progress.report(done, total, "Loop subdivision");
            let next = subdivide(self.finest())?;
            debug!("Computed level {} ({} faces)", self.levels.len(), next.face_count());
            self.levels.push(next);
        }
        progress.finish(total, "Loop subdivision");

        Ok(&self.levels[k])
    }
}
