//! Error types for loupe.
//!
//! Each family of operations has its own error enum so callers can match on
//! exactly the failures that operation can produce. [`MeshError`] wraps them
//! for file-level workflows (import, the CLI).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors produced while assembling a half-edge mesh from raw geometry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A face references a vertex index outside the position list.
    #[error("face {face} references vertex {vertex}, which is out of range")]
    DanglingIndex {
        /// The face index.
        face: usize,
        /// The out-of-range vertex index.
        vertex: u32,
    },

    /// A face has fewer than three distinct vertices.
    #[error("face {face} is degenerate (fewer than 3 distinct vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// An edge is used by more than two faces, or twice in the same direction.
    #[error("edge ({v0}, {v1}) is non-manifold")]
    NonManifoldInput {
        /// First vertex of the edge.
        v0: u32,
        /// Second vertex of the edge.
        v1: u32,
    },
}

/// A traversal found links that do not form a valid fan.
///
/// This never happens for meshes produced by the builder; seeing it means the
/// mesh was corrupted by a bug in this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// The one-ring walk around a vertex did not close within the step bound.
    #[error("one-ring walk around vertex {vertex} did not terminate after {steps} steps")]
    MalformedTopology {
        /// The vertex whose fan was walked.
        vertex: u32,
        /// Number of steps taken before giving up.
        steps: usize,
    },
}

/// Errors produced by Loop subdivision.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubdivisionError {
    /// A face is not a triangle.
    #[error("face {face} has degree {degree}; Loop subdivision requires triangles")]
    UnsupportedFaceDegree {
        /// The face index.
        face: usize,
        /// The number of vertices of that face.
        degree: usize,
    },

    /// The faces around a vertex do not form a single fan.
    #[error("vertex {vertex} is non-manifold (its incident faces form more than one fan)")]
    NonManifoldVertex {
        /// The vertex index.
        vertex: u32,
    },

    /// Corrupt links were found while reading the input mesh.
    #[error(transparent)]
    MalformedTopology(#[from] TopologyError),

    /// The refined triangulation failed to rebuild into a valid mesh.
    #[error("subdivided mesh failed to rebuild: {0}")]
    SubdivisionInvariantViolation(#[source] BuildError),

    /// The refined mesh would have more vertices than a `u32` index can address.
    #[error("subdivided mesh needs {vertices} vertices, more than u32 indices allow")]
    IndexOverflow {
        /// Number of vertices the refined mesh would need.
        vertices: usize,
    },
}

/// Errors from file-level operations.
#[derive(Error, Debug)]
pub enum MeshError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line of a mesh file could not be parsed.
    #[error("{path}:{line}: {message}")]
    Parse {
        /// The file being read (empty for in-memory readers).
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// The imported geometry did not form a valid mesh.
    #[error("invalid geometry: {0}")]
    Build(#[from] BuildError),

    /// Subdivision failed.
    #[error("subdivision failed: {0}")]
    Subdivision(#[from] SubdivisionError),

    /// A subdivision level was requested that does not exist.
    #[error("level {level} does not exist (sequence has {len} levels)")]
    LevelOutOfRange {
        /// The requested level.
        level: usize,
        /// Number of levels available.
        len: usize,
    },
}
