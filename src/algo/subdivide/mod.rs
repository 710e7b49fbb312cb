//! Mesh subdivision.
//!
//! # Loop Subdivision
//!
//! Loop subdivision (Loop, 1987) is an approximating subdivision scheme for
//! triangle meshes. Each pass:
//!
//! 1. Inserts one new "odd" vertex per edge at a weighted position
//! 2. Smooths every original "even" vertex towards its neighbours
//! 3. Splits each triangle into 4 smaller triangles
//!
//! The result converges to a C² continuous surface (C¹ at extraordinary vertices).
//! Every pass reads its input and allocates a fresh mesh, so earlier levels
//! stay valid and can be kept alongside the refined ones.
//!
//! # Example
//!
//! ```
//! use loupe::prelude::*;
//! use loupe::algo::subdivide::{loop_subdivide, SubdivideOptions};
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//! let faces = [[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
//! let mesh = build_from_triangles(&positions, &faces).unwrap();
//!
//! let refined = loop_subdivide(&mesh, &SubdivideOptions::new(2)).unwrap();
//! assert_eq!(refined.face_count(), 4 * 16);
//! ```
//!
//! # References
//!
//! - Loop, C. (1987). "Smooth Subdivision Surfaces Based on Triangles."
//!   Master's thesis, University of Utah.

mod loop_subdivision;

pub use loop_subdivision::{loop_beta, loop_subdivide, loop_subdivide_with_progress, subdivide};

/// Options for repeated subdivision.
#[derive(Debug, Clone)]
pub struct SubdivideOptions {
    /// Number of subdivision passes.
    pub iterations: usize,
}

impl SubdivideOptions {
    /// Create options with the specified number of iterations.
    pub fn new(iterations: usize) -> Self {
        Self { iterations }
    }

    /// Set the number of iterations.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }
}

impl Default for SubdivideOptions {
    fn default() -> Self {
        Self::new(1)
    }
}
