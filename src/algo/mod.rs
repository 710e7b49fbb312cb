//! Mesh processing algorithms.
//!
//! - **Subdivision**: Loop subdivision of triangle meshes, one level at a time
//! - **Picking**: nearest-vertex lookup in world or screen space

pub mod pick;
pub mod progress;
pub mod subdivide;

pub use progress::Progress;
