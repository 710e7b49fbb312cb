//! Per-level progress for subdivision.
//!
//! Each Loop pass quadruples the face count, so the last of several passes
//! dominates the run time. Drivers such as
//! [`MeshSequence::ensure_level_with_progress`](crate::sequence::MeshSequence::ensure_level_with_progress)
//! report once before every pass and once more when the requested level is
//! ready, which is enough for a terminal bar or a status line.
//!
//! # Example
//!
//! ```
//! use loupe::algo::Progress;
//! use loupe::prelude::*;
//! use nalgebra::Point3;
//! use std::sync::{Arc, Mutex};
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let log = Arc::clone(&seen);
//! let progress = Progress::new(move |level, levels, _| {
//!     log.lock().unwrap().push((level, levels));
//! });
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mut sequence = MeshSequence::from_geometry(&positions, &[[0, 1, 2]]).unwrap();
//! sequence.ensure_level_with_progress(2, &progress).unwrap();
//!
//! assert_eq!(*seen.lock().unwrap(), vec![(0, 2), (1, 2), (2, 2)]);
//! ```

/// Callback invoked with `(passes done, passes requested, label)`.
///
/// Reporting `done == total` marks the end of the run.
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Wrap a callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report that `done` of `total` passes have finished.
    #[inline]
    pub fn report(&self, done: usize, total: usize, label: &str) {
        (self.callback)(done, total, label);
    }

    /// Report a completed run of `total` passes. Nothing is sent when no
    /// pass was needed.
    pub fn finish(&self, total: usize, label: &str) {
        if total > 0 {
            self.report(total, total, label);
        }
    }

    /// A reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording() -> (Progress, Arc<Mutex<Vec<(usize, usize)>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let progress = Progress::new(move |done, total, _| log.lock().unwrap().push((done, total)));
        (progress, seen)
    }

    #[test]
    fn test_finish_reports_completion() {
        let (progress, seen) = recording();
        progress.report(0, 3, "pass");
        progress.finish(3, "pass");
        assert_eq!(*seen.lock().unwrap(), vec![(0, 3), (3, 3)]);
    }

    #[test]
    fn test_finish_without_passes_is_silent() {
        let (progress, seen) = recording();
        progress.finish(0, "pass");
        assert!(seen.lock().unwrap().is_empty());
    }
}
