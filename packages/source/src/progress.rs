//! Progress reporting for dataset preparation.
//!
//! Loading and joining report through [`ProgressCallback`] so the caller
//! chooses how to render it: `indicatif` spinners in the CLI, nothing in
//! tests.

use std::sync::Arc;

/// Receives progress from the preparation steps.
pub trait ProgressCallback: Send + Sync {
    /// Sets the number of steps expected.
    fn set_total(&self, total: u64);

    /// Advances by `delta` steps.
    fn inc(&self, delta: u64);

    /// Describes the step currently running.
    fn set_message(&self, msg: String);

    /// Marks preparation as done with a summary line.
    fn finish(&self, msg: String);
}

/// Ignores all progress updates.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
