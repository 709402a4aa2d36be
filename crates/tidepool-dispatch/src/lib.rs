//! tidepool-dispatch — pending-task assignment.
//!
//! Walks pending tasks oldest-first and places each on the active worker
//! with the fewest queued/executing tasks among those with room for the
//! task's capacity units, ties broken toward the earliest-created worker.
//! Returns the assignments it made; the caller forwards each as exactly
//! one outbound submission.

pub mod dispatcher;

pub use dispatcher::{Assignment, Dispatcher};
