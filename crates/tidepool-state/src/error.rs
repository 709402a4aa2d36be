//! Error types for the tidepool registries.
//!
//! Every variant is a rejected call: the registry is unchanged when one is
//! returned. Unknown-identity errors are the stale/duplicate-event cases
//! the reconciler logs and drops; the rest signal caller bugs or runtime
//! ordering violations.

use thiserror::Error;

use crate::types::{TaskId, TaskStatus, WorkerId, WorkerStatus};

/// Result type alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors that can occur during registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("task {0} already submitted")]
    DuplicateTask(TaskId),

    #[error("unknown task: {0}")]
    UnknownTask(TaskId),

    #[error("unknown worker: {0}")]
    UnknownWorker(WorkerId),

    #[error("task {id} cannot move from {from:?} to {to:?}")]
    InvalidTaskTransition {
        id: TaskId,
        from: TaskStatus,
        to: TaskStatus,
    },

    #[error("worker {id} cannot move from {from:?} to {to:?}")]
    InvalidWorkerTransition {
        id: WorkerId,
        from: WorkerStatus,
        to: WorkerStatus,
    },

    #[error("worker {worker} is not active, cannot take task {task}")]
    WorkerNotActive { task: TaskId, worker: WorkerId },

    #[error("decommissioning worker {id} would drop the fleet below {floor} active workers")]
    FloorBreached { id: WorkerId, floor: u32 },
}
