//! Inbound events from the execution runtime.
//!
//! One variant per inbound signal, dispatched by matching — the runtime
//! delivers them one at a time in nondecreasing timestamp order, FIFO
//! within a timestamp.

use serde::{Deserialize, Serialize};

use tidepool_state::{ExecutorId, TaskId, TaskOutcome, Timestamp, WorkerId};

/// A new task announced by the workload source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub id: TaskId,
    pub required_capacity: u32,
}

/// An inbound signal to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Periodic evaluation signal.
    EvaluationTick { now: Timestamp },
    /// A batch of new tasks arrived.
    LoadChanged { tasks: Vec<TaskSpec> },
    /// A task finished on its worker.
    TaskCompleted { id: TaskId, outcome: TaskOutcome },
    /// A provisioning request was fulfilled.
    WorkerProvisioned { id: WorkerId, executor: ExecutorId },
    /// A destruction request was fulfilled.
    WorkerDestroyed { id: WorkerId },
}
