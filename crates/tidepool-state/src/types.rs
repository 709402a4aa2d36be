//! Domain types for the tidepool registries.
//!
//! Tasks and workers are small serializable records; all richer state
//! (counts, snapshots) is derived at query time rather than stored.

use serde::{Deserialize, Serialize};

/// Unique identifier for a task. Allocated by the workload source,
/// strictly unique for the lifetime of the controller.
pub type TaskId = u64;

/// Unique identifier for a worker. Allocated by the fleet registry,
/// monotonically increasing, never reused.
pub type WorkerId = u64;

/// Reference to the external executor hosting an active worker.
pub type ExecutorId = String;

/// Virtual or wall-clock time in milliseconds.
pub type Timestamp = u64;

// ── Task ──────────────────────────────────────────────────────────

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Submitted, not yet assigned to a worker.
    Created,
    /// Assigned to a worker, execution not yet confirmed.
    Queued,
    /// Executing on its assigned worker.
    InExecution,
    /// Completed successfully. Terminal.
    Success,
    /// Completed with a failure. Terminal.
    Failed,
}

impl TaskStatus {
    /// True for `Success` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Success | TaskStatus::Failed)
    }
}

/// Outcome reported by the executor when a task finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOutcome {
    Success,
    Failed,
}

impl From<TaskOutcome> for TaskStatus {
    fn from(outcome: TaskOutcome) -> Self {
        match outcome {
            TaskOutcome::Success => TaskStatus::Success,
            TaskOutcome::Failed => TaskStatus::Failed,
        }
    }
}

/// A discrete unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Capacity units this task needs on its worker. Always ≥ 1.
    pub required_capacity: u32,
    pub status: TaskStatus,
    /// Set iff status is `Queued` or `InExecution`.
    pub assigned_worker: Option<WorkerId>,
}

impl Task {
    pub fn new(id: TaskId, required_capacity: u32) -> Self {
        Self {
            id,
            required_capacity,
            status: TaskStatus::Created,
            assigned_worker: None,
        }
    }

    /// The assignment invariant: a worker is recorded iff the task is
    /// queued or executing.
    pub fn invariant_holds(&self) -> bool {
        let assigned = matches!(self.status, TaskStatus::Queued | TaskStatus::InExecution);
        assigned == self.assigned_worker.is_some()
    }
}

// ── Worker ────────────────────────────────────────────────────────

/// Lifecycle status of a worker. Transitions are linear:
/// Requested → Active → Decommissioning → Destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    /// Provisioning requested, awaiting confirmation.
    Requested,
    /// Confirmed and hosted by an executor; may take tasks.
    Active,
    /// Destruction requested; running tasks finish, no new assignments.
    Decommissioning,
    /// Destruction confirmed. Terminal.
    Destroyed,
}

/// An opaque capacity unit that executes tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub id: WorkerId,
    /// Capacity units, fixed at creation. Always ≥ 1.
    pub capacity: u32,
    pub status: WorkerStatus,
    /// Set iff status is `Active` or `Decommissioning`.
    pub executor: Option<ExecutorId>,
}

impl Worker {
    /// The hosting invariant: an executor is recorded iff the worker is
    /// active or decommissioning.
    pub fn invariant_holds(&self) -> bool {
        let hosted = matches!(
            self.status,
            WorkerStatus::Active | WorkerStatus::Decommissioning
        );
        hosted == self.executor.is_some()
    }
}

// ── Fleet snapshot ────────────────────────────────────────────────

/// Point-in-time view of workload pressure, derived each evaluation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    /// Workers with status `Active`.
    pub active: u32,
    /// Tasks with status `InExecution`.
    pub running: u32,
    /// Tasks that are `Created`, or `Queued` without a usable active worker.
    pub pending: u32,
}

impl FleetSnapshot {
    /// Capture the current snapshot from both registries.
    pub fn capture(tasks: &crate::TaskRegistry, fleet: &crate::FleetRegistry) -> Self {
        Self {
            active: fleet.active_count(),
            running: tasks.running_count(),
            pending: tasks.pending_tasks(|w| fleet.is_active(w)).len() as u32,
        }
    }
}
