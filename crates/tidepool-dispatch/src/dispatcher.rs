//! Task dispatcher — least-loaded worker selection.
//!
//! The dispatcher is the sole writer of task assignments. A worker is
//! usable for a task only while the task's capacity units still fit next
//! to its current assignments; tasks that fit nowhere stay pending and
//! keep pressure on the scaling engine. The dispatcher never re-submits a
//! task that is queued or executing on a live worker: only tasks in the
//! registry's pending set are considered.

use tracing::debug;

use tidepool_state::{
    ExecutorId, FleetRegistry, RegistryResult, TaskId, TaskRegistry, WorkerId,
};

/// One successful assignment, ready to be forwarded to the worker's
/// executor as a task-submission request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub task: TaskId,
    pub worker: WorkerId,
    pub executor: ExecutorId,
}

/// Assigns pending tasks to active workers.
#[derive(Debug, Default)]
pub struct Dispatcher;

impl Dispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Assign every pending task that can be placed.
    ///
    /// Pending tasks are visited in ascending id order (FIFO fairness).
    /// For each, among the active workers with room for the task's
    /// capacity units, the one with the fewest `Queued`/`InExecution`
    /// tasks wins; ties go to the lowest worker id. Loads are recomputed
    /// as assignments land, so one dispatch round spreads a batch across
    /// the fleet instead of stacking it on one worker.
    ///
    /// A task that fits no active worker stays pending — a transient
    /// state, not an error.
    pub fn dispatch(
        &self,
        tasks: &mut TaskRegistry,
        fleet: &FleetRegistry,
    ) -> RegistryResult<Vec<Assignment>> {
        let pending = tasks.pending_tasks(|w| fleet.is_active(w));
        if pending.is_empty() || fleet.active_count() == 0 {
            return Ok(Vec::new());
        }

        let mut assignments = Vec::new();
        for task_id in pending {
            let Some(required) = tasks.get(task_id).map(|t| t.required_capacity) else {
                continue;
            };

            // active_workers() is ascending by id and min_by_key keeps
            // the first minimum, so the lowest id wins ties.
            let candidate = fleet
                .active_workers()
                .into_iter()
                .filter(|w| tasks.assigned_capacity(w.id) + required <= w.capacity)
                .min_by_key(|w| tasks.assigned_load(w.id));
            let Some(worker) = candidate else {
                debug!(task = task_id, required, "no worker fits, task stays pending");
                continue;
            };

            tasks.mark_assigned(task_id, worker)?;
            let executor = worker
                .executor
                .clone()
                .expect("active worker always has an executor");
            debug!(task = task_id, worker = worker.id, "task dispatched");
            assignments.push(Assignment {
                task: task_id,
                worker: worker.id,
                executor,
            });
        }
        Ok(assignments)
    }
}
