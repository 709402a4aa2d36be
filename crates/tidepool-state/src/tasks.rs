//! TaskRegistry — authoritative record of every task and its lifecycle.
//!
//! Tasks enter as `Created`, are assigned by the dispatcher (`Queued`),
//! start executing (`InExecution`), and finish (`Success`/`Failed`).
//! Terminal tasks are never mutated again. The registry enforces the
//! assignment invariant on every transition: a task references a worker
//! iff it is queued or executing.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{RegistryError, RegistryResult};
use crate::types::{Task, TaskId, TaskOutcome, TaskStatus, Worker, WorkerId, WorkerStatus};

/// In-memory task registry keyed by ascending task id.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: BTreeMap<TaskId, Task>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new task in status `Created`.
    pub fn submit(&mut self, id: TaskId, required_capacity: u32) -> RegistryResult<()> {
        if self.tasks.contains_key(&id) {
            return Err(RegistryError::DuplicateTask(id));
        }
        self.tasks.insert(id, Task::new(id, required_capacity));
        debug!(task = id, required_capacity, "task submitted");
        Ok(())
    }

    /// Assign a task to a worker: `Created`/`Queued` → `Queued`.
    ///
    /// Re-assignment of a `Queued` task is allowed — it happens when the
    /// original worker left `Active` before execution started and the task
    /// fell back into the pending set. The target worker must be `Active`.
    pub fn mark_assigned(&mut self, id: TaskId, worker: &Worker) -> RegistryResult<()> {
        if worker.status != WorkerStatus::Active {
            return Err(RegistryError::WorkerNotActive {
                task: id,
                worker: worker.id,
            });
        }
        let task = self.get_mut(id)?;
        match task.status {
            TaskStatus::Created | TaskStatus::Queued => {
                task.status = TaskStatus::Queued;
                task.assigned_worker = Some(worker.id);
                debug!(task = id, worker = worker.id, "task assigned");
                Ok(())
            }
            from => Err(RegistryError::InvalidTaskTransition {
                id,
                from,
                to: TaskStatus::Queued,
            }),
        }
    }

    /// Execution started: `Queued` → `InExecution`.
    pub fn mark_running(&mut self, id: TaskId) -> RegistryResult<()> {
        let task = self.get_mut(id)?;
        match task.status {
            TaskStatus::Queued => {
                task.status = TaskStatus::InExecution;
                Ok(())
            }
            from => Err(RegistryError::InvalidTaskTransition {
                id,
                from,
                to: TaskStatus::InExecution,
            }),
        }
    }

    /// Execution finished: `InExecution` → `Success`/`Failed`.
    ///
    /// Idempotent for a repeated identical outcome; a conflicting outcome
    /// for an already-terminal task is rejected. The worker assignment is
    /// cleared — terminal tasks carry none.
    pub fn mark_terminal(&mut self, id: TaskId, outcome: TaskOutcome) -> RegistryResult<()> {
        let target = TaskStatus::from(outcome);
        let task = self.get_mut(id)?;
        match task.status {
            TaskStatus::InExecution => {
                task.status = target;
                task.assigned_worker = None;
                debug!(task = id, ?outcome, "task finished");
                Ok(())
            }
            from if from == target => Ok(()), // duplicate completion
            from => Err(RegistryError::InvalidTaskTransition {
                id,
                from,
                to: target,
            }),
        }
    }

    /// Tasks awaiting dispatch, in ascending id order: every `Created`
    /// task, plus every `Queued` task whose assigned worker the predicate
    /// no longer considers active.
    pub fn pending_tasks(&self, is_active: impl Fn(WorkerId) -> bool) -> Vec<TaskId> {
        self.tasks
            .values()
            .filter(|t| match t.status {
                TaskStatus::Created => true,
                TaskStatus::Queued => !t.assigned_worker.is_some_and(&is_active),
                _ => false,
            })
            .map(|t| t.id)
            .collect()
    }

    /// Number of tasks currently `InExecution`.
    pub fn running_count(&self) -> u32 {
        self.tasks
            .values()
            .filter(|t| t.status == TaskStatus::InExecution)
            .count() as u32
    }

    /// Number of `Queued` + `InExecution` tasks assigned to a worker —
    /// the dispatch load metric.
    pub fn assigned_load(&self, worker: WorkerId) -> u32 {
        self.tasks
            .values()
            .filter(|t| {
                t.assigned_worker == Some(worker)
                    && matches!(t.status, TaskStatus::Queued | TaskStatus::InExecution)
            })
            .count() as u32
    }

    /// Capacity units consumed on a worker by its `Queued`/`InExecution`
    /// tasks — the dispatch fit check.
    pub fn assigned_capacity(&self, worker: WorkerId) -> u32 {
        self.tasks
            .values()
            .filter(|t| {
                t.assigned_worker == Some(worker)
                    && matches!(t.status, TaskStatus::Queued | TaskStatus::InExecution)
            })
            .map(|t| t.required_capacity)
            .sum()
    }

    /// Number of `InExecution` tasks on a worker — the scale-down victim
    /// metric.
    pub fn running_on(&self, worker: WorkerId) -> u32 {
        self.tasks
            .values()
            .filter(|t| t.assigned_worker == Some(worker) && t.status == TaskStatus::InExecution)
            .count() as u32
    }

    /// True iff every submitted task is `Success` or `Failed`.
    /// Vacuously true for an empty registry.
    pub fn all_terminal(&self) -> bool {
        self.tasks.values().all(|t| t.status.is_terminal())
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// All tasks in ascending id order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn get_mut(&mut self, id: TaskId) -> RegistryResult<&mut Task> {
        self.tasks.get_mut(&id).ok_or(RegistryError::UnknownTask(id))
    }
}
