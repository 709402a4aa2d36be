//! FleetRegistry — authoritative record of every worker.
//!
//! Worker identities are allocated here (monotonic, never reused) and move
//! through the linear lifecycle Requested → Active → Decommissioning →
//! Destroyed, each confirmation-driven transition applied exactly once.
//! Confirmations may be redelivered by the external runtime, so
//! `confirm_active`/`confirm_destroyed` tolerate duplicates. The
//! configured floor on active workers is enforced at
//! `mark_decommissioning` — this is the only place a scale-down can be
//! blocked.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{RegistryError, RegistryResult};
use crate::types::{ExecutorId, Worker, WorkerId, WorkerStatus};

/// In-memory fleet registry keyed by ascending worker id.
#[derive(Debug)]
pub struct FleetRegistry {
    workers: BTreeMap<WorkerId, Worker>,
    next_id: WorkerId,
    /// Minimum number of active workers `mark_decommissioning` preserves.
    floor: u32,
}

impl FleetRegistry {
    pub fn new(floor: u32) -> Self {
        Self {
            workers: BTreeMap::new(),
            next_id: 0,
            floor,
        }
    }

    /// Allocate a new worker identity in status `Requested`.
    ///
    /// Pure allocation — the caller is responsible for emitting the
    /// outbound provisioning request tagged with the returned id.
    pub fn request_worker(&mut self, capacity: u32) -> WorkerId {
        let id = self.next_id;
        self.next_id += 1;
        self.workers.insert(
            id,
            Worker {
                id,
                capacity,
                status: WorkerStatus::Requested,
                executor: None,
            },
        );
        debug!(worker = id, capacity, "worker requested");
        id
    }

    /// Provisioning confirmed: `Requested` → `Active`.
    ///
    /// A duplicate confirmation for an already-active worker is a no-op.
    /// A confirmation for a worker already moving toward destruction is a
    /// stale event and is rejected rather than silently accepted.
    pub fn confirm_active(&mut self, id: WorkerId, executor: ExecutorId) -> RegistryResult<()> {
        let worker = self.get_mut(id)?;
        match worker.status {
            WorkerStatus::Requested => {
                worker.status = WorkerStatus::Active;
                worker.executor = Some(executor);
                debug!(worker = id, "worker active");
                Ok(())
            }
            WorkerStatus::Active => Ok(()), // duplicate confirmation
            from => Err(RegistryError::InvalidWorkerTransition {
                id,
                from,
                to: WorkerStatus::Active,
            }),
        }
    }

    /// Begin destruction: `Active` → `Decommissioning`.
    ///
    /// Rejected when the worker is not active (a destroy for a
    /// not-yet-confirmed worker is an ordering violation) or when losing
    /// it would drop the active count below the floor.
    pub fn mark_decommissioning(&mut self, id: WorkerId) -> RegistryResult<()> {
        let floor = self.floor;
        let active = self.active_count();
        let worker = self.get_mut(id)?;
        match worker.status {
            WorkerStatus::Active => {
                if active <= floor {
                    return Err(RegistryError::FloorBreached { id, floor });
                }
                worker.status = WorkerStatus::Decommissioning;
                debug!(worker = id, "worker decommissioning");
                Ok(())
            }
            from => Err(RegistryError::InvalidWorkerTransition {
                id,
                from,
                to: WorkerStatus::Decommissioning,
            }),
        }
    }

    /// Destruction confirmed: `Decommissioning` → `Destroyed`.
    ///
    /// Removes the executor mapping. A duplicate confirmation for an
    /// already-destroyed worker is a no-op.
    pub fn confirm_destroyed(&mut self, id: WorkerId) -> RegistryResult<()> {
        let worker = self.get_mut(id)?;
        match worker.status {
            WorkerStatus::Decommissioning => {
                worker.status = WorkerStatus::Destroyed;
                worker.executor = None;
                debug!(worker = id, "worker destroyed");
                Ok(())
            }
            WorkerStatus::Destroyed => Ok(()), // duplicate confirmation
            from => Err(RegistryError::InvalidWorkerTransition {
                id,
                from,
                to: WorkerStatus::Destroyed,
            }),
        }
    }

    /// Drop the floor to zero. Called once when drain begins so shutdown
    /// may decommission the final `floor` workers; never re-raised.
    pub fn release_floor(&mut self) {
        self.floor = 0;
    }

    /// Active workers in ascending id order — the dispatch tie-break basis.
    pub fn active_workers(&self) -> Vec<&Worker> {
        self.workers
            .values()
            .filter(|w| w.status == WorkerStatus::Active)
            .collect()
    }

    pub fn active_count(&self) -> u32 {
        self.workers
            .values()
            .filter(|w| w.status == WorkerStatus::Active)
            .count() as u32
    }

    /// Workers still awaiting provisioning confirmation.
    pub fn requested_count(&self) -> u32 {
        self.workers
            .values()
            .filter(|w| w.status == WorkerStatus::Requested)
            .count() as u32
    }

    pub fn is_active(&self, id: WorkerId) -> bool {
        self.workers
            .get(&id)
            .is_some_and(|w| w.status == WorkerStatus::Active)
    }

    /// True iff every worker ever requested has reached `Destroyed`.
    pub fn all_destroyed(&self) -> bool {
        self.workers
            .values()
            .all(|w| w.status == WorkerStatus::Destroyed)
    }

    pub fn get(&self, id: WorkerId) -> Option<&Worker> {
        self.workers.get(&id)
    }

    /// All workers in ascending id order.
    pub fn workers(&self) -> impl Iterator<Item = &Worker> {
        self.workers.values()
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    fn get_mut(&mut self, id: WorkerId) -> RegistryResult<&mut Worker> {
        self.workers
            .get_mut(&id)
            .ok_or(RegistryError::UnknownWorker(id))
    }
}
