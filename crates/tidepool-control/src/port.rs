//! Outbound boundary to the execution runtime.

use tokio::sync::mpsc;

use tidepool_state::{ExecutorId, TaskId, WorkerId};

/// Requests the controller emits toward the external runtime.
///
/// All requests are fire-and-forget: the runtime answers asynchronously
/// with the confirmation events in [`crate::Event`], and the core never
/// retries or times out on its own — an unconfirmed request leaves its
/// worker parked in `Requested`/`Decommissioning`, visible in the scaling
/// record for an external watchdog.
pub trait RuntimePort {
    /// Provision a worker. The identity was already allocated by the
    /// fleet registry; the request is tagged with it.
    fn provision_worker(&mut self, id: WorkerId, capacity: u32);

    /// Destroy a worker. Cannot be cancelled once emitted.
    fn destroy_worker(&mut self, id: WorkerId);

    /// Submit a task to the executor hosting its assigned worker.
    fn submit_task(&mut self, executor: &ExecutorId, task: TaskId);

    /// Drain finished: every task terminal, every worker destroyed.
    fn drained(&mut self);
}

/// An outbound request as a value, for ports that forward over a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundRequest {
    ProvisionWorker { id: WorkerId, capacity: u32 },
    DestroyWorker { id: WorkerId },
    SubmitTask { executor: ExecutorId, task: TaskId },
    Drained,
}

/// A port that forwards every request onto an unbounded channel — the
/// runtime adapter consumes them on the other end.
#[derive(Debug, Clone)]
pub struct ChannelPort {
    tx: mpsc::UnboundedSender<OutboundRequest>,
}

impl ChannelPort {
    pub fn new(tx: mpsc::UnboundedSender<OutboundRequest>) -> Self {
        Self { tx }
    }

    fn send(&self, request: OutboundRequest) {
        // A closed receiver means the runtime is gone; requests are
        // fire-and-forget, so there is nobody left to tell.
        let _ = self.tx.send(request);
    }
}

impl RuntimePort for ChannelPort {
    fn provision_worker(&mut self, id: WorkerId, capacity: u32) {
        self.send(OutboundRequest::ProvisionWorker { id, capacity });
    }

    fn destroy_worker(&mut self, id: WorkerId) {
        self.send(OutboundRequest::DestroyWorker { id });
    }

    fn submit_task(&mut self, executor: &ExecutorId, task: TaskId) {
        self.send(OutboundRequest::SubmitTask {
            executor: executor.clone(),
            task,
        });
    }

    fn drained(&mut self) {
        self.send(OutboundRequest::Drained);
    }
}
