//! Lifecycle reconciler.
//!
//! The controller is the single writer for confirmation-driven state:
//! it applies scale actions, absorbs asynchronous (possibly duplicated,
//! possibly stale) confirmations from the runtime, and drives graceful
//! shutdown once the workload is finished and the quiescence window has
//! passed. Recoverable conditions are absorbed here with a log line;
//! only configuration errors escape, at construction.

use std::cmp::Reverse;

use tracing::{debug, info, warn};

use tidepool_autoscale::{ScaleAction, ScalingEngine, ScalingRecord};
use tidepool_dispatch::Dispatcher;
use tidepool_state::{
    ExecutorId, FleetRegistry, FleetSnapshot, TaskId, TaskOutcome, TaskRegistry, Timestamp,
    WorkerId,
};

use crate::config::{ConfigError, ControllerConfig};
use crate::event::{Event, TaskSpec};
use crate::port::RuntimePort;

/// The autoscaling control loop core.
pub struct Controller {
    config: ControllerConfig,
    tasks: TaskRegistry,
    fleet: FleetRegistry,
    dispatcher: Dispatcher,
    engine: ScalingEngine,
    /// Time of the most recent evaluation tick.
    clock: Timestamp,
    /// Time load last arrived, stamped with the tick clock.
    last_load_change: Timestamp,
    draining: bool,
    done: bool,
}

impl Controller {
    /// Build a controller, rejecting an invalid configuration.
    pub fn new(config: ControllerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let engine = ScalingEngine::new(config.autoscale.clone())?;
        let fleet = FleetRegistry::new(config.autoscale.min_workers);
        Ok(Self {
            config,
            tasks: TaskRegistry::new(),
            fleet,
            dispatcher: Dispatcher::new(),
            engine,
            clock: 0,
            last_load_change: 0,
            draining: false,
            done: false,
        })
    }

    /// Apply one inbound event. The runtime delivers events one at a
    /// time in nondecreasing timestamp order.
    pub fn handle(&mut self, event: Event, port: &mut dyn RuntimePort) {
        match event {
            Event::EvaluationTick { now } => self.on_tick(now, port),
            Event::LoadChanged { tasks } => self.on_load_changed(tasks, port),
            Event::TaskCompleted { id, outcome } => self.on_task_completed(id, outcome, port),
            Event::WorkerProvisioned { id, executor } => {
                self.on_worker_provisioned(id, executor, port)
            }
            Event::WorkerDestroyed { id } => self.on_worker_destroyed(id, port),
        }
    }

    // ── Event handlers ─────────────────────────────────────────────

    fn on_tick(&mut self, now: Timestamp, port: &mut dyn RuntimePort) {
        self.clock = now;
        let snap = FleetSnapshot::capture(&self.tasks, &self.fleet);
        let action = self.engine.evaluate(now, &snap);

        if self.draining {
            return;
        }
        if self.drain_due(now) {
            self.begin_drain(port);
            return;
        }

        match action {
            ScaleAction::Up => self.scale_up(port),
            ScaleAction::Down => self.scale_down(port),
            ScaleAction::Hold => {}
        }
    }

    fn on_load_changed(&mut self, batch: Vec<TaskSpec>, port: &mut dyn RuntimePort) {
        if self.draining {
            warn!(count = batch.len(), "load arrived after drain started");
        }
        for spec in batch {
            if let Err(e) = self.tasks.submit(spec.id, spec.required_capacity) {
                warn!(task = spec.id, error = %e, "task submission dropped");
            }
        }
        self.last_load_change = self.clock;
        self.dispatch(port);
    }

    fn on_task_completed(&mut self, id: TaskId, outcome: TaskOutcome, port: &mut dyn RuntimePort) {
        if let Err(e) = self.tasks.mark_terminal(id, outcome) {
            warn!(task = id, error = %e, "completion dropped");
            return;
        }
        self.dispatch(port);
    }

    fn on_worker_provisioned(
        &mut self,
        id: WorkerId,
        executor: ExecutorId,
        port: &mut dyn RuntimePort,
    ) {
        if let Err(e) = self.fleet.confirm_active(id, executor) {
            warn!(worker = id, error = %e, "provision confirmation dropped");
            return;
        }
        if self.draining {
            // Drain already took effect; the newcomer goes straight back.
            match self.fleet.mark_decommissioning(id) {
                Ok(()) => port.destroy_worker(id),
                Err(e) => warn!(worker = id, error = %e, "drain of late worker rejected"),
            }
            return;
        }
        // Fresh capacity may absorb pending tasks.
        self.dispatch(port);
    }

    fn on_worker_destroyed(&mut self, id: WorkerId, port: &mut dyn RuntimePort) {
        if let Err(e) = self.fleet.confirm_destroyed(id) {
            warn!(worker = id, error = %e, "destruction confirmation dropped");
            return;
        }
        self.check_drained(port);
    }

    // ── Scale action application ───────────────────────────────────

    fn scale_up(&mut self, port: &mut dyn RuntimePort) {
        let ceiling = self.config.autoscale.max_workers;
        let in_flight = self.fleet.requested_count();
        // The engine only sees confirmed capacity; the ceiling must also
        // hold once in-flight provisions confirm.
        if self.fleet.active_count() + in_flight >= ceiling {
            debug!(in_flight, ceiling, "scale-up suppressed, ceiling reached in flight");
            return;
        }
        let capacity = self.config.worker_capacity;
        let id = self.fleet.request_worker(capacity);
        info!(worker = id, capacity, "scaling up");
        port.provision_worker(id, capacity);
    }

    fn scale_down(&mut self, port: &mut dyn RuntimePort) {
        // Fewest running tasks wins; ties prefer the youngest worker.
        // A victim still running tasks is allowed — its work finishes on
        // the decommissioning worker and is not reassigned.
        let victim = self
            .fleet
            .active_workers()
            .into_iter()
            .min_by_key(|w| (self.tasks.running_on(w.id), Reverse(w.id)))
            .map(|w| w.id);
        let Some(id) = victim else { return };

        match self.fleet.mark_decommissioning(id) {
            Ok(()) => {
                info!(worker = id, "scaling down");
                port.destroy_worker(id);
            }
            Err(e) => warn!(worker = id, error = %e, "scale-down rejected"),
        }
    }

    // ── Dispatch ───────────────────────────────────────────────────

    fn dispatch(&mut self, port: &mut dyn RuntimePort) {
        match self.dispatcher.dispatch(&mut self.tasks, &self.fleet) {
            Ok(assignments) => {
                for a in assignments {
                    port.submit_task(&a.executor, a.task);
                    // Executors are time-shared: a submitted task starts
                    // executing immediately.
                    if let Err(e) = self.tasks.mark_running(a.task) {
                        warn!(task = a.task, error = %e, "task failed to start");
                    }
                }
            }
            Err(e) => warn!(error = %e, "dispatch failed"),
        }
    }

    // ── Drain ──────────────────────────────────────────────────────

    fn drain_due(&self, now: Timestamp) -> bool {
        !self.tasks.is_empty()
            && self.tasks.all_terminal()
            && now.saturating_sub(self.last_load_change) >= self.config.quiescence_delay_ms
    }

    fn begin_drain(&mut self, port: &mut dyn RuntimePort) {
        info!("workload finished and quiescence elapsed, draining fleet");
        self.draining = true;
        self.fleet.release_floor();

        let active: Vec<WorkerId> = self.fleet.active_workers().iter().map(|w| w.id).collect();
        for id in active {
            match self.fleet.mark_decommissioning(id) {
                Ok(()) => port.destroy_worker(id),
                Err(e) => warn!(worker = id, error = %e, "drain decommission rejected"),
            }
        }
        self.check_drained(port);
    }

    fn check_drained(&mut self, port: &mut dyn RuntimePort) {
        if self.draining && !self.done && self.fleet.all_destroyed() {
            self.done = true;
            info!("fleet destroyed, controller done");
            port.drained();
        }
    }

    // ── Observability ──────────────────────────────────────────────

    /// Current workload pressure, as the next tick would observe it.
    pub fn snapshot(&self) -> FleetSnapshot {
        FleetSnapshot::capture(&self.tasks, &self.fleet)
    }

    /// The append-only (timestamp, active count) audit trail.
    pub fn record(&self) -> &ScalingRecord {
        self.engine.record()
    }

    pub fn tasks(&self) -> &TaskRegistry {
        &self.tasks
    }

    pub fn fleet(&self) -> &FleetRegistry {
        &self.fleet
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn is_draining(&self) -> bool {
        self.draining
    }

    /// True once the drain completed and `drained()` was signalled.
    pub fn is_done(&self) -> bool {
        self.done
    }
}
