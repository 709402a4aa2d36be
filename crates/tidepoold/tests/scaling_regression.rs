//! Scaling regression scenarios.
//!
//! Drives the controller through a deterministic virtual-clock runtime:
//! events are delivered in time order (FIFO within a timestamp), outbound
//! requests are answered with fixed-latency confirmations, and every step
//! re-checks the fleet bounds and the task/worker invariants.

use tidepool_autoscale::AutoscaleConfig;
use tidepool_control::{
    Controller, ControllerConfig, Event, OutboundRequest, RuntimePort, TaskSpec,
};
use tidepool_state::{ExecutorId, TaskId, TaskOutcome, TaskStatus, Timestamp, WorkerId};

const INTERVAL_MS: u64 = 100;
const PROVISION_LATENCY_MS: u64 = 50;
const DESTROY_LATENCY_MS: u64 = 50;
const TASK_DURATION_MS: u64 = 500;
const HORIZON_MS: u64 = 120_000;

fn config(min: u32, max: u32, capacity: u32, quiescence_ms: u64) -> ControllerConfig {
    ControllerConfig {
        autoscale: AutoscaleConfig {
            min_workers: min,
            max_workers: max,
            scale_up_threshold: 0.7,
            scale_down_threshold: 0.3,
        },
        evaluation_interval_ms: INTERVAL_MS,
        quiescence_delay_ms: quiescence_ms,
        worker_capacity: capacity,
    }
}

/// Port that collects requests for the sim loop to answer.
#[derive(Default)]
struct CollectPort {
    out: Vec<OutboundRequest>,
}

impl RuntimePort for CollectPort {
    fn provision_worker(&mut self, id: WorkerId, capacity: u32) {
        self.out.push(OutboundRequest::ProvisionWorker { id, capacity });
    }

    fn destroy_worker(&mut self, id: WorkerId) {
        self.out.push(OutboundRequest::DestroyWorker { id });
    }

    fn submit_task(&mut self, executor: &ExecutorId, task: TaskId) {
        self.out.push(OutboundRequest::SubmitTask {
            executor: executor.clone(),
            task,
        });
    }

    fn drained(&mut self) {
        self.out.push(OutboundRequest::Drained);
    }
}

/// Deterministic discrete-event driver for the controller.
struct Sim {
    controller: Controller,
    port: CollectPort,
    queue: Vec<(Timestamp, u64, Event)>,
    seq: u64,
    max_workers: u32,
    fail_every: u64,
    drain_started_at: Option<Timestamp>,
}

impl Sim {
    fn new(config: ControllerConfig) -> Self {
        let max_workers = config.autoscale.max_workers;
        let mut sim = Self {
            controller: Controller::new(config).unwrap(),
            port: CollectPort::default(),
            queue: Vec::new(),
            seq: 0,
            max_workers,
            fail_every: 0,
            drain_started_at: None,
        };
        sim.schedule(INTERVAL_MS, Event::EvaluationTick { now: INTERVAL_MS });
        sim
    }

    fn schedule(&mut self, at: Timestamp, event: Event) {
        self.queue.push((at, self.seq, event));
        self.seq += 1;
    }

    fn schedule_load(&mut self, at: Timestamp, ids: std::ops::RangeInclusive<TaskId>, capacity: u32) {
        let tasks = ids
            .map(|id| TaskSpec {
                id,
                required_capacity: capacity,
            })
            .collect();
        self.schedule(at, Event::LoadChanged { tasks });
    }

    /// Process events in (time, seq) order until drain completes, the
    /// queue empties, or the horizon passes.
    fn run(&mut self) {
        while let Some(idx) = self
            .queue
            .iter()
            .enumerate()
            .min_by_key(|(_, (at, seq, _))| (*at, *seq))
            .map(|(idx, _)| idx)
        {
            let (now, _, event) = self.queue.remove(idx);
            if now > HORIZON_MS {
                break;
            }

            let is_tick = matches!(event, Event::EvaluationTick { .. });
            self.controller.handle(event, &mut self.port);

            if is_tick && !self.controller.is_done() && now + INTERVAL_MS <= HORIZON_MS {
                self.schedule(
                    now + INTERVAL_MS,
                    Event::EvaluationTick { now: now + INTERVAL_MS },
                );
            }

            for request in std::mem::take(&mut self.port.out) {
                match request {
                    OutboundRequest::ProvisionWorker { id, .. } => self.schedule(
                        now + PROVISION_LATENCY_MS,
                        Event::WorkerProvisioned {
                            id,
                            executor: format!("executor-{id}"),
                        },
                    ),
                    OutboundRequest::DestroyWorker { id } => {
                        self.schedule(now + DESTROY_LATENCY_MS, Event::WorkerDestroyed { id })
                    }
                    OutboundRequest::SubmitTask { task, .. } => {
                        let outcome = if self.fail_every > 0 && task % self.fail_every == 0 {
                            TaskOutcome::Failed
                        } else {
                            TaskOutcome::Success
                        };
                        self.schedule(
                            now + TASK_DURATION_MS,
                            Event::TaskCompleted { id: task, outcome },
                        )
                    }
                    OutboundRequest::Drained => {}
                }
            }

            if self.drain_started_at.is_none() && self.controller.is_draining() {
                self.drain_started_at = Some(now);
            }
            self.check_invariants();

            if self.controller.is_done() {
                break;
            }
        }
    }

    fn check_invariants(&self) {
        assert!(
            self.controller.fleet().active_count() <= self.max_workers,
            "active count exceeded the ceiling"
        );
        for task in self.controller.tasks().tasks() {
            assert!(task.invariant_holds(), "task invariant broken: {task:?}");
        }
        for worker in self.controller.fleet().workers() {
            assert!(worker.invariant_holds(), "worker invariant broken: {worker:?}");
        }
    }

    /// Samples taken strictly before drain began.
    fn pre_drain_actives(&self) -> Vec<u32> {
        let cutoff = self.drain_started_at.unwrap_or(u64::MAX);
        self.controller
            .record()
            .samples()
            .iter()
            .filter(|s| s.at < cutoff)
            .map(|s| s.active)
            .collect()
    }

    fn success_count(&self) -> usize {
        self.controller
            .tasks()
            .tasks()
            .filter(|t| t.status == TaskStatus::Success)
            .count()
    }

    fn failed_count(&self) -> usize {
        self.controller
            .tasks()
            .tasks()
            .filter(|t| t.status == TaskStatus::Failed)
            .count()
    }
}

#[test]
fn fleet_grows_under_increasing_load() {
    let mut sim = Sim::new(config(1, 10, 1, 2_500));
    sim.schedule_load(0, 1..=2, 1);
    sim.schedule_load(1_000, 3..=7, 1);
    sim.schedule_load(2_000, 8..=17, 1);
    sim.run();

    assert!(sim.controller.is_done());
    assert_eq!(sim.success_count(), 17);

    let record = sim.controller.record();
    let early = record.active_at_or_after(300).unwrap();
    let peak = record.peak().unwrap();
    assert!(peak > early, "expected growth: early={early} peak={peak}");
    assert!(peak <= 10);
}

#[test]
fn fleet_shrinks_when_load_falls() {
    // Quiescence long enough to watch the descent reach the floor
    // before the drain kicks in.
    let mut sim = Sim::new(config(1, 10, 1, 6_000));
    sim.schedule_load(0, 1..=12, 1);
    sim.run();

    assert!(sim.controller.is_done());
    let peak = sim.controller.record().peak().unwrap();
    assert!(peak >= 5, "expected a real burst, peak={peak}");

    let pre_drain = sim.pre_drain_actives();
    assert_eq!(*pre_drain.last().unwrap(), 1, "descent should end at the floor");

    // Once one worker was active, the fleet never emptied before drain.
    let reached = pre_drain.iter().position(|&a| a >= 1).unwrap();
    assert!(pre_drain[reached..].iter().all(|&a| a >= 1));
}

#[test]
fn ceiling_is_never_exceeded_under_burst() {
    let mut sim = Sim::new(config(1, 5, 1, 2_500));
    sim.schedule_load(0, 1..=50, 1);
    sim.schedule_load(1_000, 51..=100, 1);
    sim.run();

    // Bounds were asserted after every event; the burst saturates.
    assert!(sim.controller.is_done());
    assert_eq!(sim.controller.record().peak(), Some(5));
    assert_eq!(sim.success_count(), 100);
}

#[test]
fn floor_holds_once_reached() {
    let mut sim = Sim::new(config(2, 6, 1, 6_000));
    sim.schedule_load(0, 1..=6, 1);
    sim.run();

    assert!(sim.controller.is_done());

    let pre_drain = sim.pre_drain_actives();
    let reached = pre_drain
        .iter()
        .position(|&a| a >= 2)
        .expect("floor never reached");
    assert!(
        pre_drain[reached..].iter().all(|&a| a >= 2),
        "active dropped below the floor before drain: {pre_drain:?}"
    );
    assert_eq!(*pre_drain.last().unwrap(), 2);
}

#[test]
fn fluctuating_load_tracks_demand() {
    let mut sim = Sim::new(config(1, 8, 1, 2_500));
    sim.schedule_load(0, 1..=2, 1);
    sim.schedule_load(1_500, 3..=10, 1);
    sim.schedule_load(4_000, 11..=20, 1);
    sim.run();

    assert!(sim.controller.is_done());
    assert_eq!(sim.success_count(), 20);

    let record = sim.controller.record();
    let lull = record.active_at_or_after(1_400).unwrap();
    let peak = record.peak().unwrap();
    assert!(lull <= 2, "two tasks should not grow the fleet: {lull}");
    assert!(peak >= 4, "bursts should grow the fleet: {peak}");
    assert!(peak <= 8);
}

#[test]
fn saturated_worker_drives_growth() {
    // Two-unit workers: one worker runs two tasks (utilization 2.0) and
    // the third task keeps pending pressure on until a second worker
    // absorbs it.
    let mut sim = Sim::new(config(1, 5, 2, 2_500));
    sim.schedule_load(0, 1..=3, 1);
    sim.run();

    assert!(sim.controller.is_done());
    assert_eq!(sim.success_count(), 3);
    assert!(sim.controller.record().peak().unwrap() >= 2);
}

#[test]
fn failed_tasks_still_drain() {
    let mut sim = Sim::new(config(1, 4, 1, 2_500));
    sim.fail_every = 3;
    sim.schedule_load(0, 1..=6, 1);
    sim.run();

    assert!(sim.controller.is_done());
    assert_eq!(sim.failed_count(), 2); // tasks 3 and 6
    assert_eq!(sim.success_count(), 4);
    assert!(sim.controller.fleet().all_destroyed());
}

#[test]
fn stale_and_duplicate_confirmations_are_harmless() {
    let mut sim = Sim::new(config(1, 4, 1, 2_500));
    sim.schedule_load(0, 1..=2, 1);
    // Redelivered provision confirmation for worker 0 and a destruction
    // confirmation for an identity that never existed.
    sim.schedule(
        400,
        Event::WorkerProvisioned {
            id: 0,
            executor: "executor-0".to_string(),
        },
    );
    sim.schedule(300, Event::WorkerDestroyed { id: 999 });
    sim.run();

    assert!(sim.controller.is_done());
    assert_eq!(sim.success_count(), 2);
    assert!(sim.controller.fleet().all_destroyed());
}
