//! Simulated executor harness.
//!
//! Plays the role of the external execution runtime: a workload injector
//! delivers load batches on schedule, and an executor task answers every
//! outbound request with a delayed confirmation event. Task durations and
//! lifecycle latencies are fixed per run, so a given profile always plays
//! out the same way.

use anyhow::{bail, Context, Result};
use tokio::sync::{mpsc, watch};
use tokio::time::{Duration, Instant};
use tracing::debug;

use tidepool_control::{run, ChannelPort, Controller, ControllerConfig, Event, OutboundRequest, TaskSpec};
use tidepool_state::{TaskId, TaskOutcome};

/// One scheduled batch of tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadBatch {
    pub offset_ms: u64,
    pub count: u32,
}

/// Executor-side simulation knobs.
#[derive(Debug, Clone, Copy)]
pub struct SimOptions {
    pub task_capacity: u32,
    pub task_duration_ms: u64,
    pub provision_latency_ms: u64,
    pub destroy_latency_ms: u64,
    /// Fail every Nth task; 0 disables failure injection.
    pub fail_every: u64,
}

/// Parse a load profile like `"0:10,2000:5"` into batches, sorted by
/// offset.
pub fn parse_load_profile(s: &str) -> Result<Vec<LoadBatch>> {
    let mut batches = Vec::new();
    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (offset, count) = part
            .split_once(':')
            .with_context(|| format!("bad load batch '{part}', expected offset_ms:count"))?;
        batches.push(LoadBatch {
            offset_ms: offset
                .trim()
                .parse()
                .with_context(|| format!("bad offset in '{part}'"))?,
            count: count
                .trim()
                .parse()
                .with_context(|| format!("bad count in '{part}'"))?,
        });
    }
    if batches.is_empty() {
        bail!("load profile is empty");
    }
    batches.sort_by_key(|b| b.offset_ms);
    Ok(batches)
}

/// Run the control loop against the simulated executor until the fleet
/// drains, returning the finished controller for reporting.
pub async fn simulate(
    config: ControllerConfig,
    profile: &[LoadBatch],
    options: SimOptions,
) -> Result<Controller> {
    let mut controller = Controller::new(config)?;

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let injector = tokio::spawn(inject_load(
        event_tx.clone(),
        profile.to_vec(),
        options.task_capacity,
    ));
    let executor = tokio::spawn(run_executor(event_tx, out_rx, options));

    let mut port = ChannelPort::new(out_tx);
    run(&mut controller, &mut port, event_rx, shutdown_rx).await;

    injector.abort();
    executor.abort();
    Ok(controller)
}

/// Deliver each load batch at its offset from simulation start.
async fn inject_load(
    event_tx: mpsc::UnboundedSender<Event>,
    batches: Vec<LoadBatch>,
    task_capacity: u32,
) {
    let start = Instant::now();
    let mut next_id: TaskId = 1;
    for batch in batches {
        let at = Duration::from_millis(batch.offset_ms);
        let elapsed = start.elapsed();
        if at > elapsed {
            tokio::time::sleep(at - elapsed).await;
        }

        let tasks: Vec<TaskSpec> = (0..u64::from(batch.count))
            .map(|i| TaskSpec {
                id: next_id + i,
                required_capacity: task_capacity,
            })
            .collect();
        next_id += u64::from(batch.count);

        debug!(offset_ms = batch.offset_ms, count = batch.count, "injecting load");
        if event_tx.send(Event::LoadChanged { tasks }).is_err() {
            break;
        }
    }
}

/// Answer outbound requests with delayed confirmations.
async fn run_executor(
    event_tx: mpsc::UnboundedSender<Event>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundRequest>,
    options: SimOptions,
) {
    while let Some(request) = out_rx.recv().await {
        let event_tx = event_tx.clone();
        match request {
            OutboundRequest::ProvisionWorker { id, .. } => {
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(options.provision_latency_ms)).await;
                    let _ = event_tx.send(Event::WorkerProvisioned {
                        id,
                        executor: format!("executor-{id}"),
                    });
                });
            }
            OutboundRequest::DestroyWorker { id } => {
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(options.destroy_latency_ms)).await;
                    let _ = event_tx.send(Event::WorkerDestroyed { id });
                });
            }
            OutboundRequest::SubmitTask { task, .. } => {
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(options.task_duration_ms)).await;
                    let outcome = if options.fail_every > 0 && task % options.fail_every == 0 {
                        TaskOutcome::Failed
                    } else {
                        TaskOutcome::Success
                    };
                    let _ = event_tx.send(Event::TaskCompleted { id: task, outcome });
                });
            }
            OutboundRequest::Drained => break,
        }
    }
}
