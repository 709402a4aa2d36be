//! Async drive loop.
//!
//! Feeds the synchronous controller core from the outside world: a
//! periodic evaluation tick, a channel of inbound runtime events, and a
//! shutdown signal. Timestamps are milliseconds since loop start, so the
//! scaling record reads as a run-relative timeline.

use tokio::sync::{mpsc, watch};
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tracing::info;

use crate::controller::Controller;
use crate::event::Event;
use crate::port::RuntimePort;

/// Drive the controller until drain completes, the event channel closes,
/// or shutdown is signalled.
pub async fn run(
    controller: &mut Controller,
    port: &mut (impl RuntimePort + Send),
    mut events: mpsc::UnboundedReceiver<Event>,
    mut shutdown: watch::Receiver<bool>,
) {
    let interval = Duration::from_millis(controller.config().evaluation_interval_ms);
    let start = Instant::now();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(interval_ms = interval.as_millis() as u64, "control loop started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = start.elapsed().as_millis() as u64;
                controller.handle(Event::EvaluationTick { now }, port);
            }
            maybe = events.recv() => {
                match maybe {
                    Some(event) => controller.handle(event, port),
                    None => {
                        info!("event channel closed, control loop stopping");
                        break;
                    }
                }
            }
            _ = shutdown.changed() => {
                info!("control loop shutting down");
                break;
            }
        }

        if controller.is_done() {
            info!("drain complete, control loop finished");
            break;
        }
    }
}
