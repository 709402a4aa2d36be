//! tidepoold — the tidepool daemon.
//!
//! Wires the controller core to a built-in simulated executor: a workload
//! profile is injected on a schedule, provisioning/destruction/completion
//! confirmations come back with configurable latencies, and the run ends
//! with a per-task outcome table plus the scaling record.
//!
//! # Usage
//!
//! ```text
//! tidepoold simulate --load "0:10,2000:5" --max-workers 5
//! ```

mod harness;
mod report;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use tidepool_autoscale::AutoscaleConfig;
use tidepool_control::ControllerConfig;

use crate::harness::{parse_load_profile, SimOptions};

#[derive(Parser)]
#[command(name = "tidepoold", about = "Tidepool autoscaling daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a simulated workload against the control loop.
    Simulate {
        /// Controller config file (TOML). Overrides the scaling flags.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Load profile: comma-separated `offset_ms:count` batches.
        #[arg(long, default_value = "0:10")]
        load: String,

        /// Minimum active workers once reached.
        #[arg(long, default_value = "1")]
        min_workers: u32,

        /// Maximum active workers.
        #[arg(long, default_value = "10")]
        max_workers: u32,

        /// Utilization at or above which the fleet grows.
        #[arg(long, default_value = "0.7")]
        scale_up_threshold: f64,

        /// Utilization at or below which an idle fleet shrinks.
        #[arg(long, default_value = "0.3")]
        scale_down_threshold: f64,

        /// Milliseconds between evaluation ticks.
        #[arg(long, default_value = "200")]
        interval_ms: u64,

        /// Quiet milliseconds before the fleet drains.
        #[arg(long, default_value = "2000")]
        quiescence_ms: u64,

        /// Capacity units per worker.
        #[arg(long, default_value = "2")]
        worker_capacity: u32,

        /// Capacity units each task requires.
        #[arg(long, default_value = "1")]
        task_capacity: u32,

        /// Simulated execution time per task.
        #[arg(long, default_value = "1500")]
        task_duration_ms: u64,

        /// Simulated provisioning latency.
        #[arg(long, default_value = "400")]
        provision_latency_ms: u64,

        /// Simulated destruction latency.
        #[arg(long, default_value = "200")]
        destroy_latency_ms: u64,

        /// Fail every Nth task (0 = never).
        #[arg(long, default_value = "0")]
        fail_every: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tidepoold=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Simulate {
            config,
            load,
            min_workers,
            max_workers,
            scale_up_threshold,
            scale_down_threshold,
            interval_ms,
            quiescence_ms,
            worker_capacity,
            task_capacity,
            task_duration_ms,
            provision_latency_ms,
            destroy_latency_ms,
            fail_every,
        } => {
            let controller_config = match config {
                Some(path) => ControllerConfig::from_file(&path)?,
                None => ControllerConfig {
                    autoscale: AutoscaleConfig {
                        min_workers,
                        max_workers,
                        scale_up_threshold,
                        scale_down_threshold,
                    },
                    evaluation_interval_ms: interval_ms,
                    quiescence_delay_ms: quiescence_ms,
                    worker_capacity,
                },
            };
            controller_config.validate()?;

            let profile = parse_load_profile(&load)?;
            let options = SimOptions {
                task_capacity,
                task_duration_ms,
                provision_latency_ms,
                destroy_latency_ms,
                fail_every,
            };

            info!(batches = profile.len(), "starting simulation");
            let controller = harness::simulate(controller_config, &profile, options).await?;

            print!("{}", report::render(&controller));
            Ok(())
        }
    }
}
