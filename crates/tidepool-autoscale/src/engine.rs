//! Scaling decision engine.
//!
//! Pure policy: reads a snapshot, records it, returns an action. The
//! reconciler owns applying the action (and may suppress a scale-up when
//! enough provisions are already in flight).

use tracing::debug;

use tidepool_state::{FleetSnapshot, Timestamp};

use crate::config::{AutoscaleConfig, ConfigError};
use crate::record::ScalingRecord;

/// A scaling decision for one evaluation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleAction {
    /// Provision one additional worker.
    Up,
    /// Decommission one idle-most worker.
    Down,
    /// No change.
    Hold,
}

/// Evaluates workload pressure on a fixed tick and emits scale actions.
pub struct ScalingEngine {
    config: AutoscaleConfig,
    record: ScalingRecord,
}

impl ScalingEngine {
    /// Create an engine, rejecting invalid threshold/bound relationships.
    pub fn new(config: AutoscaleConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            record: ScalingRecord::new(),
        })
    }

    /// Evaluate one tick.
    ///
    /// Appends a `(now, active)` sample — on every tick, including Hold —
    /// before deciding, so the record reflects fleet size as observed at
    /// decision time.
    pub fn evaluate(&mut self, now: Timestamp, snap: &FleetSnapshot) -> ScaleAction {
        self.record.push(now, snap.active);

        let action = self.decide(snap);
        debug!(
            now,
            active = snap.active,
            running = snap.running,
            pending = snap.pending,
            utilization = self.utilization(snap),
            ?action,
            "tick evaluated"
        );
        action
    }

    fn decide(&self, snap: &FleetSnapshot) -> ScaleAction {
        let cfg = &self.config;

        // Bootstrap: an empty fleet with waiting work is unbounded
        // pressure, regardless of thresholds.
        if snap.active == 0 {
            return if snap.pending > 0 {
                ScaleAction::Up
            } else {
                ScaleAction::Hold
            };
        }

        let utilization = self.utilization(snap);

        if snap.active < cfg.max_workers
            && snap.pending > 0
            && (utilization >= cfg.scale_up_threshold || snap.pending > 2 * snap.active)
        {
            return ScaleAction::Up;
        }

        if snap.active > cfg.min_workers
            && snap.pending == 0
            && utilization <= cfg.scale_down_threshold
        {
            return ScaleAction::Down;
        }

        ScaleAction::Hold
    }

    /// Running tasks per active worker. Zero for an empty fleet — the
    /// zero-fleet case is decided by the bootstrap rule before this is
    /// consulted.
    pub fn utilization(&self, snap: &FleetSnapshot) -> f64 {
        if snap.active == 0 {
            0.0
        } else {
            f64::from(snap.running) / f64::from(snap.active)
        }
    }

    /// The audit trail of (timestamp, active) samples.
    pub fn record(&self) -> &ScalingRecord {
        &self.record
    }

    pub fn config(&self) -> &AutoscaleConfig {
        &self.config
    }
}
