//! Scaling record — the append-only audit trail of fleet size.
//!
//! One sample per evaluation tick, taken before the tick's action
//! executes, so the record reflects fleet size as observed at decision
//! time. Not consulted by the decision policy; read-only externally.

use serde::{Deserialize, Serialize};

use tidepool_state::Timestamp;

/// A single (timestamp, active count) observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleSample {
    pub at: Timestamp,
    pub active: u32,
}

/// Ordered sequence of samples, one per tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScalingRecord {
    samples: Vec<ScaleSample>,
}

impl ScalingRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, at: Timestamp, active: u32) {
        self.samples.push(ScaleSample { at, active });
    }

    pub fn samples(&self) -> &[ScaleSample] {
        &self.samples
    }

    /// Largest active count ever observed.
    pub fn peak(&self) -> Option<u32> {
        self.samples.iter().map(|s| s.active).max()
    }

    /// Smallest active count ever observed.
    pub fn trough(&self) -> Option<u32> {
        self.samples.iter().map(|s| s.active).min()
    }

    /// Active count at the first sample at or after `at`, falling back to
    /// the last sample. Useful for scenario assertions over a finished run.
    pub fn active_at_or_after(&self, at: Timestamp) -> Option<u32> {
        self.samples
            .iter()
            .find(|s| s.at >= at)
            .or(self.samples.last())
            .map(|s| s.active)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
