//! Controller configuration.
//!
//! Static at construction. Loadable from a TOML file for the daemon;
//! every field has a CLI override there.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tidepool_autoscale::AutoscaleConfig;

/// Errors in the controller-level configuration. Fatal at construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Autoscale(#[from] tidepool_autoscale::ConfigError),

    #[error("evaluation_interval_ms must be positive")]
    ZeroInterval,

    #[error("worker_capacity must be at least 1")]
    ZeroCapacity,
}

/// Full configuration surface of the control loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    pub autoscale: AutoscaleConfig,
    /// Milliseconds between evaluation ticks.
    pub evaluation_interval_ms: u64,
    /// Milliseconds of quiet (all tasks terminal, no new load) before the
    /// controller drains the fleet and signals completion.
    pub quiescence_delay_ms: u64,
    /// Capacity units of each provisioned worker.
    pub worker_capacity: u32,
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.autoscale.validate()?;
        if self.evaluation_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.worker_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ControllerConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            autoscale: AutoscaleConfig::default(),
            evaluation_interval_ms: 1_000,
            quiescence_delay_ms: 5_000,
            worker_capacity: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(ControllerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = ControllerConfig {
            evaluation_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroInterval));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let config = ControllerConfig {
            worker_capacity: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroCapacity));
    }

    #[test]
    fn autoscale_errors_propagate() {
        let mut config = ControllerConfig::default();
        config.autoscale.scale_down_threshold = config.autoscale.scale_up_threshold;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Autoscale(_))
        ));
    }

    #[test]
    fn parse_full_toml() {
        let text = r#"
evaluation_interval_ms = 500
quiescence_delay_ms = 2000
worker_capacity = 2

[autoscale]
min_workers = 1
max_workers = 5
scale_up_threshold = 0.7
scale_down_threshold = 0.3
"#;
        let config: ControllerConfig = toml::from_str(text).unwrap();
        assert_eq!(config.autoscale.max_workers, 5);
        assert_eq!(config.evaluation_interval_ms, 500);
        assert_eq!(config.validate(), Ok(()));
    }
}
