//! Autoscale configuration and validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors in the threshold/bound relationships. Fatal at construction —
/// the engine refuses to start with an invalid configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("min_workers must be at least 1")]
    MinWorkersZero,

    #[error("max_workers ({max}) must be at least min_workers ({min})")]
    MaxBelowMin { min: u32, max: u32 },

    #[error("scale_up_threshold ({up}) must exceed scale_down_threshold ({down})")]
    ThresholdsInverted { up: f64, down: f64 },
}

/// Static scaling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoscaleConfig {
    /// Floor on active workers once reached. Always ≥ 1.
    pub min_workers: u32,
    /// Ceiling on active workers.
    pub max_workers: u32,
    /// Utilization at or above which the fleet grows.
    pub scale_up_threshold: f64,
    /// Utilization at or below which an idle fleet shrinks.
    pub scale_down_threshold: f64,
}

impl AutoscaleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_workers < 1 {
            return Err(ConfigError::MinWorkersZero);
        }
        if self.max_workers < self.min_workers {
            return Err(ConfigError::MaxBelowMin {
                min: self.min_workers,
                max: self.max_workers,
            });
        }
        if self.scale_up_threshold <= self.scale_down_threshold {
            return Err(ConfigError::ThresholdsInverted {
                up: self.scale_up_threshold,
                down: self.scale_down_threshold,
            });
        }
        Ok(())
    }
}

impl Default for AutoscaleConfig {
    fn default() -> Self {
        Self {
            min_workers: 1,
            max_workers: 10,
            scale_up_threshold: 0.7,
            scale_down_threshold: 0.3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(AutoscaleConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_min_workers_is_rejected() {
        let config = AutoscaleConfig {
            min_workers: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::MinWorkersZero));
    }

    #[test]
    fn max_below_min_is_rejected() {
        let config = AutoscaleConfig {
            min_workers: 5,
            max_workers: 3,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::MaxBelowMin { min: 5, max: 3 })
        );
    }

    #[test]
    fn equal_thresholds_are_rejected() {
        let config = AutoscaleConfig {
            scale_up_threshold: 0.5,
            scale_down_threshold: 0.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ThresholdsInverted { .. })
        ));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = AutoscaleConfig {
            min_workers: 2,
            max_workers: 8,
            scale_up_threshold: 0.75,
            scale_down_threshold: 0.25,
        };
        let text = toml::to_string(&config).unwrap();
        let parsed: AutoscaleConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
