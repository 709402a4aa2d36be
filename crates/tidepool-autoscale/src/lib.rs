//! tidepool-autoscale — utilization-driven worker scaling.
//!
//! Each evaluation tick the engine reads a [`FleetSnapshot`]
//! (active/running/pending counts), records an audit sample, and emits a
//! [`ScaleAction`]. The engine never mutates fleet or task state — the
//! reconciler applies its decisions.
//!
//! # Decision policy
//!
//! ```text
//! utilization = running / active        (unbounded pressure when active == 0)
//!
//! 1. active == 0 and pending > 0                      → ScaleUp (bootstrap)
//! 2. active < max and pending > 0 and
//!    (utilization ≥ up_threshold or pending > 2·active) → ScaleUp
//! 3. active > min and pending == 0 and
//!    utilization ≤ down_threshold                      → ScaleDown
//! 4. otherwise                                         → Hold
//! ```
//!
//! `up_threshold > down_threshold` always — the hysteresis band keeps
//! consecutive ticks from oscillating between up and down.

pub mod config;
pub mod engine;
pub mod record;

pub use config::{AutoscaleConfig, ConfigError};
pub use engine::{ScaleAction, ScalingEngine};
pub use record::{ScaleSample, ScalingRecord};
