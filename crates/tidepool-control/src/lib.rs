//! tidepool-control — the lifecycle reconciler.
//!
//! The [`Controller`] is the integration point with the external
//! execution runtime: inbound signals arrive as [`Event`] values, outbound
//! provisioning/destruction/submission requests leave through the
//! [`RuntimePort`] trait. It owns both registries, the dispatcher, and the
//! scaling engine, and is the only component that applies
//! confirmation-driven state transitions.
//!
//! # Architecture
//!
//! ```text
//! Controller::handle(Event, &mut dyn RuntimePort)
//!   ├── TaskRegistry   (submissions, completions)
//!   ├── FleetRegistry  (provision/destroy confirmations, floor)
//!   ├── Dispatcher     (pending → least-loaded active worker)
//!   └── ScalingEngine  (per-tick decision + audit record)
//! ```
//!
//! The core is synchronous and single-threaded; [`run`] is the async
//! drive loop that feeds it wall-clock ticks and channel-delivered events.

pub mod config;
pub mod controller;
pub mod event;
pub mod port;
pub mod run;

pub use config::{ConfigError, ControllerConfig};
pub use controller::Controller;
pub use event::{Event, TaskSpec};
pub use port::{ChannelPort, OutboundRequest, RuntimePort};
pub use run::run;
