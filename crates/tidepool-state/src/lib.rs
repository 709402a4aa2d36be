//! tidepool-state — authoritative task and fleet state.
//!
//! Two in-memory registries back the control loop:
//!
//! - [`TaskRegistry`] — every task ever submitted and its lifecycle status
//! - [`FleetRegistry`] — every worker ever requested, its status, and its
//!   hosting executor
//!
//! # Architecture
//!
//! Both registries are plain `BTreeMap`s keyed by ascending ids, so the
//! iteration order the dispatcher's tie-breaks rely on falls out of the
//! data structure. Each mutable field has exactly one writer: the
//! reconciler drives confirmation-based status transitions, the dispatcher
//! writes task assignments, and nothing else touches either. That
//! single-writer discipline is the only synchronization the single-threaded
//! core needs.

pub mod error;
pub mod fleet;
pub mod tasks;
pub mod types;

pub use error::{RegistryError, RegistryResult};
pub use fleet::FleetRegistry;
pub use tasks::TaskRegistry;
pub use types::*;
