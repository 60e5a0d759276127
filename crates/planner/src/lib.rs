//! Adaptive post-shuffle partition planning core.
//!
//! Architecture role:
//! - map-output statistics model consumed from the scheduler
//! - post-shuffle partition plan model shared with readers
//! - deterministic coalescing and broadcast-side selection policies
//!
//! Key modules:
//! - [`stats`]
//! - [`plan`]
//! - [`mapping`]
//! - [`coalesce`]
//! - [`broadcast`]
//! - [`diagnostics`]
//!
//! Everything here is pure and total on well-formed inputs; stateful
//! orchestration lives in `aex-coordinator`.

pub mod broadcast;
pub mod coalesce;
pub mod diagnostics;
pub mod mapping;
pub mod plan;
pub mod stats;

pub use broadcast::*;
pub use coalesce::*;
pub use diagnostics::*;
pub use mapping::*;
pub use plan::*;
pub use stats::*;
