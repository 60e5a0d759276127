#![deny(missing_docs)]

//! Shared configuration, error types, IDs, and observability primitives for AEX crates.
//!
//! Architecture role:
//! - defines the coordinator/broadcast configuration passed across layers
//! - provides common [`AexError`] / [`Result`] contracts
//! - hosts the metrics registry shared by planner and coordinator

/// Coordinator and broadcast configuration types.
pub mod config;
/// Shared error taxonomy.
pub mod error;
/// Strongly-typed identifier wrappers.
pub mod ids;
/// Metrics registry and Prometheus rendering helpers.
pub mod metrics;

pub use config::{BroadcastConfig, CoordinatorConfig};
pub use error::{AexError, Result};
pub use ids::*;
pub use metrics::MetricsRegistry;
