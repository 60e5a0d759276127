//! Collaborator seams consumed by the coordinator.

use async_trait::async_trait;

use aex_common::{ExchangeId, Result};
use aex_planner::MapOutputStatistics;
use aex_shuffle::ShuffleDependency;

/// One shuffle exchange participating in adaptive post-shuffle planning.
///
/// Exchanges hold a handle back to their coordinator only to call
/// `plan_for`; the coordinator stores registrations by stable id, so there is
/// no cyclic ownership between the two.
pub trait Exchange: Send + Sync {
    /// Stable identity used for registration and plan lookup.
    fn id(&self) -> ExchangeId;

    /// Materialize this exchange's shuffle dependency.
    ///
    /// Called once per exchange during estimation, in registration order.
    fn prepare_shuffle_dependency(&self) -> ShuffleDependency;
}

/// Map-stage submission seam to the surrounding scheduler.
#[async_trait]
pub trait MapStageScheduler: Send + Sync {
    /// Submit the dependency's map stage.
    ///
    /// The returned future resolves once the stage finishes with its
    /// per-partition byte statistics; scheduler-side cancellation surfaces as
    /// an error.
    async fn submit_map_stage(&self, dep: &ShuffleDependency) -> Result<MapOutputStatistics>;
}
