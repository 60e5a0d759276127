use aex_common::{QueryId, StageId};
use serde::{Deserialize, Serialize};

/// Opaque token the shuffle transport resolves to stored map output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShuffleHandle {
    /// Query the map output belongs to.
    pub query: QueryId,
    /// Map stage that wrote the output.
    pub stage: StageId,
}

/// One upstream shuffle dependency, reduced to the facts the planner needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShuffleDependency {
    /// Transport handle for reading this dependency's map output.
    pub handle: ShuffleHandle,
    /// Pre-shuffle partition count defined by the upstream partitioner.
    pub num_pre_shuffle_partitions: u32,
    /// Partition count of the upstream dataset (the map-task count).
    ///
    /// A dependency with 0 upstream partitions contributes no data and its
    /// map stage is never submitted.
    pub upstream_partition_count: u32,
}
