use aex_common::StageId;
use serde::{Deserialize, Serialize};

/// Per-partition byte statistics reported by one finished upstream map stage.
///
/// Immutable once produced; `bytes_by_partition[p]` is the total bytes written
/// for pre-shuffle partition `p` across all map tasks of the stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapOutputStatistics {
    /// Map stage that produced these statistics.
    pub stage: StageId,
    /// Dense byte counts indexed by pre-shuffle partition id.
    pub bytes_by_partition: Vec<u64>,
}

impl MapOutputStatistics {
    /// Build statistics for one stage.
    pub fn new(stage: StageId, bytes_by_partition: Vec<u64>) -> Self {
        Self {
            stage,
            bytes_by_partition,
        }
    }

    /// Pre-shuffle partition count of the producing stage.
    pub fn num_pre_shuffle_partitions(&self) -> usize {
        self.bytes_by_partition.len()
    }

    /// Total bytes across all pre-shuffle partitions.
    pub fn total_bytes(&self) -> u64 {
        self.bytes_by_partition
            .iter()
            .fold(0_u64, |acc, b| acc.saturating_add(*b))
    }
}

/// Sum byte counts across all inputs per pre-shuffle partition.
///
/// All inputs must carry the same partition count; the caller validates that
/// before summing.
pub fn combined_bytes_per_partition(stats: &[MapOutputStatistics]) -> Vec<u64> {
    let num_pre = stats
        .first()
        .map(MapOutputStatistics::num_pre_shuffle_partitions)
        .unwrap_or(0);
    let mut combined = vec![0_u64; num_pre];
    for s in stats {
        for (p, bytes) in s.bytes_by_partition.iter().enumerate() {
            combined[p] = combined[p].saturating_add(*bytes);
        }
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combines_bytes_across_inputs() {
        let a = MapOutputStatistics::new(StageId(1), vec![0, 99, 0, 20, 0]);
        let b = MapOutputStatistics::new(StageId(2), vec![30, 0, 70, 0, 30]);
        assert_eq!(
            combined_bytes_per_partition(&[a, b]),
            vec![30, 99, 70, 20, 30]
        );
    }

    #[test]
    fn total_bytes_saturates() {
        let s = MapOutputStatistics::new(StageId(1), vec![u64::MAX, 1]);
        assert_eq!(s.total_bytes(), u64::MAX);
    }
}
