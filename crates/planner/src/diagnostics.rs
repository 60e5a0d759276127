use serde::{Deserialize, Serialize};

/// One partition-bytes histogram bucket for planner diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionBytesHistogramBucket {
    /// Inclusive upper bound in bytes for the bucket.
    pub upper_bound_bytes: u64,
    /// Number of pre-shuffle partitions in this bucket.
    pub partition_count: u32,
}

/// Diagnostics retained after one estimation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanDiagnostics {
    /// Event messages describing major planner decisions.
    pub events: Vec<String>,
    /// Histogram of observed combined bytes by pre-shuffle partition.
    pub partition_bytes_histogram: Vec<PartitionBytesHistogramBucket>,
}

/// Build a stable bytes histogram over combined per-partition byte counts.
pub fn build_partition_bytes_histogram(
    bytes_by_partition: &[u64],
) -> Vec<PartitionBytesHistogramBucket> {
    const BOUNDS: &[u64] = &[
        64 * 1024,
        256 * 1024,
        1024 * 1024,
        4 * 1024 * 1024,
        16 * 1024 * 1024,
        64 * 1024 * 1024,
        u64::MAX,
    ];
    let mut counts = vec![0_u32; BOUNDS.len()];
    for bytes in bytes_by_partition {
        let idx = BOUNDS
            .iter()
            .position(|b| bytes <= b)
            .unwrap_or(BOUNDS.len() - 1);
        counts[idx] = counts[idx].saturating_add(1);
    }
    BOUNDS
        .iter()
        .zip(counts)
        .filter(|(_, c)| *c > 0)
        .map(|(upper, partition_count)| PartitionBytesHistogramBucket {
            upper_bound_bytes: *upper,
            partition_count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_drop_empty_bounds() {
        let histogram = build_partition_bytes_histogram(&[1024, 2048, 100 * 1024 * 1024]);
        assert_eq!(histogram.len(), 2);
        assert_eq!(histogram[0].upper_bound_bytes, 64 * 1024);
        assert_eq!(histogram[0].partition_count, 2);
        assert_eq!(histogram[1].upper_bound_bytes, u64::MAX);
        assert_eq!(histogram[1].partition_count, 1);
    }

    #[test]
    fn empty_input_yields_empty_histogram() {
        assert!(build_partition_bytes_histogram(&[]).is_empty());
    }
}
