//! Greedy coalescing of contiguous pre-shuffle partitions.
//!
//! This module is runtime-agnostic and deterministic: the same observed byte
//! statistics always produce the same start indices, so sibling exchanges
//! planned from one statistics snapshot agree on partition boundaries.

use crate::stats::{combined_bytes_per_partition, MapOutputStatistics};

/// Floor applied to the min-partitions byte cap so an all-zero total does not
/// force every pre-partition into its own post-partition.
const MIN_EFFECTIVE_TARGET_BYTES: u64 = 16;

/// Compute post-shuffle start indices from per-partition byte statistics.
///
/// Walks pre-shuffle partitions left to right, accumulating the cross-input
/// byte sum, and opens a new post-shuffle partition whenever the accumulator
/// reaches the effective target. The returned indices are strictly increasing,
/// begin with 0, and stay below the pre-shuffle partition count; the final
/// range is implicit.
///
/// All elements of `stats` must carry the same pre-shuffle partition count
/// (at least 1); the caller validates that. `stats` must be non-empty.
pub fn coalesce(
    stats: &[MapOutputStatistics],
    target_bytes: u64,
    min_partitions: Option<u32>,
) -> Vec<u32> {
    debug_assert!(!stats.is_empty(), "coalesce requires statistics");
    let num_pre = stats[0].num_pre_shuffle_partitions();
    debug_assert!(
        stats
            .iter()
            .all(|s| s.num_pre_shuffle_partitions() == num_pre),
        "inconsistent pre-shuffle partition counts"
    );

    let effective = effective_target_bytes(stats, target_bytes, min_partitions).max(1);
    let combined = combined_bytes_per_partition(stats);

    let mut start_indices = vec![0_u32];
    let mut acc = 0_u64;
    for (p, bytes) in combined.iter().enumerate() {
        acc = acc.saturating_add(*bytes);
        if acc >= effective && p + 1 < num_pre {
            start_indices.push((p + 1) as u32);
            acc = 0;
        }
    }
    start_indices
}

/// Derive the byte budget one post-shuffle partition should hold.
///
/// `min_partitions` is an upward pressure on count: it may shrink the target
/// to produce more, smaller partitions, but never makes post-partitions
/// larger than the advisory target.
pub fn effective_target_bytes(
    stats: &[MapOutputStatistics],
    target_bytes: u64,
    min_partitions: Option<u32>,
) -> u64 {
    let Some(min) = min_partitions.filter(|m| *m > 0) else {
        return target_bytes;
    };
    let total = stats
        .iter()
        .fold(0_u64, |acc, s| acc.saturating_add(s.total_bytes()));
    let cap_by_min = total
        .div_ceil(u64::from(min))
        .max(MIN_EFFECTIVE_TARGET_BYTES);
    cap_by_min.min(target_bytes)
}
