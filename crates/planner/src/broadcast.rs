//! Broadcast-side selection for two-input joins.
//!
//! When one side of a two-input join is small enough, the planner replaces
//! coalescing with a full-fanout pair of plans: every reducer reads the whole
//! small side while the large side keeps its map-level physical partitioning
//! via map-task restrictions.

use aex_common::BroadcastConfig;

use crate::plan::PostShufflePlan;
use crate::stats::MapOutputStatistics;

/// Which registration side broadcasts and which stays partition-preserving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastDecision {
    /// Side whose full contents every reducer fetches.
    pub broadcast_side: usize,
    /// Side that keeps its map-level partitioning.
    pub large_side: usize,
}

/// Pick a broadcast side, if the optimization applies.
///
/// Requires a two-input join, the optimization enabled, and exactly two
/// statistics. Side sums are compared against the threshold in scan order,
/// so side 0 wins when both fit.
pub fn decide_broadcast(
    stats: &[MapOutputStatistics],
    two_input_join: bool,
    cfg: &BroadcastConfig,
) -> Option<BroadcastDecision> {
    if !two_input_join || !cfg.enabled || stats.len() != 2 {
        return None;
    }
    if stats[0].total_bytes() < cfg.threshold_bytes {
        Some(BroadcastDecision {
            broadcast_side: 0,
            large_side: 1,
        })
    } else if stats[1].total_bytes() < cfg.threshold_bytes {
        Some(BroadcastDecision {
            broadcast_side: 1,
            large_side: 0,
        })
    } else {
        None
    }
}

/// Emit the broadcast plan pair `(small_side_plan, large_side_plan)`.
///
/// Both plans have `large_upstream_partition_count` entries: the small side
/// fans out the entire `[0, P)` range to every reducer, the large side pins
/// reducer `i` to map task `i`'s output.
pub fn emit_broadcast_plans(
    num_pre_shuffle_partitions: u32,
    large_upstream_partition_count: u32,
) -> (PostShufflePlan, PostShufflePlan) {
    (
        PostShufflePlan::broadcast_fanout(
            num_pre_shuffle_partitions,
            large_upstream_partition_count,
        ),
        PostShufflePlan::map_task_preserving(
            num_pre_shuffle_partitions,
            large_upstream_partition_count,
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use aex_common::StageId;

    fn two_sided(s0: &[u64], s1: &[u64]) -> Vec<MapOutputStatistics> {
        vec![
            MapOutputStatistics::new(StageId(0), s0.to_vec()),
            MapOutputStatistics::new(StageId(1), s1.to_vec()),
        ]
    }

    fn cfg(threshold_bytes: u64) -> BroadcastConfig {
        BroadcastConfig {
            enabled: true,
            threshold_bytes,
        }
    }

    #[test]
    fn small_left_side_broadcasts() {
        let stats = two_sided(&[20, 30], &[100, 100]);
        let decision = decide_broadcast(&stats, true, &cfg(100)).expect("applies");
        assert_eq!(decision.broadcast_side, 0);
        assert_eq!(decision.large_side, 1);
    }

    #[test]
    fn small_right_side_broadcasts() {
        let stats = two_sided(&[100, 100], &[20, 30]);
        let decision = decide_broadcast(&stats, true, &cfg(100)).expect("applies");
        assert_eq!(decision.broadcast_side, 1);
        assert_eq!(decision.large_side, 0);
    }

    #[test]
    fn side_zero_wins_ties() {
        let stats = two_sided(&[10], &[10]);
        let decision = decide_broadcast(&stats, true, &cfg(100)).expect("applies");
        assert_eq!(decision.broadcast_side, 0);
    }

    #[test]
    fn both_sides_too_large_falls_through() {
        let stats = two_sided(&[200], &[200]);
        assert_eq!(decide_broadcast(&stats, true, &cfg(100)), None);
    }

    #[test]
    fn requires_join_flag_toggle_and_two_sides() {
        let stats = two_sided(&[10], &[200]);
        assert_eq!(decide_broadcast(&stats, false, &cfg(100)), None);
        let disabled = BroadcastConfig {
            enabled: false,
            threshold_bytes: 100,
        };
        assert_eq!(decide_broadcast(&stats, true, &disabled), None);
        let one_sided = vec![MapOutputStatistics::new(StageId(0), vec![10])];
        assert_eq!(decide_broadcast(&one_sided, true, &cfg(100)), None);
    }

    #[test]
    fn emitted_plans_have_matching_length() {
        let (small, large) = emit_broadcast_plans(5, 4);
        assert_eq!(small.len(), 4);
        assert_eq!(large.len(), 4);
        assert!(small.iter().all(|p| p.map_task_restriction.is_none()));
        let restrictions: Vec<u32> = large
            .iter()
            .filter_map(|p| p.map_task_restriction)
            .collect();
        assert_eq!(restrictions, vec![0, 1, 2, 3]);
    }
}
