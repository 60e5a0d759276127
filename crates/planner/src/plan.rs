//! Post-shuffle partition plan model.
//!
//! A plan describes, for one exchange, which pre-shuffle partitions each
//! reduce-side task should pull. Plans come in two shapes:
//! - coalesce mode: ranges tile `[0, P)` contiguously with no overlap;
//! - broadcast mode: every range equals `[0, P)` and distinct map-task
//!   restrictions cover `[0, M)` exactly.

use serde::{Deserialize, Serialize};

/// One post-shuffle partition: a contiguous pre-shuffle range and an optional
/// map-task restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostShufflePartition {
    /// Position of this partition in the plan.
    pub post_index: u32,
    /// First pre-shuffle partition id consumed (inclusive).
    pub pre_start: u32,
    /// One past the last pre-shuffle partition id consumed (exclusive).
    pub pre_end: u32,
    /// When set, reads are limited to this single map task's output for the
    /// entire `[pre_start, pre_end)` range.
    pub map_task_restriction: Option<u32>,
}

/// Ordered post-shuffle partition plan for one exchange.
///
/// `post_index` always equals array position. Cheap to clone and share by
/// value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostShufflePlan {
    /// Partitions in post-index order.
    pub partitions: Vec<PostShufflePartition>,
}

impl PostShufflePlan {
    /// Expand coalescer start indices into a contiguous-cover plan.
    ///
    /// `start_indices` must be strictly increasing, begin with 0, and stay
    /// below `num_pre_shuffle_partitions`.
    pub fn coalesced(num_pre_shuffle_partitions: u32, start_indices: &[u32]) -> Self {
        let partitions = start_indices
            .iter()
            .enumerate()
            .map(|(i, start)| {
                let end = start_indices
                    .get(i + 1)
                    .copied()
                    .unwrap_or(num_pre_shuffle_partitions);
                PostShufflePartition {
                    post_index: i as u32,
                    pre_start: *start,
                    pre_end: end,
                    map_task_restriction: None,
                }
            })
            .collect();
        Self { partitions }
    }

    /// Single post-shuffle partition covering all pre-shuffle partitions.
    pub fn trivial(num_pre_shuffle_partitions: u32) -> Self {
        Self::coalesced(num_pre_shuffle_partitions, &[0])
    }

    /// Broadcast-mode plan for the small join side: `fanout` readers each
    /// fetch the entire pre-shuffle range.
    pub fn broadcast_fanout(num_pre_shuffle_partitions: u32, fanout: u32) -> Self {
        let partitions = (0..fanout)
            .map(|i| PostShufflePartition {
                post_index: i,
                pre_start: 0,
                pre_end: num_pre_shuffle_partitions,
                map_task_restriction: None,
            })
            .collect();
        Self { partitions }
    }

    /// Broadcast-mode plan for the large join side: reader `i` fetches only
    /// map task `i`'s output slice across the whole pre-shuffle range.
    pub fn map_task_preserving(num_pre_shuffle_partitions: u32, fanout: u32) -> Self {
        let partitions = (0..fanout)
            .map(|i| PostShufflePartition {
                post_index: i,
                pre_start: 0,
                pre_end: num_pre_shuffle_partitions,
                map_task_restriction: Some(i),
            })
            .collect();
        Self { partitions }
    }

    /// Number of post-shuffle partitions.
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    /// Whether the plan has no partitions.
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    /// Iterate partitions in post-index order.
    pub fn iter(&self) -> impl Iterator<Item = &PostShufflePartition> {
        self.partitions.iter()
    }

    /// One-line human-readable summary for logs.
    pub fn describe(&self) -> String {
        let restricted = self
            .partitions
            .iter()
            .filter(|p| p.map_task_restriction.is_some())
            .count();
        if restricted > 0 {
            format!(
                "{} post-shuffle partitions ({} map-task restricted)",
                self.partitions.len(),
                restricted
            )
        } else {
            format!("{} post-shuffle partitions", self.partitions.len())
        }
    }
}
