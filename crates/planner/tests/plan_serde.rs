use aex_planner::{coalesce, MapOutputStatistics, PostShufflePlan};

use aex_common::StageId;

#[test]
fn post_shuffle_plan_is_serializable() {
    let stats = vec![
        MapOutputStatistics::new(StageId(1), vec![110, 10, 100, 110, 0]),
        MapOutputStatistics::new(StageId(2), vec![0, 0, 0, 0, 0]),
    ];
    let start_indices = coalesce(&stats, 100, None);
    let plan = PostShufflePlan::coalesced(5, &start_indices);

    let s = serde_json::to_string(&plan).unwrap();
    let back: PostShufflePlan = serde_json::from_str(&s).unwrap();
    assert_eq!(back, plan);
}

#[test]
fn broadcast_plan_round_trips_restrictions() {
    let plan = PostShufflePlan::map_task_preserving(3, 4);
    let s = serde_json::to_string(&plan).unwrap();
    let back: PostShufflePlan = serde_json::from_str(&s).unwrap();
    assert_eq!(back, plan);
    assert!(back.iter().all(|p| p.map_task_restriction.is_some()));
}
