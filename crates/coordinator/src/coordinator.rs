//! Exchange coordinator state machine and estimation logic.
//!
//! Responsibilities:
//! - accept exchange registrations until the first plan lookup;
//! - run exactly one estimation pass: materialize dependencies, submit map
//!   stages, await statistics, decide broadcast vs coalesce;
//! - memoize one post-shuffle plan per registered exchange;
//! - replay the first estimation failure on every later lookup.
//!
//! Lifecycle: `Open` (accepting registrations) -> `Estimating` (one caller
//! holds the mutex across the map-stage awaits) -> `Planned` (plans frozen).

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use aex_common::metrics::global_metrics;
use aex_common::{AexError, CoordinatorConfig, ExchangeId, QueryId, Result};
use aex_planner::{
    build_partition_bytes_histogram, coalesce, combined_bytes_per_partition, decide_broadcast,
    emit_broadcast_plans, MapOutputStatistics, PlanDiagnostics, PostShufflePlan,
};
use aex_shuffle::ShuffleDependency;

use crate::exchange::{Exchange, MapStageScheduler};

struct Registration {
    id: ExchangeId,
    exchange: Arc<dyn Exchange>,
}

#[derive(Default)]
struct CoordinatorState {
    exchanges: Vec<Registration>,
    plans: HashMap<ExchangeId, PostShufflePlan>,
    diagnostics: Option<PlanDiagnostics>,
    estimated: bool,
    poisoned: Option<AexError>,
}

/// Stateful orchestrator shared by the sibling exchanges of one downstream
/// operator.
///
/// Registrations accumulate until the first `plan_for` call on any exchange;
/// that call runs estimation end-to-end while holding the coordinator mutex,
/// which deliberately serializes duplicate estimation attempts. Later calls
/// observe the memoized plans (or the replayed first failure).
pub struct ExchangeCoordinator {
    query: QueryId,
    config: CoordinatorConfig,
    scheduler: Arc<dyn MapStageScheduler>,
    state: Mutex<CoordinatorState>,
}

impl ExchangeCoordinator {
    /// Create a coordinator expecting `config.num_exchanges` registrations.
    pub fn new(
        query: QueryId,
        config: CoordinatorConfig,
        scheduler: Arc<dyn MapStageScheduler>,
    ) -> Self {
        Self {
            query,
            config,
            scheduler,
            state: Mutex::new(CoordinatorState::default()),
        }
    }

    /// Register one exchange. Valid only before the first `plan_for` call.
    pub async fn register(&self, exchange: Arc<dyn Exchange>) -> Result<()> {
        let mut state = self.state.lock().await;
        let id = exchange.id();
        if state.estimated || state.poisoned.is_some() {
            return Err(AexError::InvariantViolation(format!(
                "exchange {id} registered after estimation"
            )));
        }
        if state.exchanges.iter().any(|r| r.id == id) {
            return Err(AexError::InvariantViolation(format!(
                "exchange {id} registered twice"
            )));
        }
        debug!(
            query_id = %self.query,
            exchange_id = %id,
            operator = "ExchangeCoordinatorRegister",
            "exchange registered"
        );
        state.exchanges.push(Registration { id, exchange });
        Ok(())
    }

    /// Return the post-shuffle plan for one registered exchange.
    ///
    /// The first caller across all sibling exchanges pays the estimation
    /// cost; later callers observe the memoized result. A failed estimation
    /// poisons the coordinator and is replayed verbatim.
    pub async fn plan_for(&self, exchange: ExchangeId) -> Result<PostShufflePlan> {
        let mut state = self.state.lock().await;
        if let Some(err) = &state.poisoned {
            return Err(replay_error(err));
        }
        if !state.estimated {
            if let Err(err) = self.estimate(&mut state).await {
                warn!(
                    query_id = %self.query,
                    error = %err,
                    operator = "ExchangeCoordinatorEstimate",
                    "estimation failed; coordinator poisoned"
                );
                let replayed = replay_error(&err);
                state.poisoned = Some(err);
                return Err(replayed);
            }
            state.estimated = true;
        }
        state
            .plans
            .get(&exchange)
            .cloned()
            .ok_or(AexError::UnregisteredExchange(exchange))
    }

    /// Diagnostics of the finished estimation pass, if one ran successfully.
    pub async fn diagnostics(&self) -> Option<PlanDiagnostics> {
        self.state.lock().await.diagnostics.clone()
    }

    async fn estimate(&self, state: &mut CoordinatorState) -> Result<()> {
        let expected = self.config.num_exchanges;
        let actual = state.exchanges.len() as u32;
        if actual != expected {
            return Err(AexError::UnexpectedRegistrationCount { expected, actual });
        }

        let deps: Vec<ShuffleDependency> = state
            .exchanges
            .iter()
            .map(|r| r.exchange.prepare_shuffle_dependency())
            .collect();

        // Submit all non-empty upstream stages before awaiting any of them;
        // statistics are collected in submission (= registration) order.
        let mut futures = Vec::new();
        for dep in &deps {
            if dep.upstream_partition_count == 0 {
                debug!(
                    query_id = %self.query,
                    stage_id = %dep.handle.stage,
                    operator = "ExchangeCoordinatorEstimate",
                    "skipping map stage with empty upstream"
                );
                continue;
            }
            futures.push(self.scheduler.submit_map_stage(dep));
        }
        let results = join_all(futures).await;
        let mut stats = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(s) => stats.push(s),
                Err(err) => return Err(AexError::UpstreamStageFailed(err.to_string())),
            }
        }

        if let Some(first) = stats.first() {
            let num_pre = first.num_pre_shuffle_partitions();
            if stats
                .iter()
                .any(|s| s.num_pre_shuffle_partitions() != num_pre)
            {
                let counts: Vec<usize> = stats
                    .iter()
                    .map(MapOutputStatistics::num_pre_shuffle_partitions)
                    .collect();
                return Err(AexError::InvariantViolation(format!(
                    "inconsistent pre-shuffle partition counts across map stages: {counts:?}"
                )));
            }
        }

        let query_label = self.query.to_string();
        for s in &stats {
            global_metrics().record_map_output_bytes(&query_label, s.stage.0, s.total_bytes());
        }

        let mut events = Vec::new();
        let outcome = self.decide_plans(state, &deps, &stats, &mut events);
        global_metrics().inc_planner_estimation(&query_label, outcome);
        for r in &state.exchanges {
            if let Some(plan) = state.plans.get(&r.id) {
                global_metrics().set_post_shuffle_partitions(
                    &query_label,
                    r.id.0,
                    plan.len() as u64,
                );
            }
        }

        let combined = combined_bytes_per_partition(&stats);
        state.diagnostics = Some(PlanDiagnostics {
            events,
            partition_bytes_histogram: build_partition_bytes_histogram(&combined),
        });
        info!(
            query_id = %self.query,
            exchanges = state.exchanges.len(),
            outcome,
            operator = "ExchangeCoordinatorEstimate",
            "post-shuffle plans recorded"
        );
        Ok(())
    }

    /// Pick the plan shape and fill `state.plans`. Returns the outcome label.
    fn decide_plans(
        &self,
        state: &mut CoordinatorState,
        deps: &[ShuffleDependency],
        stats: &[MapOutputStatistics],
        events: &mut Vec<String>,
    ) -> &'static str {
        if stats.is_empty() {
            // All upstream stages were skipped; nothing to coalesce.
            for (r, dep) in state.exchanges.iter().zip(deps) {
                let plan = PostShufflePlan::trivial(dep.num_pre_shuffle_partitions);
                state.plans.insert(r.id, plan);
            }
            events.push("trivial all upstream stages empty".to_string());
            return "trivial";
        }

        let num_pre = stats[0].num_pre_shuffle_partitions() as u32;

        if state.exchanges.len() == 2 {
            if let Some(decision) =
                decide_broadcast(stats, self.config.two_input_join, &self.config.broadcast)
            {
                let fanout = deps[decision.large_side].upstream_partition_count;
                let (small_plan, large_plan) = emit_broadcast_plans(num_pre, fanout);
                info!(
                    query_id = %self.query,
                    broadcast_side = decision.broadcast_side,
                    broadcast_bytes = stats[decision.broadcast_side].total_bytes(),
                    threshold_bytes = self.config.broadcast.threshold_bytes,
                    fanout,
                    operator = "ExchangeCoordinatorEstimate",
                    "broadcasting small join side"
                );
                events.push(format!(
                    "broadcast side={} bytes={} threshold={} fanout={}",
                    decision.broadcast_side,
                    stats[decision.broadcast_side].total_bytes(),
                    self.config.broadcast.threshold_bytes,
                    fanout
                ));
                state
                    .plans
                    .insert(state.exchanges[decision.broadcast_side].id, small_plan);
                state
                    .plans
                    .insert(state.exchanges[decision.large_side].id, large_plan);
                return "broadcast";
            }
        }

        let start_indices = coalesce(stats, self.config.target_bytes, self.config.min_partitions);
        let plan = PostShufflePlan::coalesced(num_pre, &start_indices);
        events.push(format!(
            "coalesce pre={} post={} target_bytes={}",
            num_pre,
            start_indices.len(),
            self.config.target_bytes
        ));
        for r in &state.exchanges {
            state.plans.insert(r.id, plan.clone());
        }
        "coalesce"
    }
}

/// Rebuild an equivalent error from the stored poison.
fn replay_error(err: &AexError) -> AexError {
    match err {
        AexError::UnregisteredExchange(id) => AexError::UnregisteredExchange(*id),
        AexError::InvariantViolation(msg) => AexError::InvariantViolation(msg.clone()),
        AexError::UpstreamStageFailed(msg) => AexError::UpstreamStageFailed(msg.clone()),
        AexError::UnexpectedRegistrationCount { expected, actual } => {
            AexError::UnexpectedRegistrationCount {
                expected: *expected,
                actual: *actual,
            }
        }
        AexError::InvalidConfig(msg) => AexError::InvalidConfig(msg.clone()),
        other => AexError::InvariantViolation(other.to_string()),
    }
}
