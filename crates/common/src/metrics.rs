use std::sync::{Arc, OnceLock};

use prometheus::{CounterVec, Encoder, GaugeVec, Opts, Registry, TextEncoder};

/// Process-wide planner metrics backed by a prometheus registry.
#[derive(Clone, Debug)]
pub struct MetricsRegistry {
    inner: Arc<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    registry: Registry,
    planner_estimations: CounterVec,
    planner_map_output_bytes: CounterVec,
    planner_post_shuffle_partitions: GaugeVec,
}

impl MetricsRegistry {
    /// Create a registry with all metric families registered.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::new()),
        }
    }

    /// Count one finished estimation pass by outcome (`coalesce`, `broadcast`, `trivial`).
    pub fn inc_planner_estimation(&self, query_id: &str, outcome: &str) {
        self.inner
            .planner_estimations
            .with_label_values(&[query_id, outcome])
            .inc();
    }

    /// Record map-output bytes observed for one upstream stage during estimation.
    pub fn record_map_output_bytes(&self, query_id: &str, stage_id: u64, bytes: u64) {
        self.inner
            .planner_map_output_bytes
            .with_label_values(&[query_id, &stage_id.to_string()])
            .inc_by(bytes as f64);
    }

    /// Publish the planned post-shuffle partition count for one exchange.
    pub fn set_post_shuffle_partitions(&self, query_id: &str, exchange_id: u64, partitions: u64) {
        self.inner
            .planner_post_shuffle_partitions
            .with_label_values(&[query_id, &exchange_id.to_string()])
            .set(partitions as f64);
    }

    /// Render all registered metric families in Prometheus text format.
    pub fn render_prometheus(&self) -> String {
        let metric_families = self.inner.registry.gather();
        let mut out = Vec::new();
        let enc = TextEncoder::new();
        if enc.encode(&metric_families, &mut out).is_err() {
            return String::new();
        }
        String::from_utf8_lossy(&out).to_string()
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsInner {
    fn new() -> Self {
        let registry = Registry::new();

        let planner_estimations = counter_vec(
            &registry,
            "aex_planner_estimations_total",
            "Finished estimation passes by outcome",
            &["query_id", "outcome"],
        );
        let planner_map_output_bytes = counter_vec(
            &registry,
            "aex_planner_map_output_bytes_total",
            "Map-output bytes observed during estimation",
            &["query_id", "stage_id"],
        );
        let planner_post_shuffle_partitions = gauge_vec(
            &registry,
            "aex_planner_post_shuffle_partitions",
            "Planned post-shuffle partition count per exchange",
            &["query_id", "exchange_id"],
        );

        Self {
            registry,
            planner_estimations,
            planner_map_output_bytes,
            planner_post_shuffle_partitions,
        }
    }
}

fn counter_vec(registry: &Registry, name: &str, help: &str, labels: &[&str]) -> CounterVec {
    let c = CounterVec::new(Opts::new(name, help), labels).expect("counter vec");
    registry
        .register(Box::new(c.clone()))
        .expect("register counter");
    c
}

fn gauge_vec(registry: &Registry, name: &str, help: &str, labels: &[&str]) -> GaugeVec {
    let g = GaugeVec::new(Opts::new(name, help), labels).expect("gauge vec");
    registry
        .register(Box::new(g.clone()))
        .expect("register gauge");
    g
}

static GLOBAL_METRICS: OnceLock<MetricsRegistry> = OnceLock::new();

/// Process-global metrics registry, initialized on first use.
pub fn global_metrics() -> &'static MetricsRegistry {
    GLOBAL_METRICS.get_or_init(MetricsRegistry::new)
}

#[cfg(test)]
mod tests {
    use super::MetricsRegistry;

    #[test]
    fn renders_prometheus_text() {
        let m = MetricsRegistry::new();
        m.inc_planner_estimation("q1", "coalesce");
        let text = m.render_prometheus();
        assert!(text.contains("aex_planner_estimations_total"));
        assert!(text.contains("coalesce"));
    }

    #[test]
    fn renders_all_metric_families() {
        let m = MetricsRegistry::new();
        m.inc_planner_estimation("q1", "broadcast");
        m.record_map_output_bytes("q1", 3, 4096);
        m.set_post_shuffle_partitions("q1", 0, 12);
        let text = m.render_prometheus();

        assert!(text.contains("aex_planner_estimations_total"));
        assert!(text.contains("aex_planner_map_output_bytes_total"));
        assert!(text.contains("aex_planner_post_shuffle_partitions"));
    }
}
