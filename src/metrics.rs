use axum::{routing::get, Router};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

/// Source parses are sub-second; default buckets would lump everything
/// into the first bucket.
const PARSE_MS_BUCKETS: &[f64] = &[0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0];

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Initialize the Prometheus recorder; call once, before the first run,
    /// so the pipeline counters land in the exposition output.
    pub fn init() -> Self {
        let handle = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full("source_parse_ms".to_string()),
                PARSE_MS_BUCKETS,
            )
            .expect("prometheus: parse-time buckets")
            .install_recorder()
            .expect("prometheus: install recorder");

        crate::sources::ensure_metrics_described();

        Self { handle }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
