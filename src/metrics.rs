//! Prometheus middleware: per-endpoint request counts and latencies on `/metrics`.

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};

/// Build the middleware once and clone it into every worker. Aborted
/// actions show up under their error status codes.
pub fn build() -> anyhow::Result<PrometheusMetrics> {
    PrometheusMetricsBuilder::new("skirmish")
        .endpoint("/metrics") // exposed URL
        .build()
        .map_err(|e| anyhow::anyhow!("metrics builder: {e}"))
}
