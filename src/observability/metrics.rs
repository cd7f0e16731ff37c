//! Metrics collection and exposition.
//!
//! # Metrics
//! - `forwarded_remote_addr_total` (counter): remote address decisions by
//!   `outcome` (`overwritten`, `skipped`, `cleared`)
//! - `forwarded_requests_total` (counter): echo requests by `source`
//!   (`forwarded` when a `for` value was found, `peer` otherwise)
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Exporter is optional; enabled through `observability.metrics_enabled`

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter, serving scrapes on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

pub fn record_remote_addr(outcome: &'static str) {
    metrics::counter!("forwarded_remote_addr_total", "outcome" => outcome).increment(1);
}

pub fn record_echo(source: &'static str) {
    metrics::counter!("forwarded_requests_total", "source" => source).increment(1);
}
