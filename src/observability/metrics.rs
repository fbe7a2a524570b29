//! Metrics collection and exposition.
//!
//! # Metrics
//! - `version_router_resolutions_total` (counter): resolutions by outcome
//!   (`constraint`, `default`, `unresolved`)

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`. Failure is logged, not fatal.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Count one resolution.
pub fn record_resolution(outcome: &'static str) {
    ::metrics::counter!("version_router_resolutions_total", "outcome" => outcome).increment(1);
}
