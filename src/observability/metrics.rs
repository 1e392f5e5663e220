//! Metrics collection and exposition.
//!
//! # Metrics
//! - `broker_requests_total` (counter): inbound requests by method, status, resource
//! - `broker_request_duration_seconds` (histogram): inbound latency
//! - `broker_attempts_total` (counter): per-attempt records by resource,
//!   provider, origin (client_request | healthcheck), success
//! - `broker_attempt_duration_seconds` (histogram): per-attempt latency
//!
//! # Design Decisions
//! - The attempt counter is the append-only metrics-sink record: every
//!   dispatch attempt and every health probe lands here
//! - Exposition is Prometheus scrape on a dedicated address

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Which write path produced an attempt record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    ClientRequest,
    Healthcheck,
}

impl Origin {
    pub fn as_str(self) -> &'static str {
        match self {
            Origin::ClientRequest => "client_request",
            Origin::Healthcheck => "healthcheck",
        }
    }
}

/// Install the Prometheus exporter on the given address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one inbound client request.
pub fn record_request(method: &str, status: u16, resource: &str, start: Instant) {
    counter!(
        "broker_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "resource" => resource.to_string()
    )
    .increment(1);
    histogram!(
        "broker_request_duration_seconds",
        "resource" => resource.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record one attempt against a provider: a dispatch attempt
/// (origin=client_request) or a health probe (origin=healthcheck).
pub fn record_attempt(
    resource: &str,
    provider: &str,
    success: bool,
    latency: Duration,
    origin: Origin,
) {
    counter!(
        "broker_attempts_total",
        "resource" => resource.to_string(),
        "provider" => provider.to_string(),
        "origin" => origin.as_str(),
        "success" => if success { "true" } else { "false" }
    )
    .increment(1);
    histogram!(
        "broker_attempt_duration_seconds",
        "provider" => provider.to_string(),
        "origin" => origin.as_str()
    )
    .record(latency.as_secs_f64());
}
