//! Active health probing.
//!
//! # Responsibilities
//! - One independent periodic task per configured provider
//! - Probe the provider's healthcheck route via the shared forwarder
//! - Write outcomes into the health registry and emit probe metrics
//!
//! # Design Decisions
//! - The first probe fires immediately at startup, not after one interval
//! - Probes run for the process lifetime; only the shutdown broadcast
//!   ends them, never client traffic
//! - Probes use the same forwarder (and timeout) as dispatch attempts

use axum::body::Body;
use axum::http::Request;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time;

use crate::config::ProviderConfig;
use crate::dispatch::forwarder::Forwarder;
use crate::health::registry::HealthRegistry;
use crate::observability::metrics::{self, Origin};

pub struct HealthMonitor {
    provider: Arc<ProviderConfig>,
    registry: Arc<HealthRegistry>,
    forwarder: Forwarder,
}

impl HealthMonitor {
    pub fn new(
        provider: Arc<ProviderConfig>,
        registry: Arc<HealthRegistry>,
        forwarder: Forwarder,
    ) -> Self {
        Self {
            provider,
            registry,
            forwarder,
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            provider = %self.provider.name,
            interval_secs = self.provider.healthcheck.interval_secs,
            path = %self.provider.healthcheck.path,
            "Health monitor starting"
        );

        let interval = Duration::from_secs(self.provider.healthcheck.interval_secs);
        // interval's first tick completes immediately, giving the
        // check-at-start behavior.
        let mut ticker = time::interval(interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check().await;
                }
                _ = shutdown.recv() => {
                    tracing::debug!(provider = %self.provider.name, "Health monitor shutting down");
                    break;
                }
            }
        }
    }

    async fn check(&self) {
        let uri_string = format!(
            "{}{}",
            self.provider.base_url.trim_end_matches('/'),
            self.provider.healthcheck.path
        );

        let request = match Request::builder()
            .method("GET")
            .uri(uri_string)
            .header("user-agent", "api-broker-healthcheck")
            .body(Body::empty())
        {
            Ok(request) => request,
            Err(e) => {
                tracing::error!(provider = %self.provider.name, error = %e, "Failed to build health check request");
                return;
            }
        };

        let (result, elapsed) = self.forwarder.send(request).await;

        let success = match &result {
            Ok(response) => {
                let success = response.status.is_success();
                if !success {
                    tracing::warn!(
                        provider = %self.provider.name,
                        status = %response.status,
                        "Health check failed: non-success status"
                    );
                }
                success
            }
            Err(failure) => {
                tracing::warn!(
                    provider = %self.provider.name,
                    error = %failure,
                    "Health check failed"
                );
                false
            }
        };

        self.registry.record(&self.provider.name, success, elapsed);
        metrics::record_attempt("none", &self.provider.name, success, elapsed, Origin::Healthcheck);
    }
}
