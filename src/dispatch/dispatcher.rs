//! The dispatch loop.
//!
//! # Responsibilities
//! - Drive ranked candidates through forward + validate, one at a time
//! - Record every attempt to the metrics sink and the health registry
//! - Produce the final outbound response or a terminal error
//!
//! # Design Decisions
//! - Candidates are attempted strictly sequentially in rank order,
//!   never speculatively
//! - Transport failure and validation failure both advance to the next
//!   candidate; only exhaustion ends the loop without a winner
//! - A dropped inbound connection drops this future, aborting the
//!   in-flight forward and the remaining candidates; health monitors
//!   are unaffected
//! - Exhaustion suppresses every provider body seen along the way

use axum::body::Body;
use axum::http::Response;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{ProviderConfig, ResourceConfig};
use crate::dispatch::forwarder::Forwarder;
use crate::dispatch::{ranker, validator};
use crate::health::registry::HealthRegistry;
use crate::http::request::RequestContext;
use crate::mapping::{self, NormalizedResponse};
use crate::observability::events::{DispatchEvent, DispatchNotifier};
use crate::observability::metrics::{self, Origin};

/// Terminal dispatch failures. Per-attempt failures never surface here;
/// they are recovered inside the loop.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no resource matches the request path")]
    ResourceNotFound,

    #[error("resource references provider `{0}` with no configuration")]
    ProviderConfigInvalid(String),

    #[error("no providers available for this resource")]
    NoProvidersAvailable,

    #[error("all candidate providers exhausted without an accepted response")]
    Exhausted,
}

/// Drives one inbound request across a resource's ranked providers.
pub struct Dispatcher {
    providers: HashMap<String, Arc<ProviderConfig>>,
    registry: Arc<HealthRegistry>,
    forwarder: Forwarder,
    notifier: DispatchNotifier,
}

impl Dispatcher {
    pub fn new(
        providers: &[ProviderConfig],
        registry: Arc<HealthRegistry>,
        forwarder: Forwarder,
        notifier: DispatchNotifier,
    ) -> Self {
        let providers = providers
            .iter()
            .map(|provider| (provider.name.clone(), Arc::new(provider.clone())))
            .collect();
        Self {
            providers,
            registry,
            forwarder,
            notifier,
        }
    }

    /// Run the failover loop for one request.
    pub async fn dispatch(
        &self,
        resource: &ResourceConfig,
        ctx: &RequestContext,
    ) -> Result<Response<Body>, DispatchError> {
        let snapshot = self.registry.snapshot();
        let candidates = ranker::rank(resource, &self.providers, &snapshot);
        if candidates.is_empty() {
            return Err(DispatchError::NoProvidersAvailable);
        }

        tracing::debug!(
            request_id = %ctx.request_id,
            resource = %resource.name,
            candidates = ?candidates,
            "Dispatching"
        );

        for name in &candidates {
            let provider = self
                .providers
                .get(name)
                .ok_or_else(|| DispatchError::ProviderConfigInvalid(name.clone()))?;

            let outbound = match mapping::map_request(resource, provider, ctx) {
                Ok(request) => request,
                Err(e) => {
                    tracing::error!(
                        request_id = %ctx.request_id,
                        provider = %name,
                        error = %e,
                        "Failed to build outbound request"
                    );
                    continue;
                }
            };

            let (result, elapsed) = self.forwarder.send(outbound).await;

            // An attempt counts toward provider health exactly like a
            // probe: a response was received with a success status.
            let success = matches!(&result, Ok(response) if response.status.is_success());
            self.registry.record(name, success, elapsed);
            metrics::record_attempt(&resource.name, name, success, elapsed, Origin::ClientRequest);

            self.notifier.publish(DispatchEvent {
                resource: resource.name.clone(),
                candidates: candidates.clone(),
                selected: name.clone(),
            });

            let response = match result {
                Ok(response) => response,
                Err(failure) => {
                    tracing::warn!(
                        request_id = %ctx.request_id,
                        provider = %name,
                        error = %failure,
                        "Attempt failed, trying next candidate"
                    );
                    continue;
                }
            };

            let normalized = mapping::map_response(resource, response);
            let verdict = validator::validate(&normalized, &resource.accept);
            if verdict.passed {
                tracing::debug!(
                    request_id = %ctx.request_id,
                    provider = %name,
                    latency_ms = elapsed.as_millis() as u64,
                    "Response accepted"
                );
                return Ok(into_response(normalized));
            }

            tracing::debug!(
                request_id = %ctx.request_id,
                provider = %name,
                reason = verdict.reason.as_deref().unwrap_or("unspecified"),
                "Response rejected, trying next candidate"
            );
        }

        Err(DispatchError::Exhausted)
    }
}

fn into_response(normalized: NormalizedResponse) -> Response<Body> {
    let mut response = Response::new(Body::from(normalized.body));
    *response.status_mut() = normalized.status;
    *response.headers_mut() = normalized.headers;
    response
}
