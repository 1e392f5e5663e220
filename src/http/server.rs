//! HTTP server setup and the broker handler.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all broker handler
//! - Wire up middleware (timeout, request ID, tracing)
//! - Spawn one health monitor per configured provider
//! - Map terminal dispatch errors to client-facing status codes
//!
//! # Design Decisions
//! - Clients see the winning provider's mapped response, a 404, or a
//!   bodiless 503; never internal diagnostics or provider identities
//! - Monitors subscribe to the shutdown broadcast and are joined after
//!   the listener drains

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::BrokerConfig;
use crate::dispatch::{DispatchError, Dispatcher, Forwarder};
use crate::health::{HealthMonitor, HealthRegistry};
use crate::http::request::{RequestContext, RequestIdLayer};
use crate::lifecycle::Shutdown;
use crate::observability::events::DispatchNotifier;
use crate::observability::metrics;
use crate::routing::ResourceResolver;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<ResourceResolver>,
    pub dispatcher: Arc<Dispatcher>,
    pub max_body_bytes: usize,
}

/// HTTP server for the API broker.
pub struct HttpServer {
    router: Router,
    config: BrokerConfig,
    registry: Arc<HealthRegistry>,
    forwarder: Forwarder,
    notifier: DispatchNotifier,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: BrokerConfig) -> Self {
        let resolver = Arc::new(ResourceResolver::from_config(config.resources.clone()));
        let registry = Arc::new(HealthRegistry::new(
            config.providers.iter().map(|p| p.name.clone()),
        ));
        let forwarder = Forwarder::new(
            Duration::from_secs(config.timeouts.attempt_secs),
            config.limits.max_body_bytes,
        );
        let notifier = DispatchNotifier::default();
        let dispatcher = Arc::new(Dispatcher::new(
            &config.providers,
            registry.clone(),
            forwarder.clone(),
            notifier.clone(),
        ));

        let state = AppState {
            resolver,
            dispatcher,
            max_body_bytes: config.limits.max_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            registry,
            forwarder,
            notifier,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &BrokerConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(broker_handler))
            .route("/", any(broker_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Observer surface for dispatch events.
    pub fn notifier(&self) -> &DispatchNotifier {
        &self.notifier
    }

    /// Shared health registry (introspection and tests).
    pub fn registry(&self) -> Arc<HealthRegistry> {
        self.registry.clone()
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Spawns one health monitor per configured provider; monitors and
    /// the listener both stop when `shutdown` triggers, and the monitors
    /// are joined before this returns.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let mut monitors = Vec::with_capacity(self.config.providers.len());
        for provider in &self.config.providers {
            let monitor = HealthMonitor::new(
                Arc::new(provider.clone()),
                self.registry.clone(),
                self.forwarder.clone(),
            );
            monitors.push(tokio::spawn(monitor.run(shutdown.subscribe())));
        }

        let mut shutdown_rx = shutdown.subscribe();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        for monitor in monitors {
            let _ = monitor.await;
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main broker handler: resolve the resource, run the dispatch loop,
/// translate terminal errors.
async fn broker_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let Some(resource) = state.resolver.resolve(&path) else {
        tracing::warn!(method = %method, path = %path, "No resource matches path");
        metrics::record_request(&method, 404, "none", start);
        return StatusCode::NOT_FOUND.into_response();
    };

    let ctx = match RequestContext::from_request(request, state.max_body_bytes).await {
        Ok(ctx) => ctx,
        Err(_) => {
            metrics::record_request(&method, 413, &resource.name, start);
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };

    tracing::debug!(
        request_id = %ctx.request_id,
        resource = %resource.name,
        method = %ctx.method,
        path = %ctx.path,
        "Brokering request"
    );

    match state.dispatcher.dispatch(&resource, &ctx).await {
        Ok(response) => {
            metrics::record_request(&method, response.status().as_u16(), &resource.name, start);
            response
        }
        Err(error) => {
            let status = match error {
                DispatchError::ResourceNotFound => StatusCode::NOT_FOUND,
                DispatchError::ProviderConfigInvalid(_)
                | DispatchError::NoProvidersAvailable
                | DispatchError::Exhausted => StatusCode::SERVICE_UNAVAILABLE,
            };
            tracing::warn!(
                request_id = %ctx.request_id,
                resource = %resource.name,
                error = %error,
                "Dispatch failed"
            );
            metrics::record_request(&method, status.as_u16(), &resource.name, start);
            // Generic outcome only: no body, no provider identities.
            status.into_response()
        }
    }
}
