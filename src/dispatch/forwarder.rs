//! Request forwarding to providers.
//!
//! # Responsibilities
//! - Send one outbound request to one provider
//! - Enforce the per-attempt timeout
//! - Measure elapsed time for metrics and health records
//!
//! # Design Decisions
//! - A timeout is a transport failure, never a response
//! - An HTTP error status is a response and still reaches validation;
//!   servers that answer are distinguished from servers that cannot be
//!   reached at all
//! - Bodies are buffered up to a limit so validation can inspect them;
//!   a mid-body error or overflow is a transport failure

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time;

/// A fully received provider response.
#[derive(Debug)]
pub struct ForwardedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Transport-level failure: no usable response was obtained.
#[derive(Debug, Error)]
pub enum ForwardFailure {
    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Outbound HTTP client shared by the dispatch loop and health probes.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
    max_body_bytes: usize,
}

impl Forwarder {
    pub fn new(timeout: Duration, max_body_bytes: usize) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            client,
            timeout,
            max_body_bytes,
        }
    }

    /// Send one request and return the outcome plus elapsed time.
    /// Elapsed time is reported for failures too, so failed attempts
    /// still produce latency records.
    pub async fn send(
        &self,
        request: Request<Body>,
    ) -> (Result<ForwardedResponse, ForwardFailure>, Duration) {
        let start = Instant::now();
        let result = match time::timeout(self.timeout, self.exchange(request)).await {
            Ok(result) => result,
            Err(_) => Err(ForwardFailure::Timeout(self.timeout)),
        };
        (result, start.elapsed())
    }

    async fn exchange(&self, request: Request<Body>) -> Result<ForwardedResponse, ForwardFailure> {
        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| ForwardFailure::Transport(e.to_string()))?;

        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(Body::new(body), self.max_body_bytes)
            .await
            .map_err(|e| ForwardFailure::Transport(e.to_string()))?;

        Ok(ForwardedResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    fn get(uri: String) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_timeout_is_transport_failure() {
        // A listener that accepts but never responds.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _socket = listener.accept().await;
            time::sleep(Duration::from_secs(60)).await;
        });

        let forwarder = Forwarder::new(Duration::from_millis(100), 1024);
        let (result, elapsed) = forwarder.send(get(format!("http://{addr}/"))).await;

        assert!(matches!(result, Err(ForwardFailure::Timeout(_))));
        assert!(elapsed >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_failure() {
        // Bind and drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let forwarder = Forwarder::new(Duration::from_secs(1), 1024);
        let (result, _) = forwarder.send(get(format!("http://{addr}/"))).await;

        assert!(matches!(result, Err(ForwardFailure::Transport(_))));
    }
}
