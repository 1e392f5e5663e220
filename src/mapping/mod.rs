//! Request/response field remapping between client and provider shapes.
//!
//! # Data Flow
//! ```text
//! RequestContext + ResourceConfig.mapping + ProviderConfig
//!     → map_request (outbound URI, header subset, body pass-through)
//!
//! ForwardedResponse + ResourceConfig.mapping
//!     → map_response (hop-by-hop strip, top-level JSON key renames)
//!     → NormalizedResponse (validated, then returned to the client)
//! ```
//!
//! # Design Decisions
//! - One capability pair (map_request / map_response) parameterized per
//!   resource, not per-provider variants
//! - Hop-by-hop headers never cross the broker in either direction
//! - The provider's Host header is set by the client stack from the
//!   outbound URI, never copied from the inbound request

use axum::body::{Body, Bytes};
use axum::http::{header::HeaderValue, HeaderMap, HeaderName, Request, StatusCode};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::{ProviderConfig, ResourceConfig};
use crate::dispatch::forwarder::ForwardedResponse;
use crate::http::request::{RequestContext, X_REQUEST_ID};

/// Headers that are connection-scoped and never forwarded.
const HOP_BY_HOP_HEADERS: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("failed to build outbound request: {0}")]
    BuildRequest(String),
}

/// A provider response normalized into the resource's client-facing shape.
#[derive(Debug)]
pub struct NormalizedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Top-level JSON object of the mapped body, when the body is one.
    /// Validation checks required fields against this.
    pub fields: Option<Map<String, Value>>,
}

/// Build the outbound request for one provider from the inbound snapshot.
pub fn map_request(
    resource: &ResourceConfig,
    provider: &ProviderConfig,
    ctx: &RequestContext,
) -> Result<Request<Body>, MappingError> {
    let path = resource
        .mapping
        .rewrite_path
        .as_deref()
        .unwrap_or(&ctx.path);
    let mut uri_string = format!("{}{}", provider.base_url.trim_end_matches('/'), path);
    if let Some(query) = &ctx.query {
        uri_string.push('?');
        uri_string.push_str(query);
    }

    let mut builder = Request::builder().method(ctx.method.clone()).uri(&uri_string);

    if let Some(headers) = builder.headers_mut() {
        for (name, value) in ctx.headers.iter() {
            if forwards_header(name, &resource.mapping.request_headers) {
                headers.insert(name.clone(), value.clone());
            }
        }
        if let Ok(value) = HeaderValue::from_str(&ctx.request_id) {
            headers.insert(X_REQUEST_ID, value);
        }
    }

    builder
        .body(Body::from(ctx.body.clone()))
        .map_err(|e| MappingError::BuildRequest(e.to_string()))
}

fn forwards_header(name: &HeaderName, allow_list: &[String]) -> bool {
    let name = name.as_str();
    if HOP_BY_HOP_HEADERS.contains(&name) || name == "host" || name == "content-length" {
        return false;
    }
    if allow_list.is_empty() {
        return true;
    }
    allow_list.iter().any(|allowed| allowed.eq_ignore_ascii_case(name))
}

/// Normalize a received provider response into the client-facing shape.
pub fn map_response(resource: &ResourceConfig, response: ForwardedResponse) -> NormalizedResponse {
    let mut headers = response.headers;
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(name);
    }
    // The body may be rewritten below; the server stack recomputes length.
    headers.remove("content-length");

    let parsed = serde_json::from_slice::<Value>(&response.body)
        .ok()
        .and_then(|value| match value {
            Value::Object(fields) => Some(fields),
            _ => None,
        });

    let renames = &resource.mapping.response_fields;
    match parsed {
        Some(mut fields) if !renames.is_empty() => {
            for (from, to) in renames {
                if let Some(value) = fields.remove(from) {
                    fields.insert(to.clone(), value);
                }
            }
            let body = match serde_json::to_vec(&fields) {
                Ok(body) => Bytes::from(body),
                Err(_) => response.body,
            };
            NormalizedResponse {
                status: response.status,
                headers,
                body,
                fields: Some(fields),
            }
        }
        fields => NormalizedResponse {
            status: response.status,
            headers,
            body: response.body,
            fields,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{MappingConfig, ProviderConfig, ResourceConfig};
    use axum::http::Method;

    fn resource(mapping: MappingConfig) -> ResourceConfig {
        ResourceConfig {
            name: "orders".into(),
            path_prefix: "/orders".into(),
            providers: vec!["a".into()],
            try_all_providers: true,
            accept: Default::default(),
            mapping,
        }
    }

    fn provider() -> ProviderConfig {
        ProviderConfig {
            name: "a".into(),
            base_url: "http://127.0.0.1:3000/".into(),
            priority: None,
            healthcheck: Default::default(),
        }
    }

    fn context() -> RequestContext {
        let mut headers = HeaderMap::new();
        headers.insert("accept", HeaderValue::from_static("application/json"));
        headers.insert("authorization", HeaderValue::from_static("Bearer t"));
        headers.insert("connection", HeaderValue::from_static("keep-alive"));
        headers.insert("host", HeaderValue::from_static("broker.local"));
        RequestContext {
            method: Method::GET,
            path: "/orders/42".into(),
            query: Some("full=true".into()),
            headers,
            body: Bytes::new(),
            request_id: "req-1".into(),
        }
    }

    #[test]
    fn test_map_request_builds_provider_uri() {
        let request = map_request(&resource(MappingConfig::default()), &provider(), &context()).unwrap();
        assert_eq!(request.uri(), "http://127.0.0.1:3000/orders/42?full=true");
        assert_eq!(request.headers().get(X_REQUEST_ID).unwrap(), "req-1");
        // Hop-by-hop and host never cross.
        assert!(request.headers().get("connection").is_none());
        assert!(request.headers().get("host").is_none());
    }

    #[test]
    fn test_map_request_rewrite_path() {
        let mapping = MappingConfig {
            rewrite_path: Some("/v2/orders".into()),
            ..Default::default()
        };
        let request = map_request(&resource(mapping), &provider(), &context()).unwrap();
        assert_eq!(request.uri(), "http://127.0.0.1:3000/v2/orders?full=true");
    }

    #[test]
    fn test_map_request_header_allow_list() {
        let mapping = MappingConfig {
            request_headers: vec!["Accept".into()],
            ..Default::default()
        };
        let request = map_request(&resource(mapping), &provider(), &context()).unwrap();
        assert!(request.headers().get("accept").is_some());
        assert!(request.headers().get("authorization").is_none());
    }

    #[test]
    fn test_map_response_renames_fields() {
        let mapping = MappingConfig {
            response_fields: [("id".to_string(), "order_id".to_string())].into(),
            ..Default::default()
        };
        let mut headers = HeaderMap::new();
        headers.insert("transfer-encoding", HeaderValue::from_static("chunked"));
        let response = ForwardedResponse {
            status: StatusCode::OK,
            headers,
            body: Bytes::from(r#"{"id": 42, "total": 7}"#),
        };

        let normalized = map_response(&resource(mapping), response);
        let fields = normalized.fields.unwrap();
        assert_eq!(fields["order_id"], 42);
        assert_eq!(fields["total"], 7);
        assert!(!fields.contains_key("id"));
        assert!(normalized.headers.get("transfer-encoding").is_none());
    }

    #[test]
    fn test_map_response_non_json_body_passes_through() {
        let response = ForwardedResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::from("plain text"),
        };
        let normalized = map_response(&resource(MappingConfig::default()), response);
        assert!(normalized.fields.is_none());
        assert_eq!(normalized.body, Bytes::from("plain text"));
    }
}
