//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the broker.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root configuration for the API broker.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BrokerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Backend provider definitions.
    pub providers: Vec<ProviderConfig>,

    /// Resource definitions mapping request paths to provider lists.
    pub resources: Vec<ResourceConfig>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Body size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Backend provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Unique provider identifier.
    pub name: String,

    /// Base URL requests are forwarded to (e.g., "http://127.0.0.1:3000").
    pub base_url: String,

    /// Static priority for ranking ties (lower = preferred).
    /// Providers without a priority sort after those with one.
    #[serde(default)]
    pub priority: Option<u32>,

    /// Healthcheck probe settings for this provider.
    #[serde(default)]
    pub healthcheck: HealthcheckConfig,
}

/// Healthcheck probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthcheckConfig {
    /// Path to probe on the provider's base URL.
    pub path: String,

    /// Probe interval in seconds. The first probe fires immediately at
    /// startup; subsequent probes fire every interval.
    pub interval_secs: u64,
}

impl Default for HealthcheckConfig {
    fn default() -> Self {
        Self {
            path: "/health".to_string(),
            interval_secs: 10,
        }
    }
}

/// Resource configuration mapping a request path to candidate providers.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResourceConfig {
    /// Resource identifier for logging/metrics.
    pub name: String,

    /// Path prefix to match (longest prefix wins across resources).
    pub path_prefix: String,

    /// Ordered list of provider names able to serve this resource.
    /// Declaration order is the final ranking tie-break.
    pub providers: Vec<String>,

    /// When false, only the top-ranked candidate is ever forwarded to.
    #[serde(default = "default_try_all")]
    pub try_all_providers: bool,

    /// Acceptance criteria a provider response must satisfy.
    #[serde(default)]
    pub accept: AcceptanceCriteria,

    /// Request/response field mapping rules for this resource.
    #[serde(default)]
    pub mapping: MappingConfig,
}

fn default_try_all() -> bool {
    true
}

/// Criteria a normalized response must satisfy to be returned to the client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AcceptanceCriteria {
    /// Lowest accepted status code (inclusive).
    pub status_min: u16,

    /// Highest accepted status code (inclusive).
    pub status_max: u16,

    /// Top-level JSON fields that must be present in the mapped body.
    pub required_fields: Vec<String>,
}

impl Default for AcceptanceCriteria {
    fn default() -> Self {
        Self {
            status_min: 200,
            status_max: 299,
            required_fields: Vec::new(),
        }
    }
}

/// Field mapping rules between the client and provider shapes.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MappingConfig {
    /// Client headers forwarded to providers. Empty = forward everything
    /// except hop-by-hop headers.
    pub request_headers: Vec<String>,

    /// Outbound path override. When unset the client path is forwarded
    /// unchanged.
    pub rewrite_path: Option<String>,

    /// Top-level JSON key renames applied to provider responses
    /// (provider field name -> client field name).
    pub response_fields: HashMap<String, String>,
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total inbound request timeout in seconds.
    pub request_secs: u64,

    /// Per-attempt timeout for one outbound forward (including body read),
    /// in seconds. A timed-out attempt is a transport failure.
    pub attempt_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            attempt_secs: 10,
        }
    }
}

/// Body size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum buffered body size in bytes, inbound and outbound.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_parses() {
        let toml = r#"
            [listener]
            bind_address = "127.0.0.1:8080"

            [[providers]]
            name = "orders-primary"
            base_url = "http://127.0.0.1:3001"
            priority = 1

            [providers.healthcheck]
            path = "/healthz"
            interval_secs = 5

            [[resources]]
            name = "orders"
            path_prefix = "/orders"
            providers = ["orders-primary"]

            [resources.accept]
            required_fields = ["order_id"]
        "#;

        let config: BrokerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.providers.len(), 1);
        assert_eq!(config.providers[0].priority, Some(1));
        assert_eq!(config.providers[0].healthcheck.interval_secs, 5);
        assert_eq!(config.resources[0].providers, vec!["orders-primary"]);
        assert!(config.resources[0].try_all_providers);
        assert_eq!(config.resources[0].accept.status_min, 200);
        assert_eq!(config.resources[0].accept.required_fields, vec!["order_id"]);
    }

    #[test]
    fn test_defaults() {
        let config = BrokerConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.timeouts.attempt_secs, 10);
        assert_eq!(config.limits.max_body_bytes, 2 * 1024 * 1024);
        assert!(config.providers.is_empty());
    }
}
