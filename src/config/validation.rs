//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (resources reference existing providers)
//! - Validate value ranges (intervals > 0, URLs parse, status ranges sane)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BrokerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use thiserror::Error;
use url::Url;

use crate::config::schema::BrokerConfig;

/// A single semantic configuration error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("duplicate provider name `{0}`")]
    DuplicateProvider(String),

    #[error("duplicate resource name `{0}`")]
    DuplicateResource(String),

    #[error("provider `{name}` has an invalid base URL: {reason}")]
    InvalidBaseUrl { name: String, reason: String },

    #[error("provider `{0}` healthcheck path must start with `/`")]
    InvalidHealthcheckPath(String),

    #[error("provider `{0}` healthcheck interval must be greater than zero")]
    ZeroHealthcheckInterval(String),

    #[error("resource `{0}` configures no providers")]
    EmptyProviderList(String),

    #[error("resource `{resource}` references unknown provider `{provider}`")]
    UnknownProvider { resource: String, provider: String },

    #[error("resource `{0}` has an empty path prefix")]
    EmptyPathPrefix(String),

    #[error("resource `{name}` has an inverted status range {min}..={max}")]
    InvertedStatusRange { name: String, min: u16, max: u16 },

    #[error("attempt timeout must be greater than zero")]
    ZeroAttemptTimeout,
}

/// Validate a loaded configuration, collecting every error found.
pub fn validate_config(config: &BrokerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut provider_names = HashSet::new();
    for provider in &config.providers {
        if !provider_names.insert(provider.name.as_str()) {
            errors.push(ValidationError::DuplicateProvider(provider.name.clone()));
        }
        if let Err(e) = Url::parse(&provider.base_url) {
            errors.push(ValidationError::InvalidBaseUrl {
                name: provider.name.clone(),
                reason: e.to_string(),
            });
        }
        if !provider.healthcheck.path.starts_with('/') {
            errors.push(ValidationError::InvalidHealthcheckPath(provider.name.clone()));
        }
        if provider.healthcheck.interval_secs == 0 {
            errors.push(ValidationError::ZeroHealthcheckInterval(provider.name.clone()));
        }
    }

    let mut resource_names = HashSet::new();
    for resource in &config.resources {
        if !resource_names.insert(resource.name.as_str()) {
            errors.push(ValidationError::DuplicateResource(resource.name.clone()));
        }
        if resource.path_prefix.is_empty() {
            errors.push(ValidationError::EmptyPathPrefix(resource.name.clone()));
        }
        if resource.providers.is_empty() {
            errors.push(ValidationError::EmptyProviderList(resource.name.clone()));
        }
        for provider in &resource.providers {
            if !provider_names.contains(provider.as_str()) {
                errors.push(ValidationError::UnknownProvider {
                    resource: resource.name.clone(),
                    provider: provider.clone(),
                });
            }
        }
        if resource.accept.status_min > resource.accept.status_max {
            errors.push(ValidationError::InvertedStatusRange {
                name: resource.name.clone(),
                min: resource.accept.status_min,
                max: resource.accept.status_max,
            });
        }
    }

    if config.timeouts.attempt_secs == 0 {
        errors.push(ValidationError::ZeroAttemptTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ProviderConfig, ResourceConfig};

    fn provider(name: &str) -> ProviderConfig {
        ProviderConfig {
            name: name.into(),
            base_url: "http://127.0.0.1:3000".into(),
            priority: None,
            healthcheck: Default::default(),
        }
    }

    fn resource(name: &str, providers: &[&str]) -> ResourceConfig {
        ResourceConfig {
            name: name.into(),
            path_prefix: format!("/{name}"),
            providers: providers.iter().map(|p| p.to_string()).collect(),
            try_all_providers: true,
            accept: Default::default(),
            mapping: Default::default(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        let mut config = BrokerConfig::default();
        config.providers.push(provider("a"));
        config.resources.push(resource("orders", &["a"]));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let mut config = BrokerConfig::default();
        config.providers.push(provider("a"));
        config.resources.push(resource("orders", &["a", "ghost"]));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            ValidationError::UnknownProvider { provider, .. } if provider == "ghost"
        ));
    }

    #[test]
    fn test_all_errors_collected() {
        let mut config = BrokerConfig::default();
        let mut bad = provider("a");
        bad.base_url = "not a url".into();
        bad.healthcheck.interval_secs = 0;
        config.providers.push(bad);
        config.resources.push(resource("orders", &[]));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_inverted_status_range_rejected() {
        let mut config = BrokerConfig::default();
        config.providers.push(provider("a"));
        let mut r = resource("orders", &["a"]);
        r.accept.status_min = 300;
        r.accept.status_max = 200;
        config.resources.push(r);

        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(&errors[0], ValidationError::InvertedStatusRange { .. }));
    }
}
