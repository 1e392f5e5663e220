//! Resource resolution.
//!
//! # Responsibilities
//! - Map an inbound request path to a resource's configuration
//! - Return an explicit no-match instead of a silent default
//!
//! # Design Decisions
//! - Compiled once at startup, immutable at runtime (no locks)
//! - Longest matching prefix wins; declaration order breaks ties
//! - No regex, O(n) over the configured resources

use std::sync::Arc;

use crate::config::ResourceConfig;

/// Maps request paths to resource configurations.
#[derive(Debug)]
pub struct ResourceResolver {
    /// Resources sorted longest prefix first (stable, so declaration
    /// order survives for equal lengths).
    resources: Vec<Arc<ResourceConfig>>,
}

impl ResourceResolver {
    pub fn from_config(resources: Vec<ResourceConfig>) -> Self {
        let mut resources: Vec<Arc<ResourceConfig>> =
            resources.into_iter().map(Arc::new).collect();
        resources.sort_by(|a, b| b.path_prefix.len().cmp(&a.path_prefix.len()));
        Self { resources }
    }

    /// Resolve a request path to a resource, or None if nothing matches.
    pub fn resolve(&self, path: &str) -> Option<Arc<ResourceConfig>> {
        self.resources
            .iter()
            .find(|resource| path.starts_with(&resource.path_prefix))
            .cloned()
    }
}
