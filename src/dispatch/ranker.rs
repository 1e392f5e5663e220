//! Provider ranking.
//!
//! # Responsibilities
//! - Order a resource's providers by estimated likelihood of success
//! - Combine recent success rate and latency from a registry snapshot
//!
//! # Design Decisions
//! - Providers with a recent success are scored and ranked first
//! - Never-checked providers rank after them ("unknown" beats known-bad),
//!   ordered by static priority then declaration order
//! - Providers whose recent window is all failures rank last
//! - Every tie breaks by priority then declaration order, so the
//!   ordering is deterministic for a given snapshot

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{ProviderConfig, ResourceConfig};
use crate::health::registry::HealthSnapshot;

/// How strongly latency discounts the success-rate score: 1.0 of score
/// per this many milliseconds of last observed latency.
const LATENCY_PENALTY_DIVISOR: f64 = 10_000.0;

/// Ranking buckets, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Bucket {
    Scored = 0,
    Unknown = 1,
    Failing = 2,
}

struct Candidate<'a> {
    name: &'a str,
    bucket: Bucket,
    score: f64,
    priority: u32,
    index: usize,
}

/// Produce the ordered candidate list for one resource, best first.
///
/// Returns an empty list when the resource configures no providers or
/// none of them resolve to a provider config. When the resource opts out
/// of failover (`try_all_providers = false`) only the top candidate is
/// returned.
pub fn rank(
    resource: &ResourceConfig,
    providers: &HashMap<String, Arc<ProviderConfig>>,
    snapshot: &HashMap<String, HealthSnapshot>,
) -> Vec<String> {
    let mut candidates = Vec::with_capacity(resource.providers.len());

    for (index, name) in resource.providers.iter().enumerate() {
        let Some(provider) = providers.get(name) else {
            tracing::warn!(
                resource = %resource.name,
                provider = %name,
                "Skipping provider with no configuration"
            );
            continue;
        };

        let (bucket, score) = match snapshot.get(name) {
            Some(health) if health.checks > 0 => {
                let penalty = health.last_latency_ms.unwrap_or(0) as f64 / LATENCY_PENALTY_DIVISOR;
                let score = health.success_rate - penalty;
                if health.has_recent_success {
                    (Bucket::Scored, score)
                } else {
                    (Bucket::Failing, score)
                }
            }
            _ => (Bucket::Unknown, 0.0),
        };

        candidates.push(Candidate {
            name,
            bucket,
            score,
            priority: provider.priority.unwrap_or(u32::MAX),
            index,
        });
    }

    candidates.sort_by(|a, b| {
        a.bucket
            .cmp(&b.bucket)
            .then_with(|| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
            .then_with(|| a.priority.cmp(&b.priority))
            .then_with(|| a.index.cmp(&b.index))
    });

    let mut ranked: Vec<String> = candidates.into_iter().map(|c| c.name.to_string()).collect();
    if !resource.try_all_providers {
        ranked.truncate(1);
    }
    ranked
}
