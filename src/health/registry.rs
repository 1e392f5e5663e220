//! Concurrency-safe store of per-provider health state.
//!
//! # Responsibilities
//! - Hold one record per configured provider for the process lifetime
//! - Accept outcome writes from monitor probes and dispatch attempts
//! - Hand immutable snapshots to the ranker
//!
//! # Design Decisions
//! - DashMap shard lock makes each record() a single atomic
//!   read-modify-write; concurrent writers never lose an update
//! - Readers clone records out and never hold a lock across ranking
//! - A rolling outcome window bounds how far history influences ranking

use dashmap::DashMap;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

/// Number of most-recent outcomes the success rate is computed over.
const OUTCOME_WINDOW: usize = 20;

/// Mutable per-provider health record. Only touched under the shard lock.
#[derive(Debug)]
struct HealthRecord {
    last_checked_at: Option<Instant>,
    consecutive_successes: u32,
    consecutive_failures: u32,
    last_latency_ms: Option<u64>,
    window: VecDeque<bool>,
    events: u64,
}

impl HealthRecord {
    fn unknown() -> Self {
        Self {
            last_checked_at: None,
            consecutive_successes: 0,
            consecutive_failures: 0,
            last_latency_ms: None,
            window: VecDeque::with_capacity(OUTCOME_WINDOW),
            events: 0,
        }
    }

    fn apply(&mut self, success: bool, latency: Duration) {
        // Instant is monotonic and the shard lock serializes writers,
        // so last_checked_at never goes backwards.
        self.last_checked_at = Some(Instant::now());
        self.last_latency_ms = Some(latency.as_millis() as u64);
        if success {
            self.consecutive_successes += 1;
            self.consecutive_failures = 0;
        } else {
            self.consecutive_failures += 1;
            self.consecutive_successes = 0;
        }
        self.window.push_back(success);
        if self.window.len() > OUTCOME_WINDOW {
            self.window.pop_front();
        }
        self.events += 1;
    }

    fn snapshot(&self) -> HealthSnapshot {
        let successes = self.window.iter().filter(|&&s| s).count();
        HealthSnapshot {
            checks: self.events,
            success_rate: if self.window.is_empty() {
                0.0
            } else {
                successes as f64 / self.window.len() as f64
            },
            has_recent_success: successes > 0,
            last_latency_ms: self.last_latency_ms,
            consecutive_successes: self.consecutive_successes,
            consecutive_failures: self.consecutive_failures,
            last_checked_at: self.last_checked_at,
        }
    }
}

/// Immutable copy of one provider's health state.
#[derive(Debug, Clone)]
pub struct HealthSnapshot {
    /// Total outcomes ever recorded for this provider.
    pub checks: u64,
    /// Fraction of successes over the rolling window.
    pub success_rate: f64,
    /// Whether the rolling window contains at least one success.
    pub has_recent_success: bool,
    /// Latency of the most recent outcome.
    pub last_latency_ms: Option<u64>,
    pub consecutive_successes: u32,
    pub consecutive_failures: u32,
    pub last_checked_at: Option<Instant>,
}

/// Shared health state for all configured providers.
#[derive(Debug, Default)]
pub struct HealthRegistry {
    records: DashMap<String, HealthRecord>,
}

impl HealthRegistry {
    /// Create a registry seeded with one "unknown" record per provider.
    pub fn new<I>(providers: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let records = DashMap::new();
        for name in providers {
            records.insert(name, HealthRecord::unknown());
        }
        Self { records }
    }

    /// Record one outcome for a provider. Monitor probes and dispatch
    /// attempts both land here.
    pub fn record(&self, provider: &str, success: bool, latency: Duration) {
        let mut record = self
            .records
            .entry(provider.to_string())
            .or_insert_with(HealthRecord::unknown);
        record.apply(success, latency);
    }

    /// Snapshot of all providers, for ranking.
    pub fn snapshot(&self) -> HashMap<String, HealthSnapshot> {
        self.records
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().snapshot()))
            .collect()
    }

    /// Snapshot of a single provider.
    pub fn get(&self, provider: &str) -> Option<HealthSnapshot> {
        self.records.get(provider).map(|record| record.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_seeded_providers_start_unknown() {
        let registry = HealthRegistry::new(vec!["a".to_string(), "b".to_string()]);
        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["a"].checks, 0);
        assert!(snapshot["a"].last_checked_at.is_none());
    }

    #[test]
    fn test_rolling_success_rate() {
        let registry = HealthRegistry::new(vec!["a".to_string()]);
        for _ in 0..3 {
            registry.record("a", true, Duration::from_millis(10));
        }
        registry.record("a", false, Duration::from_millis(10));

        let snapshot = registry.get("a").unwrap();
        assert_eq!(snapshot.checks, 4);
        assert!((snapshot.success_rate - 0.75).abs() < f64::EPSILON);
        assert_eq!(snapshot.consecutive_failures, 1);
        assert_eq!(snapshot.consecutive_successes, 0);
    }

    #[test]
    fn test_window_evicts_old_outcomes() {
        let registry = HealthRegistry::new(vec!["a".to_string()]);
        for _ in 0..OUTCOME_WINDOW {
            registry.record("a", false, Duration::from_millis(10));
        }
        for _ in 0..OUTCOME_WINDOW {
            registry.record("a", true, Duration::from_millis(10));
        }

        let snapshot = registry.get("a").unwrap();
        assert!((snapshot.success_rate - 1.0).abs() < f64::EPSILON);
        assert_eq!(snapshot.checks, 2 * OUTCOME_WINDOW as u64);
    }

    #[test]
    fn test_last_checked_at_is_monotonic() {
        let registry = HealthRegistry::new(vec!["a".to_string()]);
        let mut previous = None;
        for _ in 0..100 {
            registry.record("a", true, Duration::from_millis(1));
            let checked = registry.get("a").unwrap().last_checked_at.unwrap();
            if let Some(prev) = previous {
                assert!(checked >= prev);
            }
            previous = Some(checked);
        }
    }

    #[test]
    fn test_no_lost_updates_under_concurrent_writers() {
        const WRITERS: usize = 8;
        const UPDATES: usize = 500;

        let registry = Arc::new(HealthRegistry::new(vec!["a".to_string()]));
        let handles: Vec<_> = (0..WRITERS)
            .map(|i| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    for n in 0..UPDATES {
                        // Mix of successes and failures, as monitor ticks and
                        // dispatch attempts would produce.
                        registry.record("a", (i + n) % 2 == 0, Duration::from_millis(1));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = registry.get("a").unwrap();
        assert_eq!(snapshot.checks, (WRITERS * UPDATES) as u64);
    }
}
