//! Health monitoring subsystem.
//!
//! # Data Flow
//! ```text
//! Active probes (monitor.rs):
//!     Per-provider timer (immediate first tick)
//!     → Probe healthcheck route
//!     → registry.rs record + probe metric
//!
//! Dispatch attempts (dispatch/dispatcher.rs):
//!     Attempt outcome observed
//!     → registry.rs record + attempt metric
//!
//! Ranking (dispatch/ranker.rs):
//!     registry.rs snapshot → ordered candidates
//! ```
//!
//! # Design Decisions
//! - Probe and dispatch outcomes feed the same records, with the same
//!   success predicate
//! - Health state is per-provider, shared across all resources
//! - A process restart discards all records; ranking falls back to
//!   static priority and declaration order until the first probe cycle

pub mod monitor;
pub mod registry;

pub use monitor::HealthMonitor;
pub use registry::{HealthRegistry, HealthSnapshot};
