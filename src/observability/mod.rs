//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatch loop and health monitors produce:
//!     → metrics.rs (attempt records, inbound request records)
//!     → events.rs (per-attempt dispatch events, best-effort)
//!
//! Consumers:
//!     → Metrics endpoint (Prometheus scrape)
//!     → Event subscribers (in-process observers)
//! ```
//!
//! # Design Decisions
//! - Structured logging via tracing, request ID in every dispatch span
//! - Metric updates are cheap (atomic increments)
//! - Event delivery is best-effort; observers can never slow dispatch

pub mod events;
pub mod metrics;

pub use events::{DispatchEvent, DispatchNotifier};
pub use metrics::Origin;
