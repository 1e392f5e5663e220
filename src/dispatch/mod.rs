//! Dispatch subsystem: the broker's core control flow.
//!
//! # Data Flow
//! ```text
//! Resolved resource + request snapshot
//!     → ranker.rs (health-ordered candidate list)
//!     → dispatcher.rs (sequential failover loop):
//!         mapping::map_request
//!         → forwarder.rs (one outbound call, timed)
//!         → registry + metrics record, event publish
//!         → mapping::map_response → validator.rs
//!         → accept (stop) or advance to next candidate
//!     → winning response | terminal DispatchError
//! ```
//!
//! # Design Decisions
//! - Continue-on-failure: a transport failure advances to the next
//!   candidate instead of aborting the loop
//! - Validation rejections and transport failures are equally non-fatal
//! - Terminal errors map to generic client responses upstream; provider
//!   identities never leak to clients

pub mod dispatcher;
pub mod forwarder;
pub mod ranker;
pub mod validator;

pub use dispatcher::{DispatchError, Dispatcher};
pub use forwarder::{ForwardFailure, ForwardedResponse, Forwarder};
pub use validator::ValidationResult;
