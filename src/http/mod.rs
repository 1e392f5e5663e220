//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, immutable snapshot)
//!     → routing resolves the resource
//!     → dispatch loop drives providers
//!     → winning response (or generic failure) to client
//! ```

pub mod request;
pub mod server;

pub use request::{RequestContext, RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
