//! API broker library.
//!
//! Accepts client requests for logical resources, ranks the configured
//! backend providers by observed health, and forwards sequentially until
//! one response satisfies the resource's acceptance criteria.

pub mod config;
pub mod dispatch;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod mapping;
pub mod observability;
pub mod routing;

pub use config::BrokerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
