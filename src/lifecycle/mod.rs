//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Validate → Seed registry → Spawn monitors → Listen
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain → Join monitors → Exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
