//! Runtime orchestration and lifecycle management.
//!
//! - [`MarketplaceSystem`] starts the store actor, wires the fetcher and the
//!   favorite manager to it and to the session provider, and shuts it all down.
//! - [`setup_tracing`] initializes logging.

pub mod marketplace_system;
pub mod tracing;

pub use marketplace_system::*;
pub use tracing::*;
