//! Value objects
//!
//! Ephemeral types that flow through the router and are never persisted.

pub mod health;
pub mod request;

pub use health::{ProviderHealth, ProviderScore, error_penalty};
pub use request::{Capability, IntegrationRequest, IntegrationResponse};
