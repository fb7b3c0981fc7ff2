//! Provider Routing Infrastructure
//!
//! Selects and drives provider adapters based on configured weight,
//! stored health status and recent failures.
//!
//! ## Components
//!
//! - [`HealthEvaluator`] - Cached health from stored status and error counts
//! - [`ProviderScorer`] - Weight lookup, scoring and ranking
//! - [`IntegrationRouter`] - Adapter registry, failover and parallel fan-out

mod health;
mod router;
mod scoring;

pub use health::HealthEvaluator;
pub use router::{IntegrationRouter, ProbeResult};
pub use scoring::{ProviderScorer, RankedProvider, rank_scored};
