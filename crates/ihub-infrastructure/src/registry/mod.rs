//! Provider catalog

mod service;
mod stats;

pub use service::{LegacyProviderConfig, ProviderConfigUpdate, ProviderRegistry};
pub use stats::{ProviderStats, StatsPeriod};
