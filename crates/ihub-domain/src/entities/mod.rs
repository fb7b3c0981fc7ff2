//! Persisted entities
//!
//! Logical, store-agnostic shapes. How they map onto tables or documents is
//! the concern of the persistence adapter.

pub mod credential;
pub mod event;
pub mod provider;

pub use credential::{
    Credential, CredentialEntry, CredentialId, CredentialMap, LegacyCredential, RotationOutcome,
    RotationStatus,
};
pub use event::{EventFilter, EventStats, EventStatus, IntegrationEvent};
pub use provider::{
    LegacyWeights, ProviderConfig, ProviderRecord, RoutingWeight, StoredHealthStatus,
};
