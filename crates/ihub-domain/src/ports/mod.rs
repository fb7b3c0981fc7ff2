//! Domain Port Interfaces
//!
//! Boundary contracts between the domain and the outer layers.
//!
//! ## Organization
//!
//! - **adapter** - Third-party provider adapters driven by the router
//! - **persistence** - Provider record and event storage
//! - **crypto** - Authenticated encryption of credential payloads
//! - **clock** - Injectable time source
//! - **executor** - Request execution as seen by consumers

/// Provider adapter contract
pub mod adapter;
/// Time source
pub mod clock;
/// Credential encryption
pub mod crypto;
/// Request execution
pub mod executor;
/// Provider and event storage
pub mod persistence;

pub use adapter::{AdapterInfo, AdapterStatus, ProviderAdapter};
pub use clock::{Clock, ManualClock, SystemClock};
pub use crypto::{CryptoProvider, CryptoProviderExt};
pub use executor::IntegrationExecutor;
pub use persistence::{EventStore, ProviderStore};
