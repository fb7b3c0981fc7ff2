//! # Integration Hub - Port Adapters
//!
//! Implementations of the persistence ports defined in `ihub-domain`.
//!
//! | Category | Port | Implementations |
//! |----------|------|-----------------|
//! | Persistence | `ProviderStore`, `EventStore` | InMemory |
//!
//! ## Usage
//!
//! ```ignore
//! use ihub_providers::persistence::InMemoryIntegrationStore;
//!
//! let store = Arc::new(InMemoryIntegrationStore::new());
//! let hub = init_hub(config, Some(store.clone()), Some(store)).await?;
//! ```

pub use ihub_domain::error::{Error, Result};
pub use ihub_domain::ports::{EventStore, ProviderStore};

/// Persistence adapters
///
/// Implements `ProviderStore` and `EventStore`.
pub mod persistence;
