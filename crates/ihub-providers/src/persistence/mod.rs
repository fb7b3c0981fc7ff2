//! Persistence adapters
//!
//! | Adapter | Description |
//! |---------|-------------|
//! | [`InMemoryIntegrationStore`] | Process-local store for development and tests |

pub mod memory;

pub use memory::InMemoryIntegrationStore;
