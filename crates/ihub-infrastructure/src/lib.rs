//! # Integration Hub - Infrastructure Layer
//!
//! Concrete services behind the domain ports, plus the cross-cutting
//! technical concerns shared by the whole workspace.
//!
//! ## Module Categories
//!
//! ### Routing & Execution
//! | Module | Description |
//! |--------|-------------|
//! | [`routing`] | Health-aware provider scoring, failover and parallel fan-out |
//! | [`events`] | Best-effort integration event logging |
//!
//! ### Security & Credentials
//! | Module | Description |
//! |--------|-------------|
//! | [`crypto`] | AES-256-GCM credential encryption, hashing, tokens |
//! | [`credentials`] | Credential CRUD, expiry checks and key rotation |
//!
//! ### Catalog
//! | Module | Description |
//! |--------|-------------|
//! | [`registry`] | Provider catalog, legacy accessors, provider statistics |
//!
//! ### Configuration & Composition
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Figment-based layered configuration |
//! | [`bootstrap`] | Composition root wiring every service |
//! | [`constants`] | Infrastructure constants |
//!
//! ### Support
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | TTL cache driven by an injectable clock |
//! | [`logging`] | Structured logging with tracing |
//! | [`utils`] | Timing helpers |

pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod crypto;
pub mod error_ext;
pub mod events;
pub mod logging;
pub mod registry;
pub mod routing;
pub mod utils;

// Re-export commonly used types
pub use bootstrap::{IntegrationHub, init_hub};
pub use error_ext::ErrorContext;
pub use utils::TimedOperation;
