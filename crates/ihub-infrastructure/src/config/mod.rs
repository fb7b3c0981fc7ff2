//! Configuration management
//!
//! Layered loading: built-in defaults, then an optional `ihub.toml`, then
//! `IHUB__`-prefixed environment variables.

pub mod loader;
pub mod types;

pub use loader::{ConfigBuilder, ConfigLoader};
pub use types::{AppConfig, CryptoConfig, LoggingConfig, RoutingConfig};
