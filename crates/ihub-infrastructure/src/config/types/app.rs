//! Main application configuration

use serde::{Deserialize, Serialize};

pub use super::logging::LoggingConfig;
pub use super::routing::RoutingConfig;

/// Credential encryption configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    /// 64 hex characters (32 bytes); generated at start-up when absent
    pub encryption_key: Option<String>,
}

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Credential encryption configuration
    pub crypto: CryptoConfig,
    /// Routing configuration
    pub routing: RoutingConfig,
}
