//! Configuration types

pub mod app;
pub mod logging;
pub mod routing;

pub use app::{AppConfig, CryptoConfig};
pub use logging::LoggingConfig;
pub use routing::RoutingConfig;
