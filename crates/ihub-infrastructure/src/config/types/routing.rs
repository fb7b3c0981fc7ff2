//! Router configuration types

use chrono::Duration;
use ihub_domain::constants::{
    DEFAULT_PARALLEL_COUNT, DEGRADED_ERROR_THRESHOLD, ERROR_WINDOW_SECS, HEALTH_CACHE_TTL_SECS,
    UNHEALTHY_ERROR_THRESHOLD,
};
use serde::{Deserialize, Serialize};

/// Health scoring and routing configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// How long a computed provider health is reused (seconds)
    pub health_cache_ttl_secs: u64,

    /// Window in which failed events count against a provider (seconds)
    pub error_window_secs: u64,

    /// More recent failures than this mark a provider degraded
    pub degraded_error_threshold: u64,

    /// More recent failures than this mark a provider unhealthy
    pub unhealthy_error_threshold: u64,

    /// Fan-out width used when a caller does not specify one
    pub default_parallel_count: usize,
}

impl RoutingConfig {
    /// Health cache TTL as a duration
    pub fn health_cache_ttl(&self) -> Duration {
        Duration::seconds(i64::try_from(self.health_cache_ttl_secs).unwrap_or(i64::MAX))
    }

    /// Error window as a duration
    pub fn error_window(&self) -> Duration {
        Duration::seconds(i64::try_from(self.error_window_secs).unwrap_or(i64::MAX))
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            health_cache_ttl_secs: HEALTH_CACHE_TTL_SECS,
            error_window_secs: ERROR_WINDOW_SECS,
            degraded_error_threshold: DEGRADED_ERROR_THRESHOLD,
            unhealthy_error_threshold: UNHEALTHY_ERROR_THRESHOLD,
            default_parallel_count: DEFAULT_PARALLEL_COUNT,
        }
    }
}
