//! Provider health and scoring

use crate::constants::{
    DEGRADED_MULTIPLIER, ERROR_PENALTY_FLOOR, ERROR_PENALTY_STEP, HEALTHY_MULTIPLIER,
    UNHEALTHY_MULTIPLIER,
};
use crate::entities::StoredHealthStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The router's belief about a provider's availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderHealth {
    /// Provider is functioning normally
    #[default]
    Healthy,
    /// Provider is experiencing issues but still usable
    Degraded,
    /// Provider is not available
    Unhealthy,
}

impl ProviderHealth {
    /// Score multiplier for this health level
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Healthy => HEALTHY_MULTIPLIER,
            Self::Degraded => DEGRADED_MULTIPLIER,
            Self::Unhealthy => UNHEALTHY_MULTIPLIER,
        }
    }

    /// Escalate to at least degraded
    #[must_use]
    pub fn at_least_degraded(self) -> Self {
        match self {
            Self::Healthy => Self::Degraded,
            other => other,
        }
    }
}

impl From<StoredHealthStatus> for ProviderHealth {
    fn from(status: StoredHealthStatus) -> Self {
        match status {
            StoredHealthStatus::Outage => Self::Unhealthy,
            StoredHealthStatus::Degraded => Self::Degraded,
            StoredHealthStatus::Unknown | StoredHealthStatus::Healthy => Self::Healthy,
        }
    }
}

impl fmt::Display for ProviderHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        })
    }
}

/// Per-request ranking value for one candidate; never persisted
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderScore {
    /// Candidate provider id
    pub provider: String,
    /// `weight × health multiplier × error penalty`
    pub score: f64,
    /// Configured weight
    pub weight: f64,
    /// Health at ranking time
    pub health: ProviderHealth,
    /// Failed events inside the error window
    pub recent_errors: u64,
}

impl ProviderScore {
    /// Compute the score of a candidate
    pub fn compute<S: Into<String>>(
        provider: S,
        weight: f64,
        health: ProviderHealth,
        recent_errors: u64,
    ) -> Self {
        let score = weight * health.multiplier() * error_penalty(recent_errors);
        Self {
            provider: provider.into(),
            score,
            weight,
            health,
            recent_errors,
        }
    }
}

/// `max(0.5, 1 − recentErrors × 0.05)`
pub fn error_penalty(recent_errors: u64) -> f64 {
    (1.0 - recent_errors as f64 * ERROR_PENALTY_STEP).max(ERROR_PENALTY_FLOOR)
}
