//! Provider record
//!
//! The canonical catalog row for an integration provider. Credentials are
//! embedded in the record rather than stored separately, so a credential
//! write is always a whole-record write.

use super::credential::CredentialMap;
use crate::constants::UNKNOWN_PROVIDER_TYPE;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Health status stored on the provider row by an out-of-band evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoredHealthStatus {
    /// No evaluation has happened yet
    #[default]
    Unknown,
    /// Provider reported as working
    Healthy,
    /// Provider reported as partially working
    Degraded,
    /// Provider reported as down
    Outage,
}

impl fmt::Display for StoredHealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unknown => "UNKNOWN",
            Self::Healthy => "HEALTHY",
            Self::Degraded => "DEGRADED",
            Self::Outage => "OUTAGE",
        };
        f.write_str(label)
    }
}

/// Routing weight configuration
///
/// A provider is configured either with a direct weight or with a priority
/// rank, never both. Serialized as `{"weight": 2.0}` or `{"priority": 3.0}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingWeight {
    /// Weight used as-is
    Weight(f64),
    /// Rank where 1 is best; the effective weight is `1 / priority`
    Priority(f64),
}

impl RoutingWeight {
    /// Effective weight, or `None` when the configured value is unusable
    /// (non-finite, zero or negative)
    pub fn effective(self) -> Option<f64> {
        let value = match self {
            Self::Weight(weight) => weight,
            Self::Priority(priority) => {
                if priority <= 0.0 {
                    return None;
                }
                1.0 / priority
            }
        };
        (value.is_finite() && value > 0.0).then_some(value)
    }
}

/// Legacy quality/speed/cost weights kept on the provider config
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyWeights {
    /// Relative importance of result quality
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<f64>,
    /// Relative importance of latency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Relative importance of cost
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

/// Structured provider configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Capabilities advertised by the administrative upsert
    #[serde(default)]
    pub capabilities: Vec<String>,

    /// Routing weight used by the router's scoring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<RoutingWeight>,

    /// Health status written by the health evaluation process
    #[serde(default)]
    pub health_status: StoredHealthStatus,

    /// Free-form request defaults (legacy accessor)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Map<String, Value>>,

    /// Quality/speed/cost weights (legacy accessor)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<LegacyWeights>,
}

/// Canonical provider row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRecord {
    /// Stable provider identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Provider type (e.g. "analytics", "marketplace")
    #[serde(rename = "type")]
    pub provider_type: String,
    /// Structured configuration
    #[serde(default)]
    pub config: ProviderConfig,
    /// Embedded credential entries
    #[serde(default)]
    pub credentials: CredentialMap,
    /// `false` means soft-deleted
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl ProviderRecord {
    /// Create a new active provider with empty config and no credentials
    pub fn new<I: Into<String>, N: Into<String>>(id: I, name: N, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            provider_type: UNKNOWN_PROVIDER_TYPE.to_string(),
            config: ProviderConfig::default(),
            credentials: CredentialMap::default(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the provider type
    #[must_use]
    pub fn with_type<S: Into<String>>(mut self, provider_type: S) -> Self {
        self.provider_type = provider_type.into();
        self
    }

    /// Set the advertised capabilities
    #[must_use]
    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.capabilities = capabilities.into_iter().map(Into::into).collect();
        self
    }

    /// Set the routing weight
    #[must_use]
    pub fn with_routing(mut self, routing: RoutingWeight) -> Self {
        self.config.routing = Some(routing);
        self
    }

    /// Set the stored health status
    #[must_use]
    pub fn with_health_status(mut self, status: StoredHealthStatus) -> Self {
        self.config.health_status = status;
        self
    }

    /// Record a modification
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}
