//! Provider usage statistics

use chrono::Duration;
use ihub_domain::entities::EventStats;
use ihub_domain::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Look-back window for provider statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StatsPeriod {
    /// Last 24 hours
    #[serde(rename = "1d")]
    Day,
    /// Last 7 days
    #[default]
    #[serde(rename = "7d")]
    Week,
    /// Last 30 days
    #[serde(rename = "30d")]
    Month,
}

impl StatsPeriod {
    /// Window length
    pub fn duration(self) -> Duration {
        match self {
            Self::Day => Duration::days(1),
            Self::Week => Duration::days(7),
            Self::Month => Duration::days(30),
        }
    }
}

impl fmt::Display for StatsPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Day => "1d",
            Self::Week => "7d",
            Self::Month => "30d",
        })
    }
}

impl FromStr for StatsPeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "1d" => Ok(Self::Day),
            "7d" => Ok(Self::Week),
            "30d" => Ok(Self::Month),
            other => Err(Error::invalid_argument(format!(
                "Invalid stats period: {other}. Use 1d, 7d or 30d"
            ))),
        }
    }
}

/// Aggregated usage of one provider over a period
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStats {
    /// Provider id
    pub provider_id: String,
    /// Look-back window
    pub period: StatsPeriod,
    /// Events in the window
    pub total_requests: u64,
    /// Successful events
    pub successful_requests: u64,
    /// Failed events
    pub failed_requests: u64,
    /// Average latency in milliseconds
    pub average_latency: f64,
    /// Successful share in percent, 0 when there were no requests
    pub success_rate: f64,
}

impl ProviderStats {
    /// Build statistics from raw event counters
    pub fn from_event_stats(provider_id: &str, period: StatsPeriod, stats: EventStats) -> Self {
        let success_rate = if stats.total > 0 {
            stats.successful as f64 / stats.total as f64 * 100.0
        } else {
            0.0
        };
        Self {
            provider_id: provider_id.to_string(),
            period,
            total_requests: stats.total,
            successful_requests: stats.successful,
            failed_requests: stats.failed,
            average_latency: stats.average_latency_ms,
            success_rate,
        }
    }
}
