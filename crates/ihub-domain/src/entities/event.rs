//! Integration events
//!
//! One event is written per router execution attempt. Events are immutable
//! and only ever read back in aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Outcome of a single execution attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    /// The adapter returned a response
    Success,
    /// The adapter returned an error
    Failed,
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        })
    }
}

/// Persisted integration event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationEvent {
    /// Event identifier
    pub id: Uuid,
    /// Provider that handled the attempt
    pub provider_id: String,
    /// Event type, usually the operation name
    #[serde(rename = "type")]
    pub event_type: String,
    /// Outcome
    pub status: EventStatus,
    /// Attempt latency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    /// Attempt cost in provider units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    /// Free-form metadata (capability, request id, error details)
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Creation instant
    pub created_at: DateTime<Utc>,
}

/// Filter for counting events
#[derive(Debug, Clone, PartialEq)]
pub struct EventFilter {
    /// Provider to count events for
    pub provider_id: String,
    /// Restrict to one status
    pub status: Option<EventStatus>,
    /// Only events created at or after this instant
    pub since: DateTime<Utc>,
}

impl EventFilter {
    /// Failed events of a provider since an instant
    pub fn failures_since<S: Into<String>>(provider_id: S, since: DateTime<Utc>) -> Self {
        Self {
            provider_id: provider_id.into(),
            status: Some(EventStatus::Failed),
            since,
        }
    }

    /// True if `event` matches this filter
    pub fn matches(&self, event: &IntegrationEvent) -> bool {
        event.provider_id == self.provider_id
            && self.status.is_none_or(|status| event.status == status)
            && event.created_at >= self.since
    }
}

/// Aggregate counters over a window of events
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStats {
    /// Number of events
    pub total: u64,
    /// Number of successful events
    pub successful: u64,
    /// Number of failed events
    pub failed: u64,
    /// Average latency of events that recorded one
    pub average_latency_ms: f64,
}
