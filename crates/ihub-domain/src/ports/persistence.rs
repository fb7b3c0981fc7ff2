//! Persistence Ports
//!
//! Boundary to whatever database holds provider records and integration
//! events. Both ports are optional collaborators: consumers degrade to
//! defaults when they are absent.

use crate::entities::{EventFilter, EventStats, IntegrationEvent, ProviderRecord};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Provider record storage
#[async_trait]
pub trait ProviderStore: Send + Sync {
    /// Load one provider row
    async fn find_provider(&self, id: &str) -> Result<Option<ProviderRecord>>;

    /// Load every provider row, active or not, ordered by name
    async fn list_providers(&self) -> Result<Vec<ProviderRecord>>;

    /// Insert or replace a whole provider row
    async fn save_provider(&self, record: &ProviderRecord) -> Result<()>;
}

/// Append-only integration event storage
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Append one event
    async fn append_event(&self, event: IntegrationEvent) -> Result<()>;

    /// Count events matching a filter
    async fn count_events(&self, filter: &EventFilter) -> Result<u64>;

    /// Aggregate the events of one provider created at or after `since`
    async fn event_stats(&self, provider_id: &str, since: DateTime<Utc>) -> Result<EventStats>;
}
