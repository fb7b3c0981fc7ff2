//! In-memory provider and event store
//!
//! Provides a process-local storage backend for development and testing.
//! Data is not persisted and will be lost on restart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use ihub_domain::entities::{EventFilter, EventStats, EventStatus, IntegrationEvent, ProviderRecord};
use ihub_domain::error::{Error, Result};
use ihub_domain::ports::{EventStore, ProviderStore};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// In-memory implementation of both persistence ports
///
/// Provider rows live in a concurrent map, events in an append-only list.
/// The store can be switched into a failing mode where every call returns
/// a persistence error, which is how fallback paths are exercised.
#[derive(Default)]
pub struct InMemoryIntegrationStore {
    providers: Arc<DashMap<String, ProviderRecord>>,
    events: Arc<RwLock<Vec<IntegrationEvent>>>,
    failing: AtomicBool,
    provider_reads: AtomicUsize,
}

impl InMemoryIntegrationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with provider rows
    pub fn with_providers<I: IntoIterator<Item = ProviderRecord>>(providers: I) -> Self {
        let store = Self::new();
        for record in providers {
            store.providers.insert(record.id.clone(), record);
        }
        store
    }

    /// Make every subsequent call fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
        debug!(failing, "In-memory store failure mode changed");
    }

    /// Number of `find_provider` calls served so far
    pub fn provider_reads(&self) -> usize {
        self.provider_reads.load(Ordering::SeqCst)
    }

    /// Snapshot of every stored event in append order
    pub async fn events(&self) -> Vec<IntegrationEvent> {
        self.events.read().await.clone()
    }

    fn check_available(&self, operation: &str) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            warn!(operation, "In-memory store rejecting call");
            return Err(Error::persistence(format!(
                "In-memory store unavailable during {operation}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ProviderStore for InMemoryIntegrationStore {
    async fn find_provider(&self, id: &str) -> Result<Option<ProviderRecord>> {
        self.provider_reads.fetch_add(1, Ordering::SeqCst);
        self.check_available("find_provider")?;
        Ok(self.providers.get(id).map(|entry| entry.value().clone()))
    }

    async fn list_providers(&self) -> Result<Vec<ProviderRecord>> {
        self.check_available("list_providers")?;
        let mut records: Vec<ProviderRecord> = self
            .providers
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    async fn save_provider(&self, record: &ProviderRecord) -> Result<()> {
        self.check_available("save_provider")?;
        self.providers.insert(record.id.clone(), record.clone());
        debug!(provider_id = %record.id, "Saved provider record");
        Ok(())
    }
}

#[async_trait]
impl EventStore for InMemoryIntegrationStore {
    async fn append_event(&self, event: IntegrationEvent) -> Result<()> {
        self.check_available("append_event")?;
        let mut events = self.events.write().await;
        events.push(event);
        debug!(total = events.len(), "Appended integration event");
        Ok(())
    }

    async fn count_events(&self, filter: &EventFilter) -> Result<u64> {
        self.check_available("count_events")?;
        let events = self.events.read().await;
        Ok(events.iter().filter(|event| filter.matches(event)).count() as u64)
    }

    async fn event_stats(&self, provider_id: &str, since: DateTime<Utc>) -> Result<EventStats> {
        self.check_available("event_stats")?;
        let events = self.events.read().await;

        let mut stats = EventStats::default();
        let mut latency_total = 0u64;
        let mut latency_samples = 0u64;
        for event in events
            .iter()
            .filter(|event| event.provider_id == provider_id && event.created_at >= since)
        {
            stats.total += 1;
            match event.status {
                EventStatus::Success => stats.successful += 1,
                EventStatus::Failed => stats.failed += 1,
            }
            if let Some(latency) = event.latency_ms {
                latency_total += latency;
                latency_samples += 1;
            }
        }
        if latency_samples > 0 {
            stats.average_latency_ms = latency_total as f64 / latency_samples as f64;
        }
        Ok(stats)
    }
}
