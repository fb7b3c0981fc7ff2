//! Integration event logger
//!
//! Records one event per execution attempt. Logging is best-effort: a
//! missing store or a store failure never reaches the caller.

use crate::constants::{EVENT_META_CAUSES, EVENT_META_ERROR};
use crate::error_ext::error_chain;
use ihub_domain::entities::{EventStatus, IntegrationEvent};
use ihub_domain::ports::{Clock, EventStore};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

/// Optional attributes of a logged event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventDetails {
    /// Attempt latency
    pub latency_ms: Option<u64>,
    /// Attempt cost
    pub cost: Option<f64>,
    /// Caller metadata
    pub metadata: Map<String, Value>,
}

impl EventDetails {
    /// Empty details
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the latency
    #[must_use]
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = Some(latency_ms);
        self
    }

    /// Set the cost
    #[must_use]
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Add one metadata entry
    #[must_use]
    pub fn with_meta<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Best-effort recorder of integration events
#[derive(Clone)]
pub struct IntegrationEventLogger {
    store: Option<Arc<dyn EventStore>>,
    clock: Arc<dyn Clock>,
}

impl IntegrationEventLogger {
    /// Create a logger; without a store events are only traced
    pub fn new(store: Option<Arc<dyn EventStore>>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// True if events are persisted
    pub fn is_persistent(&self) -> bool {
        self.store.is_some()
    }

    /// Record one event, swallowing any persistence failure
    pub async fn log_event(
        &self,
        provider_id: &str,
        event_type: &str,
        status: EventStatus,
        details: EventDetails,
    ) {
        let Some(store) = &self.store else {
            debug!(
                provider_id,
                event_type,
                %status,
                latency_ms = details.latency_ms,
                "Integration event (no event store configured)"
            );
            return;
        };

        let event = IntegrationEvent {
            id: Uuid::new_v4(),
            provider_id: provider_id.to_string(),
            event_type: event_type.to_string(),
            status,
            latency_ms: details.latency_ms,
            cost: details.cost,
            metadata: details.metadata,
            created_at: self.clock.now(),
        };

        if let Err(e) = store.append_event(event).await {
            error!(provider_id, event_type, error = %e, "Failed to log integration event");
        }
    }

    /// Record a successful attempt
    pub async fn log_success(&self, provider_id: &str, event_type: &str, details: EventDetails) {
        self.log_event(provider_id, event_type, EventStatus::Success, details)
            .await;
    }

    /// Record a failed attempt
    ///
    /// The error message goes under `error` and its source chain, when
    /// present, under `causes`. Caller metadata is merged afterwards and
    /// wins on key collisions. The error must be `Sync` because it is held
    /// across the store write inside `Send` router futures.
    pub async fn log_failure(
        &self,
        provider_id: &str,
        event_type: &str,
        failure: &(dyn std::error::Error + Send + Sync + 'static),
        details: EventDetails,
    ) {
        let mut metadata = Map::new();
        metadata.insert(EVENT_META_ERROR.to_string(), Value::from(failure.to_string()));
        let causes = error_chain(failure);
        if !causes.is_empty() {
            metadata.insert(EVENT_META_CAUSES.to_string(), Value::from(causes));
        }
        metadata.extend(details.metadata);

        let details = EventDetails {
            metadata,
            ..details
        };
        self.log_event(provider_id, event_type, EventStatus::Failed, details)
            .await;
    }
}

impl std::fmt::Debug for IntegrationEventLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntegrationEventLogger")
            .field("persistent", &self.is_persistent())
            .finish()
    }
}
