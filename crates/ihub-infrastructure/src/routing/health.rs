//! Provider health evaluation
//!
//! Health combines the status stored on the provider row with the number of
//! failed events in a sliding window. Results are cached per provider for
//! the configured TTL.

use crate::cache::TtlCache;
use crate::config::RoutingConfig;
use ihub_domain::entities::EventFilter;
use ihub_domain::error::Result;
use ihub_domain::ports::{Clock, EventStore, ProviderStore};
use ihub_domain::value_objects::ProviderHealth;
use std::sync::Arc;
use tracing::{debug, warn};

/// Computes and caches provider health
pub struct HealthEvaluator {
    provider_store: Option<Arc<dyn ProviderStore>>,
    event_store: Option<Arc<dyn EventStore>>,
    cache: TtlCache<String, ProviderHealth>,
    clock: Arc<dyn Clock>,
    config: RoutingConfig,
}

impl HealthEvaluator {
    /// Create an evaluator
    pub fn new(
        provider_store: Option<Arc<dyn ProviderStore>>,
        event_store: Option<Arc<dyn EventStore>>,
        clock: Arc<dyn Clock>,
        config: RoutingConfig,
    ) -> Self {
        Self {
            provider_store,
            event_store,
            cache: TtlCache::new(config.health_cache_ttl(), Arc::clone(&clock)),
            clock,
            config,
        }
    }

    /// Current health of a provider
    ///
    /// Never fails: read errors degrade to `Healthy` so a flaky store cannot
    /// take every provider out of rotation. Only fully evaluated results are
    /// cached.
    pub async fn provider_health(&self, provider_id: &str) -> ProviderHealth {
        if let Some(health) = self.cache.get(&provider_id.to_string()) {
            return health;
        }

        let Some(provider_store) = &self.provider_store else {
            return ProviderHealth::Healthy;
        };

        match self.evaluate(provider_store.as_ref(), provider_id).await {
            Ok(Some(health)) => {
                self.cache.insert(provider_id.to_string(), health);
                health
            }
            Ok(None) => {
                debug!(provider_id, "Provider row missing, treating as unhealthy");
                ProviderHealth::Unhealthy
            }
            Err(e) => {
                warn!(provider_id, error = %e, "Health evaluation failed, assuming healthy");
                ProviderHealth::Healthy
            }
        }
    }

    /// Failed events inside the error window; 0 when unknown
    pub async fn recent_errors(&self, provider_id: &str) -> u64 {
        match self.count_recent_errors(provider_id).await {
            Ok(count) => count,
            Err(e) => {
                warn!(provider_id, error = %e, "Failed to count recent errors");
                0
            }
        }
    }

    /// Drop the cached health of one provider
    pub fn invalidate(&self, provider_id: &str) {
        self.cache.invalidate(&provider_id.to_string());
    }

    /// Drop every cached health value
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// `None` when the provider row does not exist
    async fn evaluate(
        &self,
        provider_store: &dyn ProviderStore,
        provider_id: &str,
    ) -> Result<Option<ProviderHealth>> {
        let Some(record) = provider_store.find_provider(provider_id).await? else {
            return Ok(None);
        };

        let mut health = ProviderHealth::from(record.config.health_status);
        let errors = self.count_recent_errors(provider_id).await?;
        if errors > self.config.unhealthy_error_threshold {
            health = ProviderHealth::Unhealthy;
        } else if errors > self.config.degraded_error_threshold {
            health = health.at_least_degraded();
        }
        Ok(Some(health))
    }

    async fn count_recent_errors(&self, provider_id: &str) -> Result<u64> {
        let Some(event_store) = &self.event_store else {
            return Ok(0);
        };
        let since = self.clock.now() - self.config.error_window();
        event_store
            .count_events(&EventFilter::failures_since(provider_id, since))
            .await
    }
}

impl std::fmt::Debug for HealthEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthEvaluator")
            .field("cached", &self.cache.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
