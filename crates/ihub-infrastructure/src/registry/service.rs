//! Provider registry
//!
//! Canonical catalog of providers: listing, administrative upsert, soft
//! delete, health and weight setters, the legacy single-credential and
//! config accessors, and usage statistics.

use super::stats::{ProviderStats, StatsPeriod};
use crate::credentials::stored_plaintext;
use ihub_domain::constants::LEGACY_CREDENTIAL_SLOT;
use ihub_domain::entities::{
    CredentialEntry, CredentialId, EventStats, LegacyCredential, LegacyWeights, ProviderRecord, RoutingWeight,
    StoredHealthStatus,
};
use ihub_domain::error::{Error, Result};
use ihub_domain::ports::{Clock, CryptoProvider, EventStore, ProviderStore};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, warn};

/// Credential type recorded on entries written by the legacy accessor
const LEGACY_CREDENTIAL_TYPE: &str = "legacy";

/// Simplified provider configuration view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyProviderConfig {
    /// Provider id
    pub id: String,
    /// Provider id, repeated for older clients
    pub provider_id: String,
    /// Request defaults
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Map<String, Value>>,
    /// Quality/speed/cost weights
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weights: Option<LegacyWeights>,
    /// Soft-delete flag
    pub is_active: bool,
}

impl LegacyProviderConfig {
    fn from_record(record: &ProviderRecord) -> Self {
        Self {
            id: record.id.clone(),
            provider_id: record.id.clone(),
            defaults: record.config.defaults.clone(),
            weights: record.config.weights,
            is_active: record.is_active,
        }
    }
}

/// Fields replaced by [`ProviderRegistry::set_config`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderConfigUpdate {
    /// Replacement request defaults
    pub defaults: Option<Map<String, Value>>,
    /// Replacement weights
    pub weights: Option<LegacyWeights>,
    /// Replacement soft-delete flag
    pub is_active: Option<bool>,
}

/// Provider catalog service
pub struct ProviderRegistry {
    store: Arc<dyn ProviderStore>,
    crypto: Arc<dyn CryptoProvider>,
    events: Option<Arc<dyn EventStore>>,
    clock: Arc<dyn Clock>,
}

impl ProviderRegistry {
    /// Create a registry
    pub fn new(
        store: Arc<dyn ProviderStore>,
        crypto: Arc<dyn CryptoProvider>,
        events: Option<Arc<dyn EventStore>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            crypto,
            events,
            clock,
        }
    }

    /// Every provider row, active or not
    pub async fn list_providers(&self) -> Result<Vec<ProviderRecord>> {
        self.store.list_providers().await
    }

    /// One provider row
    pub async fn get_provider(&self, provider_id: &str) -> Result<Option<ProviderRecord>> {
        self.store.find_provider(provider_id).await
    }

    /// Create or update a provider by id
    ///
    /// Creation yields an active provider of type `unknown` with no
    /// credentials. An update only changes the name and the advertised
    /// capabilities. Ids containing `_` are rejected.
    pub async fn upsert_provider(
        &self,
        provider_id: &str,
        name: &str,
        capabilities: Vec<String>,
    ) -> Result<ProviderRecord> {
        CredentialId::validate_provider_id(provider_id)?;
        let now = self.clock.now();
        let record = match self.store.find_provider(provider_id).await? {
            Some(mut record) => {
                record.name = name.to_string();
                record.config.capabilities = capabilities;
                record.touch(now);
                record
            }
            None => {
                info!(provider_id, name, "Creating provider");
                ProviderRecord::new(provider_id, name, now).with_capabilities(capabilities)
            }
        };
        self.store.save_provider(&record).await?;
        Ok(record)
    }

    /// Soft-delete a provider
    pub async fn deactivate_provider(&self, provider_id: &str) -> Result<()> {
        self.modify(provider_id, |record| record.is_active = false)
            .await?;
        info!(provider_id, "Deactivated provider");
        Ok(())
    }

    /// Store the health status computed by an out-of-band evaluator
    ///
    /// Routers pick the new status up once their cached value expires.
    pub async fn set_health_status(
        &self,
        provider_id: &str,
        status: StoredHealthStatus,
    ) -> Result<()> {
        self.modify(provider_id, |record| record.config.health_status = status)
            .await?;
        info!(provider_id, %status, "Updated provider health status");
        Ok(())
    }

    /// Set or clear the routing weight
    pub async fn set_routing_weight(
        &self,
        provider_id: &str,
        routing: Option<RoutingWeight>,
    ) -> Result<()> {
        if let Some(weight) = routing
            && weight.effective().is_none()
        {
            return Err(Error::invalid_argument(format!(
                "Routing weight must be positive and finite: {weight:?}"
            )));
        }
        self.modify(provider_id, |record| record.config.routing = routing)
            .await
            .map(|_| ())
    }

    // ========================================================================
    // Legacy accessors
    // ========================================================================

    /// Credentials in the single-slot legacy shape
    ///
    /// Reads the `default` slot, or the first entry when there is none.
    /// The slot is decoded like any credential entry, so it stays readable
    /// after rotation re-encrypts it. Returns `None` when the provider is
    /// missing or the slot does not hold a JSON object; a ciphertext that
    /// fails to decrypt is an error.
    pub async fn get_legacy_credentials(
        &self,
        provider_id: &str,
    ) -> Result<Option<LegacyCredential>> {
        let Some(record) = self.store.find_provider(provider_id).await? else {
            return Ok(None);
        };
        let entry = record
            .credentials
            .get(LEGACY_CREDENTIAL_SLOT)
            .or_else(|| record.credentials.iter().next().map(|(_, entry)| entry));

        let Some(entry) = entry else {
            return Ok(None);
        };
        let plaintext = stored_plaintext(self.crypto.as_ref(), &entry.data)?;
        Ok(match serde_json::from_str::<Value>(&plaintext) {
            Ok(value @ Value::Object(_)) => serde_json::from_value(value).ok(),
            _ => None,
        })
    }

    /// Write the legacy `default` credential slot
    ///
    /// Secret fields must already be encrypted by the caller.
    pub async fn set_legacy_credentials(
        &self,
        provider_id: &str,
        credentials: &LegacyCredential,
    ) -> Result<()> {
        let data = serde_json::to_string(credentials)?;
        let now = self.clock.now();
        self.modify(provider_id, |record| {
            let created_at = record
                .credentials
                .get(LEGACY_CREDENTIAL_SLOT)
                .map_or(now, |existing| existing.created_at);
            record.credentials.insert(
                LEGACY_CREDENTIAL_SLOT,
                CredentialEntry {
                    credential_type: LEGACY_CREDENTIAL_TYPE.to_string(),
                    data,
                    user_id: None,
                    expires_at: None,
                    created_at,
                    updated_at: Some(now),
                },
            );
        })
        .await
        .map(|_| ())
    }

    /// Simplified configuration view
    pub async fn get_config(&self, provider_id: &str) -> Result<Option<LegacyProviderConfig>> {
        Ok(self
            .store
            .find_provider(provider_id)
            .await?
            .as_ref()
            .map(LegacyProviderConfig::from_record))
    }

    /// Replace the given legacy configuration fields
    pub async fn set_config(
        &self,
        provider_id: &str,
        update: ProviderConfigUpdate,
    ) -> Result<LegacyProviderConfig> {
        let record = self
            .modify(provider_id, |record| {
                if let Some(defaults) = update.defaults {
                    record.config.defaults = Some(defaults);
                }
                if let Some(weights) = update.weights {
                    record.config.weights = Some(weights);
                }
                if let Some(is_active) = update.is_active {
                    record.is_active = is_active;
                }
            })
            .await?;
        Ok(LegacyProviderConfig::from_record(&record))
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Usage statistics over a period
    ///
    /// Without an event store the statistics are all zero.
    pub async fn provider_stats(
        &self,
        provider_id: &str,
        period: StatsPeriod,
    ) -> Result<ProviderStats> {
        let stats = match &self.events {
            Some(events) => {
                let since = self.clock.now() - period.duration();
                events.event_stats(provider_id, since).await?
            }
            None => {
                warn!(provider_id, "No event store configured, returning empty stats");
                EventStats::default()
            }
        };
        Ok(ProviderStats::from_event_stats(provider_id, period, stats))
    }

    /// Load, mutate and save a provider record
    async fn modify<F>(&self, provider_id: &str, change: F) -> Result<ProviderRecord>
    where
        F: FnOnce(&mut ProviderRecord),
    {
        let mut record = self
            .store
            .find_provider(provider_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("Provider {provider_id}")))?;
        change(&mut record);
        record.touch(self.clock.now());
        self.store.save_provider(&record).await?;
        Ok(record)
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("has_event_store", &self.events.is_some())
            .finish_non_exhaustive()
    }
}
