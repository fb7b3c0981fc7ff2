//! Composition root
//!
//! Wires crypto, event logging, the provider registry, credential
//! management and the router from an [`AppConfig`]. Adapters are
//! registered on the returned hub afterwards.
//!
//! ```text
//! AppConfig ─┬─> CryptoService ──────────────┐
//!            ├─> IntegrationEventLogger ──┐  ├─> CredentialManager ─> CredentialRotationService
//!            │                            │  │
//!  stores ───┼─> ProviderRegistry         └──┼─> IntegrationRouter <── adapters
//!            └─> HealthEvaluator ─> ProviderScorer
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let store = Arc::new(InMemoryIntegrationStore::new());
//! let hub = init_hub(config, Some(store.clone()), Some(store))?;
//! hub.register_adapter(Arc::new(YoutubeAdapter::new(client)));
//!
//! let response = hub.router().execute(&request, None).await?;
//! ```

use crate::config::AppConfig;
use crate::config::loader::validate_app_config;
use crate::credentials::{CredentialManager, CredentialRotationService};
use crate::crypto::CryptoService;
use crate::events::IntegrationEventLogger;
use crate::registry::ProviderRegistry;
use crate::routing::{HealthEvaluator, IntegrationRouter, ProviderScorer};
use ihub_domain::error::Result;
use ihub_domain::ports::{Clock, EventStore, ProviderAdapter, ProviderStore, SystemClock};
use ihub_providers::persistence::InMemoryIntegrationStore;
use std::sync::Arc;
use tracing::{info, warn};

/// Fully wired Integration Hub services
pub struct IntegrationHub {
    /// Application configuration
    pub config: Arc<AppConfig>,

    clock: Arc<dyn Clock>,
    crypto: Arc<CryptoService>,
    events: IntegrationEventLogger,
    registry: Arc<ProviderRegistry>,
    credentials: Arc<CredentialManager>,
    rotation: Arc<CredentialRotationService>,
    router: Arc<IntegrationRouter>,
}

impl IntegrationHub {
    /// Register a live adapter with the router
    pub fn register_adapter(&self, adapter: Arc<dyn ProviderAdapter>) {
        self.router.register(adapter);
    }

    /// Clock shared by every service
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Credential encryption service
    pub fn crypto(&self) -> Arc<CryptoService> {
        Arc::clone(&self.crypto)
    }

    /// Event logger
    pub fn events(&self) -> &IntegrationEventLogger {
        &self.events
    }

    /// Provider catalog
    pub fn registry(&self) -> Arc<ProviderRegistry> {
        Arc::clone(&self.registry)
    }

    /// Credential manager
    pub fn credentials(&self) -> Arc<CredentialManager> {
        Arc::clone(&self.credentials)
    }

    /// Batch credential rotation
    pub fn rotation(&self) -> Arc<CredentialRotationService> {
        Arc::clone(&self.rotation)
    }

    /// Provider router
    pub fn router(&self) -> Arc<IntegrationRouter> {
        Arc::clone(&self.router)
    }
}

impl std::fmt::Debug for IntegrationHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntegrationHub")
            .field("router", &self.router)
            .field("persistent_events", &self.events.is_persistent())
            .finish_non_exhaustive()
    }
}

/// Build an [`IntegrationHub`] on the system clock
///
/// Without a provider store an in-memory one is used, so registry and
/// credential data only live as long as the process.
pub fn init_hub(
    config: AppConfig,
    provider_store: Option<Arc<dyn ProviderStore>>,
    event_store: Option<Arc<dyn EventStore>>,
) -> Result<IntegrationHub> {
    init_hub_with_clock(config, provider_store, event_store, Arc::new(SystemClock))
}

/// Build an [`IntegrationHub`] on an explicit clock
pub fn init_hub_with_clock(
    config: AppConfig,
    provider_store: Option<Arc<dyn ProviderStore>>,
    event_store: Option<Arc<dyn EventStore>>,
    clock: Arc<dyn Clock>,
) -> Result<IntegrationHub> {
    validate_app_config(&config)?;

    let provider_store = provider_store.unwrap_or_else(|| {
        warn!("No provider store supplied, using a process-local in-memory store");
        let store: Arc<dyn ProviderStore> = Arc::new(InMemoryIntegrationStore::new());
        store
    });
    if event_store.is_none() {
        warn!("No event store supplied, integration events will not be persisted");
    }

    let crypto = Arc::new(CryptoService::from_config(&config.crypto)?);
    let events = IntegrationEventLogger::new(event_store.clone(), Arc::clone(&clock));

    let registry = Arc::new(ProviderRegistry::new(
        Arc::clone(&provider_store),
        crypto.clone(),
        event_store.clone(),
        Arc::clone(&clock),
    ));
    let credentials = Arc::new(CredentialManager::new(
        Arc::clone(&provider_store),
        crypto.clone(),
        Arc::clone(&clock),
    ));
    let rotation = Arc::new(CredentialRotationService::new(
        Arc::clone(&credentials),
        Arc::clone(&provider_store),
        Arc::clone(&clock),
    ));

    let health = Arc::new(HealthEvaluator::new(
        Some(Arc::clone(&provider_store)),
        event_store,
        Arc::clone(&clock),
        config.routing.clone(),
    ));
    let scorer = ProviderScorer::new(Some(provider_store), health);
    let router = Arc::new(
        IntegrationRouter::new(scorer, events.clone())
            .with_default_parallel_count(config.routing.default_parallel_count),
    );

    info!("Integration hub initialized");

    Ok(IntegrationHub {
        config: Arc::new(config),
        clock,
        crypto,
        events,
        registry,
        credentials,
        rotation,
        router,
    })
}
