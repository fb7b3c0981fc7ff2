//! Test utilities for ihub-application tests
//!
//! Sync tests drive the real router from `ihub-infrastructure` with a
//! recording adapter registered on it.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use ihub_application::DataSyncService;
use ihub_domain::error::{Error, Result};
use ihub_domain::ports::{IntegrationExecutor, ManualClock, ProviderAdapter};
use ihub_domain::value_objects::{Capability, IntegrationRequest, IntegrationResponse};
use ihub_infrastructure::IntegrationHub;
use ihub_infrastructure::bootstrap::init_hub_with_clock;
use ihub_infrastructure::config::ConfigBuilder;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

const TEST_KEY_HEX: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

/// Adapter that answers with fixed data and remembers every request
pub struct RecordingAdapter {
    id: String,
    data: Value,
    failing: AtomicBool,
    requests: Mutex<Vec<IntegrationRequest>>,
}

impl RecordingAdapter {
    /// Adapter serving analytics and upload with `data`
    pub fn new(id: &str, data: Value) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            data,
            failing: AtomicBool::new(false),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Make every following call fail
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<IntegrationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderAdapter for RecordingAdapter {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> Vec<Capability> {
        vec![Capability::Analytics, Capability::Upload]
    }

    fn supports(&self, _operation: &str, capability: &Capability) -> bool {
        self.capabilities().contains(capability)
    }

    async fn execute(&self, request: &IntegrationRequest) -> Result<IntegrationResponse> {
        self.requests.lock().unwrap().push(request.clone());
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::provider(self.id.clone(), "upstream unavailable"));
        }
        Ok(IntegrationResponse::new(
            self.id.clone(),
            request.operation.clone(),
            self.data.clone(),
        ))
    }
}

/// Clock frozen at a known instant
pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap(),
    ))
}

/// Sync service over a hub with `adapter` registered and catalogued
pub async fn sync_service(
    adapter: Arc<RecordingAdapter>,
    clock: Arc<ManualClock>,
) -> (DataSyncService, IntegrationHub) {
    let config = ConfigBuilder::new().with_encryption_key(TEST_KEY_HEX).build();
    let hub = init_hub_with_clock(config, None, None, clock.clone()).unwrap();
    hub.registry()
        .upsert_provider(adapter.id(), adapter.id(), vec!["analytics".to_string()])
        .await
        .unwrap();
    hub.register_adapter(adapter);

    let executor: Arc<dyn IntegrationExecutor> = hub.router();
    (DataSyncService::new(executor, clock), hub)
}
