//! Unit tests for port defaults and helpers

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use ihub_domain::Result;
use ihub_domain::ports::{AdapterStatus, Clock, ManualClock, ProviderAdapter};
use ihub_domain::value_objects::{Capability, IntegrationRequest, IntegrationResponse};

struct EchoAdapter;

#[async_trait]
impl ProviderAdapter for EchoAdapter {
    fn id(&self) -> &str {
        "echo"
    }

    fn name(&self) -> &str {
        "Echo"
    }

    fn capabilities(&self) -> Vec<Capability> {
        vec![Capability::Content]
    }

    fn supports(&self, _operation: &str, capability: &Capability) -> bool {
        *capability == Capability::Content
    }

    async fn execute(&self, request: &IntegrationRequest) -> Result<IntegrationResponse> {
        Ok(IntegrationResponse::new(
            "echo",
            request.operation.clone(),
            serde_json::Value::Object(request.payload.clone()),
        ))
    }
}

#[tokio::test]
async fn test_adapter_defaults() {
    let adapter = EchoAdapter;
    assert_eq!(adapter.health_check().await, None);

    let info = adapter.info();
    assert_eq!(info.id, "echo");
    assert_eq!(info.capabilities, vec![Capability::Content]);
    assert_eq!(info.status, AdapterStatus::Active);
}

#[test]
fn test_manual_clock() {
    let start = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    let clock = ManualClock::new(start);
    assert_eq!(clock.now(), start);

    clock.advance(Duration::seconds(61));
    assert_eq!(clock.now(), start + Duration::seconds(61));

    clock.set(start);
    assert_eq!(clock.now(), start);
}
