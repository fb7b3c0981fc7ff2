//! Unit tests for persisted entities

use chrono::{Duration, TimeZone, Utc};
use ihub_domain::entities::{
    CredentialEntry, CredentialId, CredentialMap, EventFilter, EventStatus, IntegrationEvent,
    ProviderRecord, RoutingWeight, StoredHealthStatus,
};
use serde_json::{Map, json};
use uuid::Uuid;

fn entry(expires_in: Option<Duration>) -> CredentialEntry {
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    CredentialEntry {
        credential_type: "oauth".to_string(),
        data: "{}".to_string(),
        user_id: None,
        expires_at: expires_in.map(|d| now + d),
        created_at: now,
        updated_at: None,
    }
}

#[test]
fn test_new_provider_defaults() {
    let now = Utc::now();
    let record = ProviderRecord::new("youtube", "YouTube", now);

    assert_eq!(record.provider_type, "unknown");
    assert!(record.is_active);
    assert!(record.credentials.is_empty());
    assert_eq!(record.config.health_status, StoredHealthStatus::Unknown);
    assert_eq!(record.created_at, record.updated_at);
}

#[test]
fn test_provider_record_wire_shape() {
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let record = ProviderRecord::new("ozon", "Ozon", now)
        .with_type("marketplace")
        .with_capabilities(["analytics", "upload"])
        .with_routing(RoutingWeight::Priority(2.0))
        .with_health_status(StoredHealthStatus::Outage);

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["type"], "marketplace");
    assert_eq!(value["isActive"], true);
    assert_eq!(value["config"]["healthStatus"], "OUTAGE");
    assert_eq!(value["config"]["routing"], json!({ "priority": 2.0 }));
    assert_eq!(value["config"]["capabilities"], json!(["analytics", "upload"]));

    let back: ProviderRecord = serde_json::from_value(value).unwrap();
    assert_eq!(back, record);
}

#[test]
fn test_credential_expiry_is_inclusive() {
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    assert!(entry(Some(Duration::zero())).is_expired(now));
    assert!(entry(Some(Duration::seconds(-1))).is_expired(now));
    assert!(!entry(Some(Duration::seconds(1))).is_expired(now));
    assert!(!entry(None).is_expired(now));
}

#[test]
fn test_credential_map_is_transparent() {
    let mut map = CredentialMap::default();
    map.insert(CredentialMap::key_for("oauth", Some("u1")), entry(None));

    let value = serde_json::to_value(&map).unwrap();
    assert!(value.get("oauth_u1").is_some());
    assert_eq!(value["oauth_u1"]["type"], "oauth");
}

#[test]
fn test_credential_id_serde() {
    let id: CredentialId = serde_json::from_value(json!("youtube_api_key_default")).unwrap();
    assert_eq!(id.provider_id(), "youtube");
    assert_eq!(id.key(), "api_key_default");
    assert!(serde_json::from_value::<CredentialId>(json!("nounderscore")).is_err());
}

#[test]
fn test_event_filter_matches() {
    let now = Utc::now();
    let event = IntegrationEvent {
        id: Uuid::new_v4(),
        provider_id: "a".to_string(),
        event_type: "getStats".to_string(),
        status: EventStatus::Failed,
        latency_ms: Some(12),
        cost: None,
        metadata: Map::new(),
        created_at: now,
    };

    assert!(EventFilter::failures_since("a", now - Duration::hours(1)).matches(&event));
    assert!(!EventFilter::failures_since("b", now - Duration::hours(1)).matches(&event));
    assert!(!EventFilter::failures_since("a", now + Duration::seconds(1)).matches(&event));

    let successes = EventFilter {
        provider_id: "a".to_string(),
        status: Some(EventStatus::Success),
        since: now - Duration::hours(1),
    };
    assert!(!successes.matches(&event));
}
