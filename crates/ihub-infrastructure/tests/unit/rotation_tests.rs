//! Credential rotation service tests

use crate::test_utils::{manual_clock, test_crypto};
use chrono::Duration;
use ihub_domain::entities::ProviderRecord;
use ihub_domain::ports::{Clock, ManualClock, ProviderStore};
use ihub_infrastructure::credentials::{
    CredentialManager, CredentialRotationService, NewCredential,
};
use ihub_providers::persistence::InMemoryIntegrationStore;
use serde_json::{Map, json};
use std::sync::Arc;

struct Fixture {
    store: Arc<InMemoryIntegrationStore>,
    clock: Arc<ManualClock>,
    manager: Arc<CredentialManager>,
    rotation: CredentialRotationService,
}

fn fixture(providers: Vec<ProviderRecord>) -> Fixture {
    let clock = manual_clock();
    let store = Arc::new(InMemoryIntegrationStore::with_providers(providers));
    let manager = Arc::new(CredentialManager::new(
        store.clone(),
        test_crypto(),
        clock.clone(),
    ));
    let rotation = CredentialRotationService::new(manager.clone(), store.clone(), clock.clone());
    Fixture {
        store,
        clock,
        manager,
        rotation,
    }
}

fn data() -> Map<String, serde_json::Value> {
    let mut data = Map::new();
    data.insert("token".to_string(), json!("t"));
    data
}

#[tokio::test]
async fn test_rotate_provider_report() {
    let now = manual_clock().now();
    let f = fixture(vec![ProviderRecord::new("ozon", "Ozon", now)]);
    for user in ["a", "b"] {
        f.manager
            .create_credential("ozon", NewCredential::new("api_key", data()).for_user(user))
            .await
            .unwrap();
    }

    let report = f.rotation.rotate_provider("ozon").await.unwrap();
    assert_eq!(report.provider_id, "ozon");
    assert_eq!((report.total, report.rotated, report.failed), (2, 2, 0));
    assert!(report.error.is_none());

    assert!(f.rotation.rotate_provider("ghost").await.is_err());
}

#[tokio::test]
async fn test_rotation_only_changes_ciphertext_and_update_time() {
    let now = manual_clock().now();
    let f = fixture(vec![ProviderRecord::new("ozon", "Ozon", now)]);
    let created = f
        .manager
        .create_credential(
            "ozon",
            NewCredential::new("oauth", data())
                .for_user("u-7")
                .expiring_at(now + Duration::days(30)),
        )
        .await
        .unwrap();
    let before = f
        .store
        .find_provider("ozon")
        .await
        .unwrap()
        .unwrap()
        .credentials
        .get("oauth_u-7")
        .unwrap()
        .clone();

    f.clock.advance(Duration::hours(2));
    f.rotation.rotate_provider("ozon").await.unwrap();

    let after = f
        .store
        .find_provider("ozon")
        .await
        .unwrap()
        .unwrap()
        .credentials
        .get("oauth_u-7")
        .unwrap()
        .clone();
    assert_eq!(after.credential_type, before.credential_type);
    assert_eq!(after.user_id, before.user_id);
    assert_eq!(after.expires_at, before.expires_at);
    assert_eq!(after.created_at, before.created_at);
    assert_ne!(after.data, before.data);
    assert_eq!(after.updated_at, Some(f.clock.now()));

    let rotated = f
        .manager
        .get_credential("ozon_oauth_u-7")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(rotated.id, created.id);
    assert_eq!(rotated.data, data());
    assert_eq!(rotated.user_id.as_deref(), Some("u-7"));
}

#[tokio::test]
async fn test_rotate_all_skips_inactive_and_empty() {
    let now = manual_clock().now();
    let mut inactive = ProviderRecord::new("old", "Old", now);
    inactive.is_active = false;
    let f = fixture(vec![
        ProviderRecord::new("ozon", "Ozon", now),
        ProviderRecord::new("empty", "Empty", now),
        inactive,
    ]);
    f.manager
        .create_credential("ozon", NewCredential::new("api_key", data()))
        .await
        .unwrap();
    f.manager
        .create_credential("old", NewCredential::new("api_key", data()))
        .await
        .unwrap();

    let summary = f.rotation.rotate_all().await.unwrap();
    assert_eq!(summary.total_providers, 1);
    assert_eq!(summary.total_rotated, 1);
    assert_eq!(summary.total_failed, 0);
    assert_eq!(summary.reports[0].provider_id, "ozon");
}

#[tokio::test]
async fn test_rotate_expired_only() {
    let now = manual_clock().now();
    let f = fixture(vec![
        ProviderRecord::new("fresh", "Fresh", now),
        ProviderRecord::new("stale", "Stale", now),
    ]);
    f.manager
        .create_credential(
            "fresh",
            NewCredential::new("oauth", data()).expiring_at(now + Duration::days(30)),
        )
        .await
        .unwrap();
    f.manager
        .create_credential(
            "stale",
            NewCredential::new("oauth", data()).expiring_at(now + Duration::hours(1)),
        )
        .await
        .unwrap();

    f.clock.advance(Duration::hours(2));
    let summary = f.rotation.rotate_expired().await.unwrap();
    assert_eq!(summary.total_providers, 1);
    assert_eq!(summary.reports[0].provider_id, "stale");
}

#[tokio::test]
async fn test_listing_failure_propagates() {
    let now = manual_clock().now();
    let f = fixture(vec![ProviderRecord::new("ozon", "Ozon", now)]);
    f.store.set_failing(true);
    assert!(f.rotation.rotate_all().await.is_err());
}
