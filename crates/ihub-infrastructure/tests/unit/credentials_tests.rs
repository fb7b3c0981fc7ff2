//! Credential manager tests

use crate::test_utils::{manual_clock, test_crypto};
use chrono::Duration;
use ihub_domain::entities::{CredentialEntry, ProviderRecord, RotationStatus};
use ihub_domain::ports::{Clock, ManualClock, ProviderStore};
use ihub_infrastructure::credentials::{CredentialManager, CredentialUpdate, NewCredential};
use ihub_infrastructure::crypto::CryptoService;
use ihub_providers::persistence::InMemoryIntegrationStore;
use serde_json::{Map, Value, json};
use std::sync::Arc;

struct Fixture {
    store: Arc<InMemoryIntegrationStore>,
    clock: Arc<ManualClock>,
    manager: CredentialManager,
}

fn fixture() -> Fixture {
    let clock = manual_clock();
    let store = Arc::new(InMemoryIntegrationStore::with_providers([
        ProviderRecord::new("youtube", "YouTube", clock.now()),
    ]));
    let manager = CredentialManager::new(store.clone(), test_crypto(), clock.clone());
    Fixture {
        store,
        clock,
        manager,
    }
}

fn token(value: &str) -> Map<String, Value> {
    let mut data = Map::new();
    data.insert("accessToken".to_string(), json!(value));
    data
}

async fn stored_data(store: &InMemoryIntegrationStore, provider_id: &str, key: &str) -> String {
    store
        .find_provider(provider_id)
        .await
        .unwrap()
        .unwrap()
        .credentials
        .get(key)
        .unwrap()
        .data
        .clone()
}

async fn insert_raw(store: &InMemoryIntegrationStore, provider_id: &str, key: &str, data: &str) {
    let mut record = store.find_provider(provider_id).await.unwrap().unwrap();
    record.credentials.insert(
        key,
        CredentialEntry {
            credential_type: key.split('_').next().unwrap_or(key).to_string(),
            data: data.to_string(),
            user_id: None,
            expires_at: None,
            created_at: record.created_at,
            updated_at: None,
        },
    );
    store.save_provider(&record).await.unwrap();
}

// ============================================================================
// Create / Read
// ============================================================================

/// Test created credentials are stored encrypted and read back decrypted
#[tokio::test]
async fn test_create_and_get() {
    let f = fixture();
    let created = f
        .manager
        .create_credential("youtube", NewCredential::new("oauth", token("t1")).for_user("u1"))
        .await
        .unwrap();
    assert_eq!(created.id.to_string(), "youtube_oauth_u1");
    assert_eq!(created.created_at, f.clock.now());

    let stored = stored_data(&f.store, "youtube", "oauth_u1").await;
    assert!(CryptoService::is_ciphertext(&stored));
    assert!(!stored.contains("t1"));

    let fetched = f.manager.get_credential("youtube_oauth_u1").await.unwrap().unwrap();
    assert_eq!(fetched.data, token("t1"));
    assert_eq!(fetched.user_id.as_deref(), Some("u1"));
}

/// Test a credential without owner uses the default slot
#[tokio::test]
async fn test_default_owner_slot() {
    let f = fixture();
    let created = f
        .manager
        .create_credential("youtube", NewCredential::new("api_key", token("k")))
        .await
        .unwrap();
    assert_eq!(created.id.to_string(), "youtube_api_key_default");
}

/// Test a provider id containing the separator is rejected before any write
#[tokio::test]
async fn test_create_rejects_unresolvable_provider_id() {
    let f = fixture();
    f.store
        .save_provider(&ProviderRecord::new("google_ads", "Google Ads", f.clock.now()))
        .await
        .unwrap();

    let error = f
        .manager
        .create_credential("google_ads", NewCredential::new("oauth", token("t")))
        .await
        .unwrap_err();
    assert!(matches!(error, ihub_domain::error::Error::InvalidArgument { .. }));

    let record = f.store.find_provider("google_ads").await.unwrap().unwrap();
    assert!(record.credentials.is_empty());
}

/// Test creating for an unknown provider fails with not found
#[tokio::test]
async fn test_create_for_missing_provider() {
    let f = fixture();
    let error = f
        .manager
        .create_credential("ghost", NewCredential::new("oauth", token("t")))
        .await
        .unwrap_err();
    assert!(error.is_not_found());
}

/// Test listing filters by user and tolerates a missing provider
#[tokio::test]
async fn test_get_credentials_filters_by_user() {
    let f = fixture();
    for user in ["u1", "u2"] {
        f.manager
            .create_credential("youtube", NewCredential::new("oauth", token(user)).for_user(user))
            .await
            .unwrap();
    }

    assert_eq!(f.manager.get_credentials("youtube", None).await.unwrap().len(), 2);
    let only_u2 = f.manager.get_credentials("youtube", Some("u2")).await.unwrap();
    assert_eq!(only_u2.len(), 1);
    assert_eq!(only_u2[0].data, token("u2"));
    assert!(f.manager.get_credentials("ghost", None).await.unwrap().is_empty());
}

/// Test lookups of unknown or malformed ids yield nothing
#[tokio::test]
async fn test_get_credential_missing() {
    let f = fixture();
    assert!(f.manager.get_credential("nounderscore").await.unwrap().is_none());
    assert!(f.manager.get_credential("ghost_oauth_u1").await.unwrap().is_none());
    assert!(f.manager.get_credential("youtube_oauth_nobody").await.unwrap().is_none());
}

/// Test legacy plain values are readable
#[tokio::test]
async fn test_legacy_plain_values() {
    let f = fixture();
    insert_raw(&f.store, "youtube", "legacy_default", r#"{"clientId":"abc"}"#).await;
    insert_raw(&f.store, "youtube", "raw_default", "not-json").await;

    let object = f.manager.get_credential("youtube_legacy_default").await.unwrap().unwrap();
    assert_eq!(object.data["clientId"], "abc");

    let wrapped = f.manager.get_credential("youtube_raw_default").await.unwrap().unwrap();
    assert_eq!(wrapped.data["raw"], "not-json");
}

/// Test a tampered ciphertext fails closed on read
#[tokio::test]
async fn test_tampered_ciphertext_fails_closed() {
    let f = fixture();
    let valid = test_crypto().encrypt("{\"a\":1}").unwrap();
    let tampered = format!("{valid}0000");
    insert_raw(&f.store, "youtube", "oauth_default", &tampered).await;

    let error = f.manager.get_credential("youtube_oauth_default").await.unwrap_err();
    assert!(error.is_crypto());
    assert!(f.manager.get_credentials("youtube", None).await.is_err());
}

// ============================================================================
// Update / Delete
// ============================================================================

/// Test updating payload and expiry
#[tokio::test]
async fn test_update_credential() {
    let f = fixture();
    f.manager
        .create_credential("youtube", NewCredential::new("oauth", token("old")))
        .await
        .unwrap();
    f.clock.advance(Duration::minutes(5));
    let expires_at = f.clock.now() + Duration::hours(1);

    let updated = f
        .manager
        .update_credential(
            "youtube_oauth_default",
            CredentialUpdate {
                data: Some(token("new")),
                expires_at: Some(expires_at),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.data, token("new"));
    assert_eq!(updated.expires_at, Some(expires_at));
    assert_eq!(updated.updated_at, Some(f.clock.now()));

    let fetched = f.manager.get_credential("youtube_oauth_default").await.unwrap().unwrap();
    assert_eq!(fetched.data, token("new"));
}

/// Test an update without data encrypts a legacy plain payload
#[tokio::test]
async fn test_update_encrypts_legacy_payload() {
    let f = fixture();
    insert_raw(&f.store, "youtube", "legacy_default", r#"{"clientId":"abc"}"#).await;

    f.manager
        .update_credential("youtube_legacy_default", CredentialUpdate::default())
        .await
        .unwrap();

    let stored = stored_data(&f.store, "youtube", "legacy_default").await;
    assert!(CryptoService::is_ciphertext(&stored));
    let fetched = f.manager.get_credential("youtube_legacy_default").await.unwrap().unwrap();
    assert_eq!(fetched.data["clientId"], "abc");
}

/// Test update and delete error cases
#[tokio::test]
async fn test_update_and_delete_errors() {
    let f = fixture();
    let invalid = f
        .manager
        .update_credential("bad", CredentialUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(invalid, ihub_domain::error::Error::InvalidArgument { .. }));

    assert!(
        f.manager
            .update_credential("youtube_oauth_nobody", CredentialUpdate::default())
            .await
            .unwrap_err()
            .is_not_found()
    );
    assert!(f.manager.delete_credential("ghost_oauth_u1").await.unwrap_err().is_not_found());
    assert!(
        f.manager
            .delete_credential("youtube_oauth_nobody")
            .await
            .unwrap_err()
            .is_not_found()
    );
}

/// Test deleting removes only the targeted entry
#[tokio::test]
async fn test_delete_credential() {
    let f = fixture();
    for user in ["u1", "u2"] {
        f.manager
            .create_credential("youtube", NewCredential::new("oauth", token(user)).for_user(user))
            .await
            .unwrap();
    }

    f.manager.delete_credential("youtube_oauth_u1").await.unwrap();
    let remaining = f.manager.get_credentials("youtube", None).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id.to_string(), "youtube_oauth_u2");
}

// ============================================================================
// Expiry / Rotation
// ============================================================================

/// Test expiry is inclusive of the current instant
#[tokio::test]
async fn test_check_expired_credentials() {
    let f = fixture();
    let expires_at = f.clock.now() + Duration::minutes(10);
    f.manager
        .create_credential(
            "youtube",
            NewCredential::new("oauth", token("t")).expiring_at(expires_at),
        )
        .await
        .unwrap();

    assert!(!f.manager.check_expired_credentials("youtube").await.unwrap());
    f.clock.set(expires_at);
    assert!(f.manager.check_expired_credentials("youtube").await.unwrap());
    assert!(!f.manager.check_expired_credentials("ghost").await.unwrap());
}

/// Test rotation re-encrypts every decodable entry and isolates failures
#[tokio::test]
async fn test_rotation_isolates_failures() {
    let f = fixture();
    f.manager
        .create_credential("youtube", NewCredential::new("oauth", token("t")))
        .await
        .unwrap();
    insert_raw(&f.store, "youtube", "legacy_default", "plain-secret").await;
    let tampered = format!("{}00", test_crypto().encrypt("x").unwrap());
    insert_raw(&f.store, "youtube", "broken_default", &tampered).await;
    let before = stored_data(&f.store, "youtube", "oauth_default").await;

    let outcomes = f.manager.rotate_credentials("youtube").await.unwrap();
    assert_eq!(outcomes.len(), 3);
    let status_of = |id: &str| {
        outcomes
            .iter()
            .find(|outcome| outcome.id.to_string() == id)
            .map(|outcome| outcome.status)
            .unwrap()
    };
    assert_eq!(status_of("youtube_oauth_default"), RotationStatus::Rotated);
    assert_eq!(status_of("youtube_legacy_default"), RotationStatus::Rotated);
    assert_eq!(status_of("youtube_broken_default"), RotationStatus::Failed);

    let after = stored_data(&f.store, "youtube", "oauth_default").await;
    assert_ne!(before, after);
    assert_eq!(stored_data(&f.store, "youtube", "broken_default").await, tampered);

    let legacy = f.manager.get_credential("youtube_legacy_default").await.unwrap().unwrap();
    assert_eq!(legacy.data["raw"], "plain-secret");
    assert!(CryptoService::is_ciphertext(
        &stored_data(&f.store, "youtube", "legacy_default").await
    ));
}

/// Test rotating an unknown provider fails
#[tokio::test]
async fn test_rotate_missing_provider() {
    let f = fixture();
    assert!(f.manager.rotate_credentials("ghost").await.unwrap_err().is_not_found());
}
