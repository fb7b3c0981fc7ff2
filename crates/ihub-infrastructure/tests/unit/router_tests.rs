//! Tests for the integration router

use crate::test_utils::{ScriptedAdapter, manual_clock, router_with_store};
use chrono::Duration;
use ihub_domain::entities::{
    EventStatus, IntegrationEvent, ProviderRecord, RoutingWeight, StoredHealthStatus,
};
use ihub_domain::error::Error;
use ihub_domain::ports::{Clock, EventStore, IntegrationExecutor, ManualClock};
use ihub_domain::value_objects::{Capability, IntegrationRequest, ProviderHealth};
use ihub_providers::persistence::InMemoryIntegrationStore;
use serde_json::{Map, json};
use std::sync::Arc;
use uuid::Uuid;

fn request() -> IntegrationRequest {
    IntegrationRequest::new(Capability::Analytics, "getStats").with_id("req-1")
}

fn provider(id: &str, clock: &ManualClock) -> ProviderRecord {
    ProviderRecord::new(id, id.to_uppercase(), clock.now())
}

async fn record_failures(store: &InMemoryIntegrationStore, provider_id: &str, count: usize, clock: &ManualClock) {
    for _ in 0..count {
        store
            .append_event(IntegrationEvent {
                id: Uuid::new_v4(),
                provider_id: provider_id.to_string(),
                event_type: "getStats".to_string(),
                status: EventStatus::Failed,
                latency_ms: None,
                cost: None,
                metadata: Map::new(),
                created_at: clock.now(),
            })
            .await
            .unwrap();
    }
}

// ============================================================================
// Registration Tests
// ============================================================================

/// Test adapters are listed in registration order and can be replaced
#[tokio::test]
async fn test_register_keeps_order() {
    let router = router_with_store(None, manual_clock());
    router.register(ScriptedAdapter::ok("b").shared());
    router.register(ScriptedAdapter::ok("a").shared());
    router.register(ScriptedAdapter::failing("b", "replaced").shared());

    let ids: Vec<String> = router.list().iter().map(|a| a.id().to_string()).collect();
    assert_eq!(ids, vec!["b", "a"]);
    assert!(router.get("a").is_some());
    assert!(router.get("zzz").is_none());
    assert_eq!(router.provider_infos().len(), 2);
}

/// Test preferred ids restrict and order candidates, skipping unknown ids
#[tokio::test]
async fn test_filter_with_preferred_ids() {
    let router = router_with_store(None, manual_clock());
    router.register(ScriptedAdapter::ok("a").shared());
    router.register(ScriptedAdapter::ok("b").shared());
    router.register(ScriptedAdapter::ok("c").with_operations(&["upload"]).shared());

    let preferred = vec!["c".to_string(), "ghost".to_string(), "b".to_string()];
    let ids: Vec<String> = router
        .filter_providers(&request(), Some(preferred.as_slice()))
        .iter()
        .map(|a| a.id().to_string())
        .collect();
    assert_eq!(ids, vec!["b"]);

    let all: Vec<String> = router
        .filter_providers(&request(), Some(&[][..]))
        .iter()
        .map(|a| a.id().to_string())
        .collect();
    assert_eq!(all, vec!["a", "b"]);
}

// ============================================================================
// Health & Scoring Tests
// ============================================================================

/// Test health without a provider store is always healthy
#[tokio::test]
async fn test_health_without_store() {
    let router = router_with_store(None, manual_clock());
    assert_eq!(router.get_provider_health("anything").await, ProviderHealth::Healthy);
    assert!((router.get_provider_weight("anything").await - 1.0).abs() < f64::EPSILON);
}

/// Test two health reads within the TTL hit the store once
#[tokio::test]
async fn test_health_is_cached_within_ttl() {
    let clock = manual_clock();
    let store = Arc::new(InMemoryIntegrationStore::with_providers([provider("a", &clock)]));
    let router = router_with_store(Some(store.clone()), clock.clone());

    assert_eq!(router.get_provider_health("a").await, ProviderHealth::Healthy);
    clock.advance(Duration::seconds(30));
    assert_eq!(router.get_provider_health("a").await, ProviderHealth::Healthy);
    assert_eq!(store.provider_reads(), 1);

    clock.advance(Duration::seconds(31));
    router.get_provider_health("a").await;
    assert_eq!(store.provider_reads(), 2);

    router.invalidate_health("a");
    router.get_provider_health("a").await;
    assert_eq!(store.provider_reads(), 3);
}

/// Test a missing provider row is unhealthy and not cached
#[tokio::test]
async fn test_missing_row_is_unhealthy_and_uncached() {
    let clock = manual_clock();
    let store = Arc::new(InMemoryIntegrationStore::new());
    let router = router_with_store(Some(store.clone()), clock);

    assert_eq!(router.get_provider_health("ghost").await, ProviderHealth::Unhealthy);
    assert_eq!(router.get_provider_health("ghost").await, ProviderHealth::Unhealthy);
    assert_eq!(store.provider_reads(), 2);
}

/// Test stored status mapping and error thresholds
#[tokio::test]
async fn test_health_from_status_and_errors() {
    let clock = manual_clock();
    let store = Arc::new(InMemoryIntegrationStore::with_providers([
        provider("outage", &clock).with_health_status(StoredHealthStatus::Outage),
        provider("deg", &clock).with_health_status(StoredHealthStatus::Degraded),
        provider("six", &clock),
        provider("eleven", &clock),
        provider("five", &clock),
    ]));
    record_failures(&store, "six", 6, &clock).await;
    record_failures(&store, "eleven", 11, &clock).await;
    record_failures(&store, "five", 5, &clock).await;
    let router = router_with_store(Some(store), clock);

    assert_eq!(router.get_provider_health("outage").await, ProviderHealth::Unhealthy);
    assert_eq!(router.get_provider_health("deg").await, ProviderHealth::Degraded);
    assert_eq!(router.get_provider_health("six").await, ProviderHealth::Degraded);
    assert_eq!(router.get_provider_health("eleven").await, ProviderHealth::Unhealthy);
    assert_eq!(router.get_provider_health("five").await, ProviderHealth::Healthy);
}

/// Test failures older than the error window are ignored
#[tokio::test]
async fn test_old_failures_fall_out_of_window() {
    let clock = manual_clock();
    let store = Arc::new(InMemoryIntegrationStore::with_providers([provider("a", &clock)]));
    record_failures(&store, "a", 12, &clock).await;
    let router = router_with_store(Some(store), clock.clone());

    clock.advance(Duration::hours(2));
    assert_eq!(router.get_provider_health("a").await, ProviderHealth::Healthy);
}

/// Test a failing store degrades to healthy and default weight
#[tokio::test]
async fn test_store_failure_assumes_healthy() {
    let clock = manual_clock();
    let store = Arc::new(InMemoryIntegrationStore::with_providers([
        provider("a", &clock).with_health_status(StoredHealthStatus::Outage),
    ]));
    store.set_failing(true);
    let router = router_with_store(Some(store), clock);

    assert_eq!(router.get_provider_health("a").await, ProviderHealth::Healthy);
    assert!((router.get_provider_weight("a").await - 1.0).abs() < f64::EPSILON);
}

/// Test weight and priority configuration
#[tokio::test]
async fn test_provider_weight() {
    let clock = manual_clock();
    let store = Arc::new(InMemoryIntegrationStore::with_providers([
        provider("w", &clock).with_routing(RoutingWeight::Weight(2.5)),
        provider("p", &clock).with_routing(RoutingWeight::Priority(4.0)),
        provider("bad", &clock).with_routing(RoutingWeight::Priority(0.0)),
        provider("none", &clock),
    ]));
    let router = router_with_store(Some(store), clock);

    assert!((router.get_provider_weight("w").await - 2.5).abs() < f64::EPSILON);
    assert!((router.get_provider_weight("p").await - 0.25).abs() < f64::EPSILON);
    assert!((router.get_provider_weight("bad").await - 1.0).abs() < f64::EPSILON);
    assert!((router.get_provider_weight("none").await - 1.0).abs() < f64::EPSILON);
    assert!((router.get_provider_weight("missing").await - 1.0).abs() < f64::EPSILON);
}

/// Test healthy, degraded and unhealthy candidates rank as [healthy, degraded]
#[tokio::test]
async fn test_ranking_drops_unhealthy() {
    let clock = manual_clock();
    let store = Arc::new(InMemoryIntegrationStore::with_providers([
        provider("a", &clock),
        provider("b", &clock).with_health_status(StoredHealthStatus::Degraded),
        provider("c", &clock).with_health_status(StoredHealthStatus::Outage),
    ]));
    let router = router_with_store(Some(store), clock);
    router.register(ScriptedAdapter::ok("c").shared());
    router.register(ScriptedAdapter::ok("b").shared());
    router.register(ScriptedAdapter::ok("a").shared());

    let ranked: Vec<String> = router
        .rank_providers(&request(), None)
        .await
        .into_iter()
        .map(|score| score.provider)
        .collect();
    assert_eq!(ranked, vec!["a", "b"]);
}

/// Test higher weight wins among healthy providers
#[tokio::test]
async fn test_ranking_by_weight() {
    let clock = manual_clock();
    let store = Arc::new(InMemoryIntegrationStore::with_providers([
        provider("light", &clock).with_routing(RoutingWeight::Weight(1.0)),
        provider("heavy", &clock).with_routing(RoutingWeight::Weight(3.0)),
    ]));
    let router = router_with_store(Some(store), clock);
    router.register(ScriptedAdapter::ok("light").shared());
    router.register(ScriptedAdapter::ok("heavy").shared());

    let response = router.execute(&request(), None).await.unwrap();
    assert_eq!(response.provider, "heavy");
}

// ============================================================================
// Execution Tests
// ============================================================================

/// Test an unsupported operation fails without invoking any adapter
#[tokio::test]
async fn test_unsupported_operation() {
    let router = router_with_store(None, manual_clock());
    let adapter = ScriptedAdapter::ok("a").with_operations(&["upload"]).shared();
    router.register(adapter.clone());

    let error = router.execute(&request(), None).await.unwrap_err();
    assert!(error.is_unsupported());
    assert_eq!(adapter.calls(), 0);

    let error = router.execute_parallel(&request(), 2, None).await.unwrap_err();
    assert!(error.is_unsupported());
    assert_eq!(adapter.calls(), 0);
}

/// Test failover returns the second provider's response and logs two events
#[tokio::test]
async fn test_failover_logs_each_attempt() {
    let clock = manual_clock();
    let store = Arc::new(InMemoryIntegrationStore::with_providers([
        provider("a", &clock).with_routing(RoutingWeight::Weight(2.0)),
        provider("b", &clock),
    ]));
    let router = router_with_store(Some(store.clone()), clock);
    router.register(ScriptedAdapter::failing("a", "quota exceeded").shared());
    router.register(ScriptedAdapter::ok("b").returning(json!({ "ok": true })).shared());

    let response = router.execute(&request(), None).await.unwrap();
    assert_eq!(response.provider, "b");
    assert_eq!(response.data, json!({ "ok": true }));

    let events = store.events().await;
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].provider_id, "a");
    assert_eq!(events[0].status, EventStatus::Failed);
    assert!(
        events[0].metadata["error"]
            .as_str()
            .unwrap()
            .contains("quota exceeded")
    );
    assert_eq!(events[1].provider_id, "b");
    assert_eq!(events[1].status, EventStatus::Success);
    assert_eq!(events[1].event_type, "getStats");
    assert_eq!(events[1].metadata["capability"], "analytics");
    assert_eq!(events[1].metadata["requestId"], "req-1");
    assert!(events[1].latency_ms.is_some());
}

/// Test exhausting every candidate surfaces the last error
#[tokio::test]
async fn test_all_failed_wraps_last_error() {
    let router = router_with_store(None, manual_clock());
    router.register(ScriptedAdapter::failing("a", "first").shared());
    router.register(ScriptedAdapter::failing("b", "second").shared());

    let error = router.execute(&request(), None).await.unwrap_err();
    match &error {
        Error::AllProvidersFailed { attempted, .. } => assert_eq!(*attempted, 2),
        other => panic!("Expected AllProvidersFailed, got {other:?}"),
    }
    assert!(error.last_error().unwrap().to_string().contains("second"));
}

/// Test a logging store outage never affects execution
#[tokio::test]
async fn test_event_store_failure_is_swallowed() {
    let clock = manual_clock();
    let store = Arc::new(InMemoryIntegrationStore::new());
    store.set_failing(true);
    let router = router_with_store(Some(store), clock);
    router.register(ScriptedAdapter::ok("a").shared());

    let response = router.execute(&request(), None).await.unwrap();
    assert_eq!(response.provider, "a");
}

/// Test parallel execution returns successes in candidate order
#[tokio::test]
async fn test_parallel_partial_success() {
    let clock = manual_clock();
    let store = Arc::new(InMemoryIntegrationStore::new());
    let router = router_with_store(Some(store.clone()), clock);
    let a = ScriptedAdapter::ok("a").shared();
    let b = ScriptedAdapter::failing("b", "down").shared();
    let c = ScriptedAdapter::ok("c").shared();
    let d = ScriptedAdapter::ok("d").shared();
    router.register(a.clone());
    router.register(b.clone());
    router.register(c.clone());
    router.register(d.clone());

    let responses = router.execute_parallel(&request(), 3, None).await.unwrap();
    let providers: Vec<&str> = responses.iter().map(|r| r.provider.as_str()).collect();
    assert_eq!(providers, vec!["a", "c"]);
    assert_eq!((a.calls(), b.calls(), c.calls(), d.calls()), (1, 1, 1, 0));
    assert_eq!(store.events().await.len(), 3);
}

/// Test parallel execution fails only when every dispatch fails
#[tokio::test]
async fn test_parallel_all_failed() {
    let router = router_with_store(None, manual_clock());
    router.register(ScriptedAdapter::failing("a", "x").shared());
    router.register(ScriptedAdapter::failing("b", "y").shared());

    match router.execute_parallel(&request(), 5, None).await.unwrap_err() {
        Error::AllProvidersFailedParallel { attempted, errors } => {
            assert_eq!(attempted, 2);
            assert_eq!(errors.len(), 2);
            assert!(errors[0].starts_with("a: "));
        }
        other => panic!("Expected AllProvidersFailedParallel, got {other:?}"),
    }
}

/// Test a slow sibling is awaited and logged after a fast success
#[tokio::test(start_paused = true)]
async fn test_parallel_waits_for_slow_success() {
    let clock = manual_clock();
    let store = Arc::new(InMemoryIntegrationStore::new());
    let router = router_with_store(Some(store.clone()), clock);
    let slow = ScriptedAdapter::ok("slow")
        .with_delay(std::time::Duration::from_secs(5))
        .shared();
    let fast = ScriptedAdapter::ok("fast").shared();
    router.register(slow.clone());
    router.register(fast.clone());

    let started = tokio::time::Instant::now();
    let responses = router.execute_parallel(&request(), 2, None).await.unwrap();
    assert!(started.elapsed() >= std::time::Duration::from_secs(5));

    let providers: Vec<&str> = responses.iter().map(|r| r.provider.as_str()).collect();
    assert_eq!(providers, vec!["slow", "fast"]);
    assert_eq!((slow.calls(), fast.calls()), (1, 1));

    let events = store.events().await;
    let logged: Vec<&str> = events.iter().map(|e| e.provider_id.as_str()).collect();
    assert_eq!(logged, vec!["fast", "slow"]);
    assert!(events.iter().all(|e| e.status == EventStatus::Success));
}

/// Test router futures can run on a spawned task through the executor port
#[tokio::test]
async fn test_executor_futures_are_send() {
    let clock = manual_clock();
    let store = Arc::new(InMemoryIntegrationStore::with_providers([
        provider("a", &clock).with_routing(RoutingWeight::Weight(2.0)),
        provider("b", &clock),
    ]));
    let router = router_with_store(Some(store.clone()), clock);
    router.register(ScriptedAdapter::failing("a", "down").shared());
    router.register(ScriptedAdapter::ok("b").shared());
    let executor: Arc<dyn IntegrationExecutor> = Arc::new(router);

    let sequential = {
        let executor = Arc::clone(&executor);
        tokio::spawn(async move { executor.execute(&request(), None).await })
    };
    let parallel = {
        let executor = Arc::clone(&executor);
        tokio::spawn(async move { executor.execute_parallel(&request(), 2, None).await })
    };

    assert_eq!(sequential.await.unwrap().unwrap().provider, "b");
    assert_eq!(parallel.await.unwrap().unwrap().len(), 1);
    assert_eq!(store.events().await.len(), 4);
}

/// Test the default fan-out width comes from configuration
#[tokio::test]
async fn test_parallel_default_width() {
    let router = router_with_store(None, manual_clock()).with_default_parallel_count(1);
    router.register(ScriptedAdapter::ok("a").shared());
    router.register(ScriptedAdapter::ok("b").shared());

    let responses = router.execute_parallel_default(&request(), None).await.unwrap();
    assert_eq!(responses.len(), 1);
}

// ============================================================================
// Probe Tests
// ============================================================================

/// Test probing registered and unregistered providers
#[tokio::test]
async fn test_provider_probe() {
    let router = router_with_store(None, manual_clock());
    router.register(ScriptedAdapter::ok("noprobe").shared());
    router.register(ScriptedAdapter::ok("sick").with_probe(false).shared());

    assert!(router.test_provider("noprobe").await.success);

    let sick = router.test_provider("sick").await;
    assert!(!sick.success);
    assert!(sick.error.is_some());

    let ghost = router.test_provider("ghost").await;
    assert!(!ghost.success);
    assert!(ghost.error.unwrap().contains("not registered"));
}
