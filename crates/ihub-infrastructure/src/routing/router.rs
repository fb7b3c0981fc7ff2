//! Integration Router
//!
//! Central dispatcher. Holds live adapters, ranks them per request by
//! weighted health score, and executes with sequential failover or
//! parallel fan-out. Every attempt is reported to the event logger.

use super::scoring::{ProviderScorer, RankedProvider};
use crate::constants::{EVENT_META_CAPABILITY, EVENT_META_REQUEST_ID};
use crate::events::{EventDetails, IntegrationEventLogger};
use crate::utils::TimedOperation;
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use ihub_domain::constants::DEFAULT_PARALLEL_COUNT;
use ihub_domain::error::{Error, Result};
use ihub_domain::ports::{AdapterInfo, IntegrationExecutor, ProviderAdapter};
use ihub_domain::value_objects::{
    IntegrationRequest, IntegrationResponse, ProviderHealth, ProviderScore,
};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

struct RegisteredAdapter {
    seq: u64,
    adapter: Arc<dyn ProviderAdapter>,
}

/// Outcome of probing a single provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    /// Probed provider
    pub provider_id: String,
    /// True if the probe passed (an adapter without a probe passes)
    pub success: bool,
    /// Probe latency
    pub latency_ms: u64,
    /// Failure description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Health-aware provider router
///
/// Health state is process-local: two routers may disagree for up to one
/// cache TTL.
pub struct IntegrationRouter {
    adapters: DashMap<String, RegisteredAdapter>,
    next_seq: AtomicU64,
    scorer: ProviderScorer,
    events: IntegrationEventLogger,
    default_parallel_count: usize,
}

impl IntegrationRouter {
    /// Create a router with no adapters
    pub fn new(scorer: ProviderScorer, events: IntegrationEventLogger) -> Self {
        Self {
            adapters: DashMap::new(),
            next_seq: AtomicU64::new(0),
            scorer,
            events,
            default_parallel_count: DEFAULT_PARALLEL_COUNT,
        }
    }

    /// Set the fan-out width used by [`IntegrationRouter::execute_parallel_default`]
    #[must_use]
    pub fn with_default_parallel_count(mut self, count: usize) -> Self {
        self.default_parallel_count = count;
        self
    }

    // ========================================================================
    // Adapter registry
    // ========================================================================

    /// Register an adapter, replacing any adapter with the same id
    ///
    /// A replaced adapter keeps its original registration position.
    pub fn register(&self, adapter: Arc<dyn ProviderAdapter>) {
        let id = adapter.id().to_string();
        let capabilities: Vec<String> = adapter
            .capabilities()
            .iter()
            .map(ToString::to_string)
            .collect();

        match self.adapters.entry(id.clone()) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().adapter = adapter;
                info!(provider_id = %id, ?capabilities, "Replaced provider adapter");
            }
            Entry::Vacant(entry) => {
                let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
                entry.insert(RegisteredAdapter { seq, adapter });
                info!(provider_id = %id, ?capabilities, "Registered provider adapter");
            }
        }
    }

    /// Adapter registered under `provider_id`
    pub fn get(&self, provider_id: &str) -> Option<Arc<dyn ProviderAdapter>> {
        self.adapters
            .get(provider_id)
            .map(|entry| Arc::clone(&entry.adapter))
    }

    /// Every registered adapter in registration order
    pub fn list(&self) -> Vec<Arc<dyn ProviderAdapter>> {
        let mut registered: Vec<(u64, Arc<dyn ProviderAdapter>)> = self
            .adapters
            .iter()
            .map(|entry| (entry.seq, Arc::clone(&entry.adapter)))
            .collect();
        registered.sort_by_key(|(seq, _)| *seq);
        registered.into_iter().map(|(_, adapter)| adapter).collect()
    }

    /// Summary of every registered adapter
    pub fn provider_infos(&self) -> Vec<AdapterInfo> {
        self.list().iter().map(|adapter| adapter.info()).collect()
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Candidates able to serve `request`
    ///
    /// A non-empty `preferred` list restricts and orders the candidates;
    /// unknown ids in it are skipped.
    pub fn filter_providers(
        &self,
        request: &IntegrationRequest,
        preferred: Option<&[String]>,
    ) -> Vec<Arc<dyn ProviderAdapter>> {
        let pool = match preferred {
            Some(ids) if !ids.is_empty() => ids.iter().filter_map(|id| self.get(id)).collect(),
            _ => self.list(),
        };
        pool.into_iter()
            .filter(|adapter| adapter.supports(&request.operation, &request.capability))
            .collect()
    }

    /// Cached or freshly evaluated health of a provider
    pub async fn get_provider_health(&self, provider_id: &str) -> ProviderHealth {
        self.scorer.health().provider_health(provider_id).await
    }

    /// Routing weight of a provider
    pub async fn get_provider_weight(&self, provider_id: &str) -> f64 {
        self.scorer.provider_weight(provider_id).await
    }

    /// Score of a provider for the next request
    pub async fn score_provider(&self, provider_id: &str) -> ProviderScore {
        self.scorer.score(provider_id).await
    }

    /// Rank candidates for a request without executing anything
    pub async fn rank_providers(
        &self,
        request: &IntegrationRequest,
        preferred: Option<&[String]>,
    ) -> Vec<ProviderScore> {
        let candidates = self.filter_providers(request, preferred);
        self.scorer
            .rank(candidates)
            .await
            .into_iter()
            .map(|(score, _)| score)
            .collect()
    }

    /// Forget the cached health of one provider
    pub fn invalidate_health(&self, provider_id: &str) {
        self.scorer.health().invalidate(provider_id);
    }

    /// Forget every cached health value
    pub fn clear_health_cache(&self) {
        self.scorer.health().clear();
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Execute on the best candidate, failing over down the ranking
    ///
    /// When every candidate fails, the error of the last one is returned
    /// wrapped in [`Error::AllProvidersFailed`].
    pub async fn execute(
        &self,
        request: &IntegrationRequest,
        preferred: Option<&[String]>,
    ) -> Result<IntegrationResponse> {
        let candidates = self.filter_providers(request, preferred);
        if candidates.is_empty() {
            return Err(Error::unsupported(&request.capability, &request.operation));
        }

        let ranked: Vec<RankedProvider> = self.scorer.rank(candidates).await;
        if ranked.is_empty() {
            return Err(Error::no_healthy_provider(
                &request.capability,
                &request.operation,
            ));
        }

        let attempted = ranked.len();
        let mut last_error = None;
        for (score, adapter) in ranked {
            debug!(
                provider_id = adapter.id(),
                score = score.score,
                health = %score.health,
                "Trying provider"
            );
            match self.attempt(adapter.as_ref(), request).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    warn!(
                        provider_id = adapter.id(),
                        operation = %request.operation,
                        error = %e,
                        "Provider failed, trying next candidate"
                    );
                    last_error = Some(e);
                }
            }
        }

        let last = last_error.unwrap_or_else(|| {
            Error::no_healthy_provider(&request.capability, &request.operation)
        });
        Err(Error::AllProvidersFailed {
            attempted,
            last: Box::new(last),
        })
    }

    /// Execute on the first `count` candidates concurrently
    ///
    /// Candidates are not ranked. All dispatches run to completion; the
    /// successes are returned in candidate order.
    pub async fn execute_parallel(
        &self,
        request: &IntegrationRequest,
        count: usize,
        preferred: Option<&[String]>,
    ) -> Result<Vec<IntegrationResponse>> {
        let candidates: Vec<_> = self
            .filter_providers(request, preferred)
            .into_iter()
            .take(count)
            .collect();
        if candidates.is_empty() {
            return Err(Error::unsupported(&request.capability, &request.operation));
        }

        let attempted = candidates.len();
        let outcomes = futures::future::join_all(
            candidates
                .iter()
                .map(|adapter| self.attempt(adapter.as_ref(), request)),
        )
        .await;

        let mut responses = Vec::with_capacity(attempted);
        let mut errors = Vec::new();
        for (adapter, outcome) in candidates.iter().zip(outcomes) {
            match outcome {
                Ok(response) => responses.push(response),
                Err(e) => errors.push(format!("{}: {e}", adapter.id())),
            }
        }

        if responses.is_empty() {
            return Err(Error::AllProvidersFailedParallel { attempted, errors });
        }
        Ok(responses)
    }

    /// [`IntegrationRouter::execute_parallel`] with the configured default width
    pub async fn execute_parallel_default(
        &self,
        request: &IntegrationRequest,
        preferred: Option<&[String]>,
    ) -> Result<Vec<IntegrationResponse>> {
        self.execute_parallel(request, self.default_parallel_count, preferred)
            .await
    }

    /// Run the optional health probe of a registered adapter
    pub async fn test_provider(&self, provider_id: &str) -> ProbeResult {
        let Some(adapter) = self.get(provider_id) else {
            return ProbeResult {
                provider_id: provider_id.to_string(),
                success: false,
                latency_ms: 0,
                error: Some(format!("Provider {provider_id} is not registered")),
            };
        };

        let timer = TimedOperation::start();
        let outcome = adapter.health_check().await;
        let latency_ms = timer.elapsed_ms();
        let success = outcome.unwrap_or(true);
        ProbeResult {
            provider_id: provider_id.to_string(),
            success,
            latency_ms,
            error: (!success).then(|| "Health check failed".to_string()),
        }
    }

    /// One adapter call plus its event
    async fn attempt(
        &self,
        adapter: &dyn ProviderAdapter,
        request: &IntegrationRequest,
    ) -> Result<IntegrationResponse> {
        let timer = TimedOperation::start();
        let outcome = adapter.execute(request).await;
        let details = EventDetails::new()
            .with_latency(timer.elapsed_ms())
            .with_meta(EVENT_META_CAPABILITY, request.capability.to_string())
            .with_meta(EVENT_META_REQUEST_ID, request.id.clone());

        match &outcome {
            Ok(_) => {
                self.events
                    .log_success(adapter.id(), &request.operation, details)
                    .await;
            }
            Err(e) => {
                self.events
                    .log_failure(adapter.id(), &request.operation, e, details)
                    .await;
            }
        }
        outcome
    }
}

#[async_trait]
impl IntegrationExecutor for IntegrationRouter {
    async fn execute(
        &self,
        request: &IntegrationRequest,
        preferred: Option<&[String]>,
    ) -> Result<IntegrationResponse> {
        IntegrationRouter::execute(self, request, preferred).await
    }

    async fn execute_parallel(
        &self,
        request: &IntegrationRequest,
        count: usize,
        preferred: Option<&[String]>,
    ) -> Result<Vec<IntegrationResponse>> {
        IntegrationRouter::execute_parallel(self, request, count, preferred).await
    }
}

impl std::fmt::Debug for IntegrationRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<String> = self.list().iter().map(|a| a.id().to_string()).collect();
        f.debug_struct("IntegrationRouter")
            .field("providers", &ids)
            .field("default_parallel_count", &self.default_parallel_count)
            .finish_non_exhaustive()
    }
}
