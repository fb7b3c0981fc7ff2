//! Provider scoring and ranking

use super::health::HealthEvaluator;
use ihub_domain::constants::DEFAULT_PROVIDER_WEIGHT;
use ihub_domain::ports::{ProviderAdapter, ProviderStore};
use ihub_domain::value_objects::{ProviderHealth, ProviderScore};
use std::sync::Arc;
use tracing::warn;

/// A candidate adapter paired with its score for one request
pub type RankedProvider = (ProviderScore, Arc<dyn ProviderAdapter>);

/// Computes weights and scores for candidate providers
pub struct ProviderScorer {
    provider_store: Option<Arc<dyn ProviderStore>>,
    health: Arc<HealthEvaluator>,
}

impl ProviderScorer {
    /// Create a scorer
    pub fn new(provider_store: Option<Arc<dyn ProviderStore>>, health: Arc<HealthEvaluator>) -> Self {
        Self {
            provider_store,
            health,
        }
    }

    /// Health evaluator used by this scorer
    pub fn health(&self) -> &Arc<HealthEvaluator> {
        &self.health
    }

    /// Configured routing weight, or 1.0 when absent or unreadable
    pub async fn provider_weight(&self, provider_id: &str) -> f64 {
        let Some(store) = &self.provider_store else {
            return DEFAULT_PROVIDER_WEIGHT;
        };

        let record = match store.find_provider(provider_id).await {
            Ok(Some(record)) => record,
            Ok(None) => return DEFAULT_PROVIDER_WEIGHT,
            Err(e) => {
                warn!(provider_id, error = %e, "Failed to read provider weight");
                return DEFAULT_PROVIDER_WEIGHT;
            }
        };

        match record.config.routing {
            None => DEFAULT_PROVIDER_WEIGHT,
            Some(routing) => routing.effective().unwrap_or_else(|| {
                warn!(provider_id, ?routing, "Unusable routing weight, using default");
                DEFAULT_PROVIDER_WEIGHT
            }),
        }
    }

    /// Score one provider
    pub async fn score(&self, provider_id: &str) -> ProviderScore {
        let (weight, health, recent_errors) = futures::join!(
            self.provider_weight(provider_id),
            self.health.provider_health(provider_id),
            self.health.recent_errors(provider_id),
        );
        ProviderScore::compute(provider_id, weight, health, recent_errors)
    }

    /// Score every candidate concurrently and rank them
    pub async fn rank(&self, candidates: Vec<Arc<dyn ProviderAdapter>>) -> Vec<RankedProvider> {
        let scores =
            futures::future::join_all(candidates.iter().map(|adapter| self.score(adapter.id())))
                .await;
        rank_scored(scores.into_iter().zip(candidates).collect())
    }
}

/// Drop unhealthy candidates when a healthy one exists, then stable-sort by
/// score descending
pub fn rank_scored<T>(mut scored: Vec<(ProviderScore, T)>) -> Vec<(ProviderScore, T)> {
    let any_healthy = scored
        .iter()
        .any(|(score, _)| score.health == ProviderHealth::Healthy);
    if any_healthy {
        scored.retain(|(score, _)| score.health != ProviderHealth::Unhealthy);
    }
    scored.sort_by(|(a, _), (b, _)| b.score.total_cmp(&a.score));
    scored
}

impl std::fmt::Debug for ProviderScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderScorer")
            .field("health", &self.health)
            .finish_non_exhaustive()
    }
}
