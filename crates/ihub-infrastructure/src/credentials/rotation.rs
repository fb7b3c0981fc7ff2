//! Credential rotation service
//!
//! Batch rotation across providers on top of [`CredentialManager`].

use super::manager::{CredentialManager, has_expired_entry};
use ihub_domain::entities::{ProviderRecord, RotationOutcome, RotationStatus};
use ihub_domain::error::Result;
use ihub_domain::ports::{Clock, ProviderStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

/// Rotation result for one provider
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationReport {
    /// Rotated provider
    pub provider_id: String,
    /// Entries processed
    pub total: usize,
    /// Entries re-encrypted
    pub rotated: usize,
    /// Entries left untouched because of an error
    pub failed: usize,
    /// Per-entry outcomes
    pub results: Vec<RotationOutcome>,
    /// Provider-level failure (the record could not be loaded or saved)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RotationReport {
    fn from_outcomes(provider_id: &str, results: Vec<RotationOutcome>) -> Self {
        let rotated = results
            .iter()
            .filter(|outcome| outcome.status == RotationStatus::Rotated)
            .count();
        Self {
            provider_id: provider_id.to_string(),
            total: results.len(),
            rotated,
            failed: results.len() - rotated,
            results,
            error: None,
        }
    }

    fn provider_failed(provider_id: &str, error: String) -> Self {
        Self {
            provider_id: provider_id.to_string(),
            total: 0,
            rotated: 0,
            failed: 1,
            results: Vec::new(),
            error: Some(error),
        }
    }
}

/// Rotation result across several providers
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationSummary {
    /// Providers processed
    pub total_providers: usize,
    /// Entries re-encrypted across all providers
    pub total_rotated: usize,
    /// Failed entries plus failed providers
    pub total_failed: usize,
    /// One report per provider
    pub reports: Vec<RotationReport>,
}

impl RotationSummary {
    fn push(&mut self, report: RotationReport) {
        self.total_providers += 1;
        self.total_rotated += report.rotated;
        self.total_failed += report.failed;
        self.reports.push(report);
    }
}

/// Rotates credentials for one provider or the whole catalog
pub struct CredentialRotationService {
    manager: Arc<CredentialManager>,
    store: Arc<dyn ProviderStore>,
    clock: Arc<dyn Clock>,
}

impl CredentialRotationService {
    /// Create a rotation service
    pub fn new(
        manager: Arc<CredentialManager>,
        store: Arc<dyn ProviderStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            manager,
            store,
            clock,
        }
    }

    /// Rotate every credential of one provider
    pub async fn rotate_provider(&self, provider_id: &str) -> Result<RotationReport> {
        let outcomes = self.manager.rotate_credentials(provider_id).await?;
        Ok(RotationReport::from_outcomes(provider_id, outcomes))
    }

    /// Rotate every active provider that holds credentials
    ///
    /// A provider that fails as a whole counts as one failure and does not
    /// stop the batch.
    pub async fn rotate_all(&self) -> Result<RotationSummary> {
        let providers = self.candidates(|_| true).await?;
        let summary = self.rotate_each(&providers).await;
        info!(
            providers = summary.total_providers,
            rotated = summary.total_rotated,
            failed = summary.total_failed,
            "Credential rotation completed"
        );
        Ok(summary)
    }

    /// Rotate only providers holding at least one expired credential
    pub async fn rotate_expired(&self) -> Result<RotationSummary> {
        let now = self.clock.now();
        let providers = self
            .candidates(|record| has_expired_entry(record, now))
            .await?;
        let summary = self.rotate_each(&providers).await;
        info!(
            providers = summary.total_providers,
            rotated = summary.total_rotated,
            failed = summary.total_failed,
            "Expired credential rotation completed"
        );
        Ok(summary)
    }

    async fn candidates<F>(&self, include: F) -> Result<Vec<String>>
    where
        F: Fn(&ProviderRecord) -> bool,
    {
        Ok(self
            .store
            .list_providers()
            .await?
            .into_iter()
            .filter(|record| record.is_active && !record.credentials.is_empty())
            .filter(|record| include(record))
            .map(|record| record.id)
            .collect())
    }

    async fn rotate_each(&self, provider_ids: &[String]) -> RotationSummary {
        let mut summary = RotationSummary::default();
        for provider_id in provider_ids {
            let report = match self.rotate_provider(provider_id).await {
                Ok(report) => report,
                Err(e) => {
                    error!(provider_id = %provider_id, error = %e, "Provider rotation failed");
                    RotationReport::provider_failed(provider_id, e.to_string())
                }
            };
            summary.push(report);
        }
        summary
    }
}

impl std::fmt::Debug for CredentialRotationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRotationService")
            .finish_non_exhaustive()
    }
}
