//! Data Sync Use Case
//!
//! Pulls provider data through the integration executor, normalizes it with
//! [`DataTransformer`] and tracks per-(provider, operation) sync state.
//! Pushes go the other way, one executor call per record.

use crate::transform::{DataTransformer, GenericRecord};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use dashmap::DashMap;
use ihub_domain::error::{Error, Result};
use ihub_domain::ports::{Clock, IntegrationExecutor};
use ihub_domain::value_objects::{Capability, IntegrationRequest, IntegrationResponse};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Page size of an incremental sync when the config sets none
const DEFAULT_INCREMENTAL_BATCH_SIZE: usize = 100;

/// Page size of a full sync when the config sets none
const DEFAULT_FULL_BATCH_SIZE: usize = 1000;

/// Registered sync of one provider operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    /// Provider to pull from
    pub provider_id: String,
    /// Operation to execute
    pub operation: String,
    /// Interval between runs, in humantime form (`15m`, `1h 30m`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    /// Whether the sync is meant to run incrementally
    #[serde(default)]
    pub incremental: bool,
    /// Completion time of the last successful incremental run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_at: Option<DateTime<Utc>>,
    /// Page size requested from the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
    /// Provider-specific filters merged into the request payload
    #[serde(default)]
    pub filters: Map<String, Value>,
}

impl SyncConfig {
    /// Sync of `operation` on `provider_id` with no schedule or filters
    pub fn new<P: Into<String>, O: Into<String>>(provider_id: P, operation: O) -> Self {
        Self {
            provider_id: provider_id.into(),
            operation: operation.into(),
            schedule: None,
            incremental: false,
            last_sync_at: None,
            batch_size: None,
            filters: Map::new(),
        }
    }

    /// Set the run interval
    #[must_use]
    pub fn with_schedule<S: Into<String>>(mut self, schedule: S) -> Self {
        self.schedule = Some(schedule.into());
        self
    }

    /// Mark as incremental
    #[must_use]
    pub fn incremental(mut self) -> Self {
        self.incremental = true;
        self
    }

    /// Set the page size
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Set the request filters
    #[must_use]
    pub fn with_filters(mut self, filters: Map<String, Value>) -> Self {
        self.filters = filters;
        self
    }

    /// Registry key: `providerId:operation`
    pub fn key(&self) -> String {
        sync_key(&self.provider_id, &self.operation)
    }
}

/// Options of a single pull
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PullOptions {
    /// Only items changed after this instant
    pub since: Option<DateTime<Utc>>,
    /// Maximum number of items
    pub limit: Option<usize>,
    /// Provider-specific filters
    pub filters: Map<String, Value>,
}

/// Overall outcome of a sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Every item was processed
    Success,
    /// Some items failed
    Partial,
    /// The pull itself failed
    Failed,
}

/// Result of one sync run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Synced provider
    pub provider_id: String,
    /// Synced operation
    pub operation: String,
    /// Overall outcome
    pub status: SyncStatus,
    /// Items returned by the pull
    pub items_processed: usize,
    /// Items accepted as new
    pub items_created: usize,
    /// Items accepted as updates
    pub items_updated: usize,
    /// Items rejected during processing
    pub items_failed: usize,
    /// Failure messages
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    /// Run start
    pub started_at: DateTime<Utc>,
    /// Run end
    pub completed_at: DateTime<Utc>,
    /// Wall-clock duration
    pub duration_ms: u64,
    /// When the next run is due, for scheduled syncs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_sync_at: Option<DateTime<Utc>>,
}

/// Per-item processing tally
#[derive(Debug, Default)]
struct ProcessedBatch {
    created: usize,
    updated: usize,
    failed: usize,
    errors: Vec<String>,
}

/// Sync orchestration over an [`IntegrationExecutor`]
pub struct DataSyncService {
    executor: Arc<dyn IntegrationExecutor>,
    transformer: DataTransformer,
    clock: Arc<dyn Clock>,
    syncs: DashMap<String, SyncConfig>,
}

impl DataSyncService {
    /// Create a sync service with no registered syncs
    pub fn new(executor: Arc<dyn IntegrationExecutor>, clock: Arc<dyn Clock>) -> Self {
        Self {
            executor,
            transformer: DataTransformer::new(),
            clock,
            syncs: DashMap::new(),
        }
    }

    /// Register or replace a sync configuration
    pub fn register_sync(&self, config: SyncConfig) {
        let key = config.key();
        self.syncs.insert(key.clone(), config);
        info!(sync = %key, "Sync registered");
    }

    /// Stored configuration of a sync
    pub fn get_sync_status(&self, provider_id: &str, operation: &str) -> Option<SyncConfig> {
        self.syncs
            .get(&sync_key(provider_id, operation))
            .map(|entry| entry.value().clone())
    }

    /// Every registered sync, ordered by key
    pub fn list_syncs(&self) -> Vec<SyncConfig> {
        let mut syncs: Vec<SyncConfig> = self
            .syncs
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        syncs.sort_by_key(SyncConfig::key);
        syncs
    }

    /// Pull and normalize data from one provider
    ///
    /// An array in the response `data` yields one record per object
    /// element; any other value yields a single record.
    pub async fn pull_data(
        &self,
        provider_id: &str,
        operation: &str,
        options: PullOptions,
    ) -> Result<Vec<GenericRecord>> {
        let timer = Instant::now();
        let request_id = format!("sync-pull-{}", Uuid::new_v4());

        let mut payload = options.filters;
        if let Some(since) = options.since {
            payload.insert(
                "since".to_string(),
                Value::from(since.to_rfc3339_opts(SecondsFormat::Millis, true)),
            );
        }
        if let Some(limit) = options.limit {
            payload.insert("limit".to_string(), Value::from(limit));
        }

        let request = IntegrationRequest::new(Capability::Analytics, operation)
            .with_id(request_id.clone())
            .with_payload(payload);
        let preferred = [provider_id.to_string()];

        let response = match self.executor.execute(&request, Some(preferred.as_slice())).await {
            Ok(response) => response,
            Err(e) => {
                error!(
                    request_id = %request_id,
                    provider_id,
                    operation,
                    error = %e,
                    duration_ms = elapsed_ms(timer),
                    "Data pull failed"
                );
                return Err(e);
            }
        };

        let records = self.normalize(response);
        info!(
            request_id = %request_id,
            provider_id,
            operation,
            items = records.len(),
            duration_ms = elapsed_ms(timer),
            "Data pull completed"
        );
        Ok(records)
    }

    /// Push records to a provider, one upload request per record
    ///
    /// Stops at the first failure. A record carrying its original object
    /// payload is sent as is; otherwise a payload is rebuilt from its
    /// normalized fields.
    pub async fn push_data(
        &self,
        provider_id: &str,
        operation: &str,
        records: &[GenericRecord],
    ) -> Result<Vec<Value>> {
        let timer = Instant::now();
        let request_id = format!("sync-push-{}", Uuid::new_v4());
        let preferred = [provider_id.to_string()];

        let mut results = Vec::with_capacity(records.len());
        for record in records {
            let request = IntegrationRequest::new(Capability::Upload, operation)
                .with_id(format!("{request_id}-{}", record.id))
                .with_payload(to_provider_payload(record));

            match self.executor.execute(&request, Some(preferred.as_slice())).await {
                Ok(response) => results.push(response.data),
                Err(e) => {
                    error!(
                        request_id = %request_id,
                        provider_id,
                        record_id = %record.id,
                        error = %e,
                        "Data push failed"
                    );
                    return Err(e);
                }
            }
        }

        info!(
            request_id = %request_id,
            provider_id,
            operation,
            items = records.len(),
            duration_ms = elapsed_ms(timer),
            "Data push completed"
        );
        Ok(results)
    }

    /// Pull only items changed since the last successful incremental run
    ///
    /// The cursor comes from the registered configuration under the same
    /// key, or from `config` itself when none is registered. On success the
    /// stored `last_sync_at` moves to the completion time. Never fails:
    /// a pull error becomes a report with status `failed`.
    pub async fn incremental_sync(&self, config: &SyncConfig) -> SyncReport {
        let key = config.key();
        let mut stored = self
            .get_sync_status(&config.provider_id, &config.operation)
            .unwrap_or_else(|| config.clone());
        let since = stored.last_sync_at;
        info!(sync = %key, last_sync_at = ?since, "Starting incremental sync");

        let options = PullOptions {
            since,
            limit: Some(config.batch_size.unwrap_or(DEFAULT_INCREMENTAL_BATCH_SIZE)),
            filters: config.filters.clone(),
        };
        let report = self.run(config, options).await;

        if report.status != SyncStatus::Failed {
            stored.last_sync_at = Some(report.completed_at);
            self.syncs.insert(key, stored);
        }
        report
    }

    /// Pull everything, ignoring the last sync time
    ///
    /// Never fails: a pull error becomes a report with status `failed`.
    pub async fn full_sync(&self, config: &SyncConfig) -> SyncReport {
        info!(sync = %config.key(), "Starting full sync");
        let options = PullOptions {
            since: None,
            limit: Some(config.batch_size.unwrap_or(DEFAULT_FULL_BATCH_SIZE)),
            filters: config.filters.clone(),
        };
        self.run(config, options).await
    }

    async fn run(&self, config: &SyncConfig, options: PullOptions) -> SyncReport {
        let timer = Instant::now();
        let started_at = self.clock.now();

        let pulled = self
            .pull_data(&config.provider_id, &config.operation, options)
            .await;
        let completed_at = self.clock.now();

        let mut report = SyncReport {
            provider_id: config.provider_id.clone(),
            operation: config.operation.clone(),
            status: SyncStatus::Failed,
            items_processed: 0,
            items_created: 0,
            items_updated: 0,
            items_failed: 0,
            errors: Vec::new(),
            started_at,
            completed_at,
            duration_ms: elapsed_ms(timer),
            next_sync_at: None,
        };

        match pulled {
            Ok(records) => {
                let batch = process(&records);
                report.status = if batch.errors.is_empty() {
                    SyncStatus::Success
                } else {
                    SyncStatus::Partial
                };
                report.items_processed = records.len();
                report.items_created = batch.created;
                report.items_updated = batch.updated;
                report.items_failed = batch.failed;
                report.errors = batch.errors;
                report.next_sync_at = next_sync_at(config.schedule.as_deref(), completed_at);
            }
            Err(e) => {
                error!(sync = %config.key(), error = %e, "Sync failed");
                report.errors.push(e.to_string());
            }
        }
        report
    }

    fn normalize(&self, response: IntegrationResponse) -> Vec<GenericRecord> {
        match &response.data {
            Value::Array(items) => items
                .iter()
                .filter(|item| item.is_object())
                .map(|item| {
                    self.transformer.transform(&IntegrationResponse::new(
                        response.provider.clone(),
                        response.operation.clone(),
                        item.clone(),
                    ))
                })
                .collect(),
            _ => vec![self.transformer.transform(&response)],
        }
    }
}

impl std::fmt::Debug for DataSyncService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSyncService")
            .field("registered_syncs", &self.syncs.len())
            .finish_non_exhaustive()
    }
}

fn sync_key(provider_id: &str, operation: &str) -> String {
    format!("{provider_id}:{operation}")
}

/// Accept every record that carries an identifier
fn process(records: &[GenericRecord]) -> ProcessedBatch {
    let mut batch = ProcessedBatch::default();
    for (index, record) in records.iter().enumerate() {
        if record.id.is_empty() {
            batch.failed += 1;
            batch
                .errors
                .push(format!("Item {index} from {} has no id", record.provider));
        } else {
            batch.created += 1;
        }
    }
    batch
}

/// `from + schedule`, or `None` without a usable schedule
fn next_sync_at(schedule: Option<&str>, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let schedule = schedule?;
    match parse_schedule(schedule) {
        Ok(interval) => from.checked_add_signed(interval),
        Err(e) => {
            warn!(schedule, error = %e, "Ignoring unusable sync schedule");
            None
        }
    }
}

fn parse_schedule(schedule: &str) -> Result<Duration> {
    let interval = humantime::parse_duration(schedule)
        .map_err(|e| Error::invalid_argument(format!("Invalid sync schedule '{schedule}': {e}")))?;
    Duration::from_std(interval)
        .map_err(|e| Error::invalid_argument(format!("Sync schedule out of range: {e}")))
}

/// Original object payload, or one rebuilt from the normalized fields
fn to_provider_payload(record: &GenericRecord) -> Map<String, Value> {
    if let Value::Object(raw) = &record.raw {
        return raw.clone();
    }

    let mut payload = record.metrics.clone();
    payload.extend(record.metadata.clone());
    let fields = [
        ("title", &record.title),
        ("description", &record.description),
        ("url", &record.url),
        ("thumbnail", &record.thumbnail),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            payload.insert(name.to_string(), Value::from(value.clone()));
        }
    }
    payload
}

fn elapsed_ms(timer: Instant) -> u64 {
    u64::try_from(timer.elapsed().as_millis()).unwrap_or(u64::MAX)
}
