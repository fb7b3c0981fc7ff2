//! Application Layer - Integration Hub
//!
//! Use cases that sit on top of the router. They depend only on
//! `ihub-domain` ports, so any [`IntegrationExecutor`] implementation can
//! drive them.
//!
//! ## Use Cases
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`transform`] | Normalizes provider responses into [`GenericRecord`] |
//! | [`sync`] | Pull, push, incremental and full sync over the executor |
//!
//! [`IntegrationExecutor`]: ihub_domain::ports::IntegrationExecutor

pub mod sync;
pub mod transform;

pub use sync::{DataSyncService, PullOptions, SyncConfig, SyncReport, SyncStatus};
pub use transform::{DataTransformer, GenericRecord, RecordKind};
