//! Provider Adapter Port
//!
//! Contract implemented by every concrete third-party integration. The
//! router only ever sees adapters through this trait.

use crate::error::Result;
use crate::value_objects::{Capability, IntegrationRequest, IntegrationResponse};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Live adapter registered with the router
///
/// # Example
///
/// ```ignore
/// use ihub_domain::ports::ProviderAdapter;
///
/// async fn run(adapter: &dyn ProviderAdapter, request: &IntegrationRequest) -> Result<()> {
///     if adapter.supports(&request.operation, &request.capability) {
///         adapter.execute(request).await?;
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Stable provider id; must not contain `_`
    fn id(&self) -> &str;

    /// Display name
    fn name(&self) -> &str;

    /// Capabilities this adapter serves
    fn capabilities(&self) -> Vec<Capability>;

    /// True if the adapter can run `operation` within `capability`
    fn supports(&self, operation: &str, capability: &Capability) -> bool;

    /// Execute a request against the upstream service
    async fn execute(&self, request: &IntegrationRequest) -> Result<IntegrationResponse>;

    /// Optional liveness probe
    ///
    /// `None` means the adapter has no probe.
    async fn health_check(&self) -> Option<bool> {
        None
    }

    /// Summary for listings
    fn info(&self) -> AdapterInfo {
        AdapterInfo {
            id: self.id().to_string(),
            name: self.name().to_string(),
            capabilities: self.capabilities(),
            status: AdapterStatus::Active,
        }
    }
}

/// Adapter availability as reported by the adapter itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AdapterStatus {
    /// Ready to serve requests
    #[default]
    Active,
    /// Registered but not serving
    Inactive,
}

/// Adapter summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterInfo {
    /// Provider id
    pub id: String,
    /// Display name
    pub name: String,
    /// Served capabilities
    pub capabilities: Vec<Capability>,
    /// Self-reported status
    pub status: AdapterStatus,
}
