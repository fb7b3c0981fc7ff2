//! Integration Executor Port
//!
//! What consumers such as the sync service need from the router.

use crate::error::Result;
use crate::value_objects::{IntegrationRequest, IntegrationResponse};
use async_trait::async_trait;

/// Runs requests against the best available provider(s)
#[async_trait]
pub trait IntegrationExecutor: Send + Sync {
    /// Execute with sequential failover over ranked candidates
    async fn execute(
        &self,
        request: &IntegrationRequest,
        preferred: Option<&[String]>,
    ) -> Result<IntegrationResponse>;

    /// Execute on up to `count` candidates concurrently
    async fn execute_parallel(
        &self,
        request: &IntegrationRequest,
        count: usize,
        preferred: Option<&[String]>,
    ) -> Result<Vec<IntegrationResponse>>;
}
