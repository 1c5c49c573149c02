//! Vulnerability database client abstraction

use async_trait::async_trait;

use crate::application::errors::VulnerabilityError;
use crate::domain::vulnerability::{
    entities::Vulnerability,
    query::{BatchedQuery, BatchedResponse},
};

/// Trait for vulnerability database clients
#[async_trait]
pub trait VulnerabilityApiClient: Send + Sync {
    /// Submit one batch request; `results[i]` of the response answers `queries[i]`
    ///
    /// Callers keep batches within the database's per-request cap.
    async fn query_batch(&self, batch: &BatchedQuery) -> Result<BatchedResponse, VulnerabilityError>;

    /// Fetch the full record for one vulnerability id
    async fn get_vulnerability(&self, id: &str) -> Result<Vulnerability, VulnerabilityError>;
}
