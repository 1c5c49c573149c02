//! Batched vulnerability lookup with bounded hydration
//!
//! Packages are mapped to query identities, submitted in chunks no larger
//! than the database's per-request cap, and the minimal id lists that come
//! back are hydrated into full records. Hydration fetches each distinct id
//! once under a semaphore and writes it back by (query, position), so the
//! completion order of the fetches never shows in the result.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use webscan_core::application::errors::VulnerabilityError;
use webscan_core::config::OsvConfig;
use webscan_core::domain::vulnerability::{
    entities::{PackageDetails, Vulnerability},
    query::{BatchedQuery, BatchedResponse, Query, QueryIdentity},
};
use webscan_core::infrastructure::api_clients::VulnerabilityApiClient;

/// Largest batch the OSV API accepts in one request
pub const DEFAULT_MAX_QUERIES_PER_REQUEST: usize = 1000;
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 25;

/// Full vulnerability records for each query, in query order
pub type HydratedResults = Vec<Vec<Vulnerability>>;

pub struct VulnerabilityQueryService {
    client: Arc<dyn VulnerabilityApiClient>,
    max_queries_per_request: usize,
    max_concurrent_requests: usize,
}

impl VulnerabilityQueryService {
    pub fn new(client: Arc<dyn VulnerabilityApiClient>, config: &OsvConfig) -> Self {
        Self::with_limits(
            client,
            config.max_queries_per_request,
            config.max_concurrent_requests,
        )
    }

    pub fn with_limits(
        client: Arc<dyn VulnerabilityApiClient>,
        max_queries_per_request: usize,
        max_concurrent_requests: usize,
    ) -> Self {
        Self {
            client,
            max_queries_per_request: max_queries_per_request.max(1),
            max_concurrent_requests: max_concurrent_requests.max(1),
        }
    }

    /// Map every package to its query, failing on the first one without an identity
    pub fn build_queries(
        packages: &[PackageDetails],
        source: Option<&str>,
    ) -> Result<Vec<Query>, VulnerabilityError> {
        packages
            .iter()
            .map(|package| {
                let identity =
                    QueryIdentity::for_package(package).ok_or_else(|| VulnerabilityError::Identity {
                        package: package.dedup_key(),
                    })?;
                let mut query = Query::new(identity);
                query.source = source.map(str::to_string);
                query.dep_groups = package.dep_groups.clone();
                Ok(query)
            })
            .collect()
    }

    /// Look up and hydrate vulnerabilities, one result list per package
    pub async fn query_packages(
        &self,
        packages: &[PackageDetails],
    ) -> Result<HydratedResults, VulnerabilityError> {
        let queries = Self::build_queries(packages, None)?;
        let response = self.query_batched(&queries).await?;
        self.hydrate(&response).await
    }

    /// Submit queries in chunks and concatenate the responses in order
    pub async fn query_batched(&self, queries: &[Query]) -> Result<BatchedResponse, VulnerabilityError> {
        let mut merged = BatchedResponse::default();
        if queries.is_empty() {
            return Ok(merged);
        }

        let chunks = queries.chunks(self.max_queries_per_request);
        debug!(
            queries = queries.len(),
            requests = chunks.len(),
            "Submitting vulnerability queries"
        );

        for chunk in chunks {
            let batch = BatchedQuery {
                queries: chunk.to_vec(),
            };
            let response = self.client.query_batch(&batch).await?;
            merged.results.extend(response.results);
        }

        Ok(merged)
    }

    /// Replace minimal id lists with full records
    pub async fn hydrate(&self, response: &BatchedResponse) -> Result<HydratedResults, VulnerabilityError> {
        // distinct ids in first-seen order, each with every slot that references it
        let mut slots_by_id: HashMap<&str, Vec<(usize, usize)>> = HashMap::new();
        let mut distinct_ids: Vec<&str> = Vec::new();
        for (query_index, result) in response.results.iter().enumerate() {
            for (position, minimal) in result.vulns.iter().enumerate() {
                slots_by_id
                    .entry(minimal.id.as_str())
                    .or_insert_with(|| {
                        distinct_ids.push(minimal.id.as_str());
                        Vec::new()
                    })
                    .push((query_index, position));
            }
        }

        let mut hydrated: Vec<Vec<Option<Vulnerability>>> = response
            .results
            .iter()
            .map(|result| vec![None; result.vulns.len()])
            .collect();

        if distinct_ids.is_empty() {
            return Ok(vec![Vec::new(); response.results.len()]);
        }

        info!(
            vulnerabilities = distinct_ids.len(),
            "Hydrating vulnerability records"
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_requests));
        let cancel = CancellationToken::new();
        let mut join_set: JoinSet<Result<(String, Vulnerability), VulnerabilityError>> =
            JoinSet::new();

        for id in &distinct_ids {
            let id = id.to_string();
            let client = Arc::clone(&self.client);
            let permit = Arc::clone(&semaphore);
            let cancel = cancel.clone();

            join_set.spawn(async move {
                let _permit = tokio::select! {
                    _ = cancel.cancelled() => return Err(VulnerabilityError::Cancelled),
                    permit = permit.acquire_owned() => permit.map_err(|e| VulnerabilityError::TaskFailed {
                        message: format!("Failed to acquire semaphore: {}", e),
                    })?,
                };
                tokio::select! {
                    _ = cancel.cancelled() => Err(VulnerabilityError::Cancelled),
                    result = client.get_vulnerability(&id) => result.map(|record| (id.clone(), record)),
                }
            });
        }

        while let Some(joined) = join_set.join_next().await {
            let failure = match joined {
                Ok(Ok((id, vulnerability))) => {
                    for &(query_index, position) in slots_by_id.get(id.as_str()).into_iter().flatten() {
                        hydrated[query_index][position] = Some(vulnerability.clone());
                    }
                    continue;
                }
                Ok(Err(e)) => e,
                Err(e) if e.is_cancelled() => continue,
                Err(e) => VulnerabilityError::TaskFailed {
                    message: e.to_string(),
                },
            };

            warn!(error = %failure, "Vulnerability hydration failed, cancelling outstanding fetches");
            cancel.cancel();
            join_set.abort_all();
            while join_set.join_next().await.is_some() {}
            return Err(failure);
        }

        hydrated
            .into_iter()
            .zip(&response.results)
            .map(|(slots, result)| {
                slots
                    .into_iter()
                    .zip(&result.vulns)
                    .map(|(slot, minimal)| {
                        slot.ok_or_else(|| VulnerabilityError::TaskFailed {
                            message: format!("no record hydrated for {}", minimal.id),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect()
    }
}
