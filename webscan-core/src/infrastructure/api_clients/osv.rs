//! OSV (Open Source Vulnerabilities) API client

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use super::traits::VulnerabilityApiClient;
use crate::application::errors::VulnerabilityError;
use crate::config::OsvConfig;
use crate::domain::vulnerability::{
    entities::Vulnerability,
    query::{BatchedQuery, BatchedResponse},
};
use crate::infrastructure::resilience::{RetryConfig, retry_with_backoff};

/// Client for the OSV batch query and vulnerability detail endpoints
pub struct OsvClient {
    client: Client,
    query_url: String,
    vulns_url: String,
    retry_config: RetryConfig,
}

impl OsvClient {
    /// Create a new OSV client from configuration
    pub fn new(config: &OsvConfig) -> Result<Self, VulnerabilityError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(VulnerabilityError::Network)?;

        Ok(Self {
            client,
            query_url: config.query_url.clone(),
            vulns_url: config.vulns_url.trim_end_matches('/').to_string(),
            retry_config: config.retry.to_retry_config(),
        })
    }

    /// Replace the retry policy
    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Send a request built by `build` under the retry policy and return the 200 body
    async fn send_with_retry<F>(&self, build: F) -> Result<String, VulnerabilityError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        retry_with_backoff(&self.retry_config, || async {
            let response = build().send().await?;
            let status = response.status();
            let body = response.text().await?;

            if status != StatusCode::OK {
                return Err(VulnerabilityError::http(status.as_u16(), body));
            }
            Ok::<_, VulnerabilityError>(body)
        })
        .await
    }
}

#[async_trait]
impl VulnerabilityApiClient for OsvClient {
    async fn query_batch(&self, batch: &BatchedQuery) -> Result<BatchedResponse, VulnerabilityError> {
        tracing::debug!(queries = batch.queries.len(), "Submitting OSV batch query");

        let body = self
            .send_with_retry(|| self.client.post(&self.query_url).json(batch))
            .await?;

        let response: BatchedResponse = serde_json::from_str(&body)
            .map_err(|e| VulnerabilityError::decode(format!("batch response: {}", e)))?;

        if response.results.len() != batch.queries.len() {
            return Err(VulnerabilityError::decode(format!(
                "batch response has {} results for {} queries",
                response.results.len(),
                batch.queries.len()
            )));
        }

        Ok(response)
    }

    async fn get_vulnerability(&self, id: &str) -> Result<Vulnerability, VulnerabilityError> {
        let url = format!("{}/{}", self.vulns_url, id);
        tracing::debug!(id = %id, "Fetching OSV vulnerability record");

        let body = self.send_with_retry(|| self.client.get(&url)).await?;

        serde_json::from_str(&body)
            .map_err(|e| VulnerabilityError::decode(format!("vulnerability {}: {}", id, e)))
    }
}
