//! In-memory collaborators for webscan-deps tests

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use webscan_core::application::errors::{
    RepositorySourceError, RepositorySourceResult, VulnerabilityError,
};
use webscan_core::domain::vulnerability::{
    entities::Vulnerability,
    query::{BatchedQuery, BatchedResponse, MinimalResponse, MinimalVulnerability, QueryIdentity},
};
use webscan_core::infrastructure::api_clients::VulnerabilityApiClient;
use webscan_core::infrastructure::repository_source::{
    DirectoryListing, FetchedFileContent, RepositoryFile, RepositoryLocator,
    RepositorySourceClient,
};

/// Key a query is answered by: `name@version`, the commit, or the PURL
pub fn identity_key(identity: &QueryIdentity) -> String {
    match identity {
        QueryIdentity::Package { package, version } => format!("{}@{}", package.name, version),
        QueryIdentity::Commit { commit } => commit.clone(),
        QueryIdentity::Purl { package } => package.purl.clone(),
    }
}

/// Vulnerability database that answers from memory and records its traffic
#[derive(Clone, Default)]
pub struct MockVulnerabilityClient {
    hits: Arc<Mutex<HashMap<String, Vec<String>>>>,
    records: Arc<Mutex<HashMap<String, Vulnerability>>>,
    failing_ids: Arc<Mutex<HashSet<String>>>,
    slow_ids: Arc<Mutex<HashSet<String>>>,
    batches: Arc<Mutex<Vec<Vec<QueryIdentity>>>>,
    fetched: Arc<Mutex<Vec<String>>>,
    completed_fetches: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    fetch_delay: Arc<Mutex<Duration>>,
}

impl MockVulnerabilityClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `vulnerabilities` for the query keyed by `key`
    pub fn add_hits(&self, key: &str, vulnerabilities: &[Vulnerability]) {
        self.hits.lock().unwrap().insert(
            key.to_string(),
            vulnerabilities.iter().map(|v| v.id.clone()).collect(),
        );
        let mut records = self.records.lock().unwrap();
        for vulnerability in vulnerabilities {
            records.insert(vulnerability.id.clone(), vulnerability.clone());
        }
    }

    pub fn fail_fetch(&self, id: &str) {
        self.failing_ids.lock().unwrap().insert(id.to_string());
    }

    /// Make fetching `id` hang long enough to be cancelled
    pub fn slow_fetch(&self, id: &str) {
        self.slow_ids.lock().unwrap().insert(id.to_string());
    }

    pub fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock().unwrap() = delay;
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().iter().map(Vec::len).collect()
    }

    pub fn submitted(&self) -> Vec<QueryIdentity> {
        self.batches.lock().unwrap().iter().flatten().cloned().collect()
    }

    pub fn fetched_ids(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub fn completed_fetches(&self) -> usize {
        self.completed_fetches.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VulnerabilityApiClient for MockVulnerabilityClient {
    async fn query_batch(&self, batch: &BatchedQuery) -> Result<BatchedResponse, VulnerabilityError> {
        let identities: Vec<QueryIdentity> =
            batch.queries.iter().map(|q| q.identity.clone()).collect();
        let hits = self.hits.lock().unwrap().clone();

        let results = identities
            .iter()
            .map(|identity| MinimalResponse {
                vulns: hits
                    .get(&identity_key(identity))
                    .into_iter()
                    .flatten()
                    .map(|id| MinimalVulnerability { id: id.clone() })
                    .collect(),
            })
            .collect();

        self.batches.lock().unwrap().push(identities);
        Ok(BatchedResponse { results })
    }

    async fn get_vulnerability(&self, id: &str) -> Result<Vulnerability, VulnerabilityError> {
        self.fetched.lock().unwrap().push(id.to_string());
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay = *self.fetch_delay.lock().unwrap();
        let slow = self.slow_ids.lock().unwrap().contains(id);
        if slow {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        } else if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_ids.lock().unwrap().contains(id) {
            return Err(VulnerabilityError::http(503, "service unavailable"));
        }

        let record = self.records.lock().unwrap().get(id).cloned();
        self.completed_fetches.fetch_add(1, Ordering::SeqCst);
        record.ok_or_else(|| VulnerabilityError::http(404, format!("{} not found", id)))
    }
}

/// Repository held in memory: directory path -> listing, file path -> content
#[derive(Clone, Default)]
pub struct MockRepositorySource {
    listings: Arc<Mutex<HashMap<String, DirectoryListing>>>,
    contents: Arc<Mutex<HashMap<String, String>>>,
    failing_paths: Arc<Mutex<HashSet<String>>>,
    downloads: Arc<Mutex<Vec<String>>>,
}

impl MockRepositorySource {
    pub fn new() -> Self {
        let source = Self::default();
        source.add_directory("");
        source
    }

    pub fn add_directory(&self, path: &str) {
        let mut listings = self.listings.lock().unwrap();
        listings.entry(path.to_string()).or_default();
        if let Some(parent) = parent_of(path) {
            let parent_listing = listings.entry(parent.to_string()).or_default();
            if !parent_listing.directories.iter().any(|d| d == path) {
                parent_listing.directories.push(path.to_string());
            }
        }
    }

    /// Add a file, creating its directories
    pub fn add_file(&self, path: &str, content: &str) {
        let (directory, name) = match path.rsplit_once('/') {
            Some((directory, name)) => (directory, name),
            None => ("", path),
        };
        let mut ancestors = Vec::new();
        let mut current = Some(directory);
        while let Some(dir) = current.filter(|d| !d.is_empty()) {
            ancestors.push(dir.to_string());
            current = parent_of(dir);
        }
        for ancestor in ancestors.iter().rev() {
            self.add_directory(ancestor);
        }

        self.listings
            .lock()
            .unwrap()
            .entry(directory.to_string())
            .or_default()
            .files
            .push(RepositoryFile {
                name: name.to_string(),
                path: path.to_string(),
                size: content.len() as u64,
            });
        self.contents
            .lock()
            .unwrap()
            .insert(path.to_string(), content.to_string());
    }

    pub fn fail_path(&self, path: &str) {
        self.failing_paths.lock().unwrap().insert(path.to_string());
    }

    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }
}

fn parent_of(path: &str) -> Option<&str> {
    if path.is_empty() {
        return None;
    }
    Some(path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or(""))
}

#[async_trait]
impl RepositorySourceClient for MockRepositorySource {
    async fn list_directory(
        &self,
        _repo: &RepositoryLocator,
        path: &str,
    ) -> RepositorySourceResult<DirectoryListing> {
        if self.failing_paths.lock().unwrap().contains(path) {
            return Err(RepositorySourceError::Http {
                path: path.to_string(),
                status: 500,
                message: "listing failed".to_string(),
            });
        }
        self.listings
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| RepositorySourceError::NotFound {
                path: path.to_string(),
            })
    }

    async fn fetch_file(
        &self,
        _repo: &RepositoryLocator,
        file: &RepositoryFile,
    ) -> RepositorySourceResult<FetchedFileContent> {
        if self.failing_paths.lock().unwrap().contains(&file.path) {
            return Err(RepositorySourceError::Http {
                path: file.path.clone(),
                status: 500,
                message: "download failed".to_string(),
            });
        }
        self.downloads.lock().unwrap().push(file.path.clone());
        let content = self
            .contents
            .lock()
            .unwrap()
            .get(&file.path)
            .cloned()
            .ok_or_else(|| RepositorySourceError::NotFound {
                path: file.path.clone(),
            })?;
        Ok(FetchedFileContent {
            path: file.path.clone(),
            content,
        })
    }
}
