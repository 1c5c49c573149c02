//! Repository scanning use case

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use webscan_core::application::errors::ApplicationError;
use webscan_core::config::OsvConfig;
use webscan_core::domain::vulnerability::entities::ManifestFile;
use webscan_core::infrastructure::api_clients::VulnerabilityApiClient;
use webscan_core::infrastructure::parsers::{ParserRegistry, extract_lockfile};
use webscan_core::infrastructure::repository_source::{RepositoryLocator, RepositorySourceClient};

use crate::domain::{ScanReport, SourceInfo, VulnerabilityResults};
use crate::services::{
    RepositoryWalker, ScannedPackage, VulnerabilityQueryService, add_clean_sources, build_report,
    build_vulnerability_results,
};

/// Use case for scanning every manifest of a repository
pub struct ScanRepositoryUseCase {
    walker: RepositoryWalker,
    registry: Arc<ParserRegistry>,
    query_service: VulnerabilityQueryService,
}

impl ScanRepositoryUseCase {
    /// Create a new use case instance
    pub fn new(
        source: Arc<dyn RepositorySourceClient>,
        vulnerability_client: Arc<dyn VulnerabilityApiClient>,
        registry: Arc<ParserRegistry>,
        config: &OsvConfig,
    ) -> Self {
        Self::with_query_service(
            source,
            registry,
            VulnerabilityQueryService::new(vulnerability_client, config),
        )
    }

    pub fn with_query_service(
        source: Arc<dyn RepositorySourceClient>,
        registry: Arc<ParserRegistry>,
        query_service: VulnerabilityQueryService,
    ) -> Self {
        Self {
            walker: RepositoryWalker::new(source, Arc::clone(&registry)),
            registry,
            query_service,
        }
    }

    /// Scan a repository end to end
    ///
    /// Returns the full report or the first error; no partial report is
    /// produced.
    pub async fn execute(&self, repo: &RepositoryLocator) -> Result<ScanReport, ApplicationError> {
        let start_time = Instant::now();
        repo.validate()?;

        info!(repository = %repo.full_name(), repo_id = repo.repo_id, "Starting repository scan");

        let manifests = self.walker.walk(repo).await?;
        let mut results = self.scan_manifests(&manifests).await?;
        add_clean_sources(&mut results, &manifests);

        let report = build_report(repo.repo_id, &manifests, &results);

        info!(
            repository = %repo.full_name(),
            manifests = manifests.len(),
            vulnerabilities = report.vulnerability_count(),
            high = report.counts.high,
            moderate = report.counts.moderate,
            low = report.counts.low,
            duration_ms = start_time.elapsed().as_millis() as u64,
            "Repository scan complete"
        );

        Ok(report)
    }

    /// Parse manifests and look up vulnerabilities for their packages
    ///
    /// The first manifest that fails to parse aborts the scan.
    pub async fn scan_manifests(
        &self,
        manifests: &[ManifestFile],
    ) -> Result<VulnerabilityResults, ApplicationError> {
        let mut scanned = Vec::new();
        for manifest in manifests {
            let lockfile = extract_lockfile(&self.registry, manifest)?;
            let source = SourceInfo::lockfile(&lockfile.file_path);
            scanned.extend(lockfile.packages.into_iter().map(|package| ScannedPackage {
                package,
                source: source.clone(),
            }));
        }

        let total = scanned.len();
        scanned.retain(|entry| entry.package.has_queryable_identity());
        if scanned.len() < total {
            info!(
                skipped = total - scanned.len(),
                "Skipping packages without a version, commit or PURL"
            );
        }

        if scanned.is_empty() {
            debug!("No scannable packages found");
            return Ok(VulnerabilityResults::default());
        }

        let mut queries = Vec::with_capacity(scanned.len());
        for entry in &scanned {
            queries.extend(VulnerabilityQueryService::build_queries(
                std::slice::from_ref(&entry.package),
                Some(entry.source.path.as_str()),
            )?);
        }

        let response = self.query_service.query_batched(&queries).await?;
        let hits = self.query_service.hydrate(&response).await?;

        Ok(build_vulnerability_results(&scanned, &hits))
    }
}
