//! Test helper functions for webscan-core

use webscan_core::config::{GitHubConfig, OsvConfig, RetryConfigSerializable};
use webscan_core::domain::vulnerability::entities::ManifestFile;
use webscan_core::infrastructure::repository_source::RepositoryLocator;

/// OSV configuration pointing at a mock server, retrying without delay
pub fn osv_config_for(server_uri: &str) -> OsvConfig {
    OsvConfig {
        query_url: format!("{}/v1/querybatch", server_uri),
        vulns_url: format!("{}/v1/vulns", server_uri),
        timeout_seconds: 5,
        retry: RetryConfigSerializable {
            max_attempts: 4,
            base_delay_ms: 0,
            jitter_multiplier: 0.0,
        },
        ..OsvConfig::default()
    }
}

/// GitHub configuration pointing at a mock server
pub fn github_config_for(server_uri: &str) -> GitHubConfig {
    GitHubConfig {
        base_url: server_uri.to_string(),
        timeout_seconds: 5,
        ..GitHubConfig::default()
    }
}

pub fn test_locator() -> RepositoryLocator {
    RepositoryLocator::new("octo", "webapp", "test-token", 42)
}

/// Manifest whose name is the last segment of `path`
pub fn manifest(path: &str, content: &str) -> ManifestFile {
    let name = path.rsplit('/').next().unwrap_or(path);
    ManifestFile::new(name, path, content)
}
