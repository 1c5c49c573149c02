//! Infrastructure Layer - External concerns and implementations
//!
//! Manifest parsing, the vulnerability database client and repository
//! hosting access.

pub mod api_clients;
pub mod parsers;
pub mod repository_source;
pub mod resilience;

pub use api_clients::{OsvClient, VulnerabilityApiClient};
pub use parsers::{ManifestKind, ParserRegistry, extract_lockfile};
pub use repository_source::{
    DirectoryListing, FetchedFileContent, GitHubRepositorySource, RepositoryFile,
    RepositoryLocator, RepositorySourceClient,
};
pub use resilience::{RetryConfig, retry_with_backoff};
