//! Source repository abstraction
//!
//! A scan only needs two capabilities from a hosting service: listing a
//! directory and downloading a file. [`RepositorySourceClient`] captures them;
//! [`github::GitHubRepositorySource`] implements them over the GitHub
//! contents API.

pub mod github;

pub use github::GitHubRepositorySource;

use async_trait::async_trait;
use std::fmt;

use crate::application::errors::{ApplicationError, RepositorySourceResult};

/// Repository coordinates and the credential used to read it
#[derive(Clone, PartialEq, Eq)]
pub struct RepositoryLocator {
    /// Account or organization owning the repository
    pub owner: String,
    pub repo: String,
    /// Access token; an empty token means anonymous access
    pub token: String,
    /// Internal identifier of the repository, carried into the report
    pub repo_id: i64,
}

impl RepositoryLocator {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
        repo_id: i64,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            token: token.into(),
            repo_id,
        }
    }

    /// Reject coordinates that cannot name a repository
    pub fn validate(&self) -> Result<(), ApplicationError> {
        for (field, value) in [("owner", &self.owner), ("repo", &self.repo)] {
            if value.is_empty() {
                return Err(ApplicationError::configuration(format!(
                    "repository {} cannot be empty",
                    field
                )));
            }
            if value.contains('/') || value.chars().any(char::is_whitespace) || value == ".." {
                return Err(ApplicationError::configuration(format!(
                    "repository {} contains invalid characters: {:?}",
                    field, value
                )));
            }
        }
        Ok(())
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl fmt::Debug for RepositoryLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryLocator")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("token", &if self.token.is_empty() { "" } else { "[REDACTED]" })
            .field("repo_id", &self.repo_id)
            .finish()
    }
}

/// A file entry in a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryFile {
    pub name: String,
    /// Path relative to the repository root
    pub path: String,
    pub size: u64,
}

/// Entries of one directory, split by kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryListing {
    pub files: Vec<RepositoryFile>,
    /// Paths of subdirectories, relative to the repository root
    pub directories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedFileContent {
    pub path: String,
    pub content: String,
}

/// Whether a repository path contains a `..` segment
pub fn has_parent_traversal(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| segment == "..")
}

/// Listing and download capability of a source hosting service
#[async_trait]
pub trait RepositorySourceClient: Send + Sync {
    /// List one directory; `""` is the repository root
    async fn list_directory(
        &self,
        repo: &RepositoryLocator,
        path: &str,
    ) -> RepositorySourceResult<DirectoryListing>;

    /// Download the full content of a file
    async fn fetch_file(
        &self,
        repo: &RepositoryLocator,
        file: &RepositoryFile,
    ) -> RepositorySourceResult<FetchedFileContent>;
}
