//! GitHub contents API implementation of [`RepositorySourceClient`]

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::{
    DirectoryListing, FetchedFileContent, RepositoryFile, RepositoryLocator,
    RepositorySourceClient, has_parent_traversal,
};
use crate::application::errors::{RepositorySourceError, RepositorySourceResult};
use crate::config::GitHubConfig;

#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
    path: String,
    #[serde(rename = "type")]
    entry_type: String,
    #[serde(default)]
    size: u64,
}

#[derive(Debug, Deserialize)]
struct FileContent {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

/// Reads repositories through `GET /repos/{owner}/{repo}/contents/{path}`
pub struct GitHubRepositorySource {
    client: Client,
    base_url: Url,
}

impl GitHubRepositorySource {
    pub fn new(config: &GitHubConfig) -> RepositorySourceResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| RepositorySourceError::InvalidLocator {
            message: format!("invalid GitHub base URL {}: {}", config.base_url, e),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client, base_url })
    }

    fn contents_url(&self, repo: &RepositoryLocator, path: &str) -> RepositorySourceResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| RepositorySourceError::InvalidLocator {
                    message: format!("GitHub base URL cannot be a base: {}", self.base_url),
                })?;
            segments
                .pop_if_empty()
                .extend(["repos", repo.owner.as_str(), repo.repo.as_str(), "contents"])
                .extend(path.split('/').filter(|segment| !segment.is_empty()));
        }
        Ok(url)
    }

    async fn get(&self, repo: &RepositoryLocator, path: &str) -> RepositorySourceResult<String> {
        let url = self.contents_url(repo, path)?;
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json");
        if !repo.token.is_empty() {
            request = request.header("Authorization", format!("Bearer {}", repo.token));
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        match status {
            s if s.is_success() => Ok(body),
            StatusCode::NOT_FOUND => Err(RepositorySourceError::NotFound {
                path: path.to_string(),
            }),
            s => Err(RepositorySourceError::Http {
                path: path.to_string(),
                status: s.as_u16(),
                message: body,
            }),
        }
    }
}

#[async_trait]
impl RepositorySourceClient for GitHubRepositorySource {
    async fn list_directory(
        &self,
        repo: &RepositoryLocator,
        path: &str,
    ) -> RepositorySourceResult<DirectoryListing> {
        if has_parent_traversal(path) {
            tracing::warn!(path = %path, "Refusing to list a path with a parent directory segment");
            return Ok(DirectoryListing::default());
        }

        tracing::debug!(repository = %repo.full_name(), path = %path, "Listing directory");
        let body = self.get(repo, path).await?;
        let entries: Vec<ContentEntry> =
            serde_json::from_str(&body).map_err(|e| RepositorySourceError::Decode {
                path: path.to_string(),
                message: format!("expected a directory listing: {}", e),
            })?;

        let mut listing = DirectoryListing::default();
        for entry in entries {
            match entry.entry_type.as_str() {
                "file" => listing.files.push(RepositoryFile {
                    name: entry.name,
                    path: entry.path,
                    size: entry.size,
                }),
                "dir" => listing.directories.push(entry.path),
                _ => {}
            }
        }

        Ok(listing)
    }

    async fn fetch_file(
        &self,
        repo: &RepositoryLocator,
        file: &RepositoryFile,
    ) -> RepositorySourceResult<FetchedFileContent> {
        if has_parent_traversal(&file.path) {
            tracing::warn!(path = %file.path, "Refusing to download a path with a parent directory segment");
            return Err(RepositorySourceError::NotFound {
                path: file.path.clone(),
            });
        }

        tracing::debug!(repository = %repo.full_name(), path = %file.path, "Downloading file");
        let body = self.get(repo, &file.path).await?;
        let decode_error = |message: String| RepositorySourceError::Decode {
            path: file.path.clone(),
            message,
        };

        let payload: FileContent =
            serde_json::from_str(&body).map_err(|e| decode_error(e.to_string()))?;
        if let Some(encoding) = payload.encoding.as_deref().filter(|e| *e != "base64") {
            return Err(decode_error(format!("unsupported content encoding {}", encoding)));
        }

        let encoded: String = payload
            .content
            .unwrap_or_default()
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| decode_error(e.to_string()))?;
        let content = String::from_utf8(bytes).map_err(|e| decode_error(e.to_string()))?;

        Ok(FetchedFileContent {
            path: file.path.clone(),
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contents_url_encodes_segments() {
        let source = GitHubRepositorySource::new(&GitHubConfig::default()).unwrap();
        let repo = RepositoryLocator::new("octo", "app", "", 1);

        assert_eq!(
            source.contents_url(&repo, "").unwrap().as_str(),
            "https://api.github.com/repos/octo/app/contents"
        );
        assert_eq!(
            source.contents_url(&repo, "web/my app/package-lock.json").unwrap().as_str(),
            "https://api.github.com/repos/octo/app/contents/web/my%20app/package-lock.json"
        );
    }
}
