//! Recursive discovery of manifest files in a remote repository

use futures::FutureExt;
use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::{debug, warn};

use webscan_core::application::errors::RepositorySourceResult;
use webscan_core::domain::vulnerability::entities::ManifestFile;
use webscan_core::infrastructure::parsers::ParserRegistry;
use webscan_core::infrastructure::repository_source::{
    RepositoryLocator, RepositorySourceClient, has_parent_traversal,
};

/// Walks a repository tree and downloads every file a parser is registered for
pub struct RepositoryWalker {
    source: Arc<dyn RepositorySourceClient>,
    registry: Arc<ParserRegistry>,
}

impl RepositoryWalker {
    pub fn new(source: Arc<dyn RepositorySourceClient>, registry: Arc<ParserRegistry>) -> Self {
        Self { source, registry }
    }

    /// Collect manifests from the whole repository
    ///
    /// Files of a directory come before the contents of its subdirectories.
    /// The first listing or download error aborts the walk.
    pub async fn walk(&self, repo: &RepositoryLocator) -> RepositorySourceResult<Vec<ManifestFile>> {
        let manifests = self.walk_directory(repo, String::new()).await?;
        debug!(
            repository = %repo.full_name(),
            manifests = manifests.len(),
            "Repository walk complete"
        );
        Ok(manifests)
    }

    fn walk_directory<'a>(
        &'a self,
        repo: &'a RepositoryLocator,
        path: String,
    ) -> BoxFuture<'a, RepositorySourceResult<Vec<ManifestFile>>> {
        async move {
            let listing = self.source.list_directory(repo, &path).await?;
            let mut manifests = Vec::new();

            for file in listing.files.iter().filter(|f| self.registry.is_supported(&f.name)) {
                debug!(path = %file.path, "Downloading manifest");
                let fetched = self.source.fetch_file(repo, file).await?;
                manifests.push(ManifestFile::new(&file.name, fetched.path, fetched.content));
            }

            for directory in listing.directories {
                if has_parent_traversal(&directory) {
                    warn!(path = %directory, "Skipping directory with a parent traversal segment");
                    continue;
                }
                manifests.extend(self.walk_directory(repo, directory).await?);
            }

            Ok(manifests)
        }
        .boxed()
    }
}
