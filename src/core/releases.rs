//! Release collection for plugin repositories

use crate::core::error::{RegistryError, RegistryResult};
use crate::core::source::{collect_pages, RepositorySource};
use crate::core::types::Release;
use tracing::debug;

/// Reads releases for a resolved plugin repository
pub struct ReleaseCollector<'a> {
    source: &'a dyn RepositorySource,
}

impl<'a> ReleaseCollector<'a> {
    pub fn new(source: &'a dyn RepositorySource) -> Self {
        Self { source }
    }

    /// All releases of the repository, in the order the source lists them.
    pub async fn list_all(
        &self,
        organisation: &str,
        repository: &str,
        token: &str,
    ) -> RegistryResult<Vec<Release>> {
        let source = self.source;
        collect_pages(move |page| {
            debug!(organisation, repository, page, "Listing releases");
            source.list_releases(organisation, repository, page, token)
        })
        .await
    }

    /// The release with exactly the given tag.
    pub async fn get_by_tag(
        &self,
        organisation: &str,
        repository: &str,
        tag: &str,
        token: &str,
    ) -> RegistryResult<Release> {
        debug!(organisation, repository, tag, "Fetching release by tag");
        self.source
            .get_release_by_tag(organisation, repository, tag, token)
            .await
            .map_err(RegistryError::from_release_lookup)
    }
}
