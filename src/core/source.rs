//! Upstream repository and release data source
//!
//! The resolution engine reads organisations, repositories and releases
//! through [`RepositorySource`] so that the GitHub REST client can be swapped
//! for an in-memory source in tests.

pub mod github;

pub use github::GitHubSource;

use crate::core::error::{RegistryError, SourceError};
use crate::core::types::{Page, Release, Repository};
use futures::{Stream, TryStreamExt};
use std::future::Future;

/// Number of items requested per page from paginated listings
pub const PAGE_SIZE: u32 = 30;

/// Capability interface over the upstream source of plugin repositories and releases
#[async_trait::async_trait]
pub trait RepositorySource: Send + Sync {
    /// List one page of the repositories that belong to `org`.
    async fn list_org_repositories(
        &self,
        org: &str,
        page: u32,
        token: &str,
    ) -> Result<Page<Repository>, SourceError>;

    /// List one page of the releases for `org/repo`, newest first.
    async fn list_releases(
        &self,
        org: &str,
        repo: &str,
        page: u32,
        token: &str,
    ) -> Result<Page<Release>, SourceError>;

    /// Fetch the release tagged `tag`, failing with a 404 status when absent.
    async fn get_release_by_tag(
        &self,
        org: &str,
        repo: &str,
        tag: &str,
        token: &str,
    ) -> Result<Release, SourceError>;
}

/// Lazily walk a paginated listing starting at page 1.
///
/// Each item of the stream is one page of results. The stream ends after the
/// first page that reports no next page, and stops at the first error. It
/// cannot be restarted.
pub fn paginate<T, F, Fut>(fetch: F) -> impl Stream<Item = Result<Vec<T>, RegistryError>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page<T>, SourceError>>,
{
    futures::stream::try_unfold((fetch, Some(1u32)), |(mut fetch, cursor)| async move {
        let page = match cursor {
            Some(page) => page,
            None => return Ok(None),
        };

        let Page { items, next_page } = fetch(page).await?;
        Ok::<_, RegistryError>(Some((items, (fetch, next_page))))
    })
}

/// Drain a paginated listing into a single list in page order.
pub async fn collect_pages<T, F, Fut>(fetch: F) -> Result<Vec<T>, RegistryError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page<T>, SourceError>>,
{
    paginate(fetch).try_concat().await
}
