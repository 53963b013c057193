//! GitHub REST API implementation of the repository source

use crate::core::error::SourceError;
use crate::core::fetcher::GITHUB_API_VERSION;
use crate::core::source::{RepositorySource, PAGE_SIZE};
use crate::core::types::{Page, Release, Repository};
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, LINK};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Public GitHub API endpoint
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

const GITHUB_JSON_CONTENT_TYPE: &str = "application/vnd.github+json";

/// Reads repositories and releases from the GitHub REST API using the
/// caller's personal access token.
#[derive(Debug, Clone)]
pub struct GitHubSource {
    client: Client,
    api_url: Url,
}

impl GitHubSource {
    /// Create a source for the given API base URL (GitHub Enterprise installs
    /// use a different host than the public API).
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(concat!("gh-plugin-registry/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Self::with_client(client, api_url)
    }

    /// Create a source that shares an existing client
    pub fn with_client(client: Client, api_url: &str) -> Result<Self, SourceError> {
        let api_url = Url::parse(api_url).map_err(|e| {
            SourceError::Transport(format!("Invalid GitHub API URL {}: {}", api_url, e))
        })?;

        if api_url.cannot_be_a_base() {
            return Err(SourceError::Transport(format!(
                "Invalid GitHub API URL: {}",
                api_url
            )));
        }

        Ok(Self { client, api_url })
    }

    /// Build an endpoint URL from path segments, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url, SourceError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                SourceError::Transport(format!("Invalid GitHub API URL: {}", self.api_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        token: &str,
    ) -> Result<(T, Option<u32>), SourceError> {
        debug!(url = %url, "Requesting GitHub API");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, GITHUB_JSON_CONTENT_TYPE)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::status(status.as_u16(), message));
        }

        let next_page = next_page_from_headers(response.headers());
        let body = response.json::<T>().await?;
        Ok((body, next_page))
    }

    fn paged(&self, segments: &[&str], page: u32) -> Result<Url, SourceError> {
        let mut url = self.endpoint(segments)?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("per_page", &PAGE_SIZE.to_string());
        Ok(url)
    }
}

#[async_trait::async_trait]
impl RepositorySource for GitHubSource {
    async fn list_org_repositories(
        &self,
        org: &str,
        page: u32,
        token: &str,
    ) -> Result<Page<Repository>, SourceError> {
        let url = self.paged(&["orgs", org, "repos"], page)?;
        let (items, next_page) = self.get_json(url, token).await?;
        Ok(Page { items, next_page })
    }

    async fn list_releases(
        &self,
        org: &str,
        repo: &str,
        page: u32,
        token: &str,
    ) -> Result<Page<Release>, SourceError> {
        let url = self.paged(&["repos", org, repo, "releases"], page)?;
        let (items, next_page) = self.get_json(url, token).await?;
        Ok(Page { items, next_page })
    }

    async fn get_release_by_tag(
        &self,
        org: &str,
        repo: &str,
        tag: &str,
        token: &str,
    ) -> Result<Release, SourceError> {
        let url = self.endpoint(&["repos", org, repo, "releases", "tags", tag])?;
        let (release, _) = self.get_json(url, token).await?;
        Ok(release)
    }
}

/// Read the next page number from an RFC 5988 `Link` header, e.g.
/// `<https://api.github.com/orgs/acme/repos?page=2>; rel="next"`.
fn next_page_from_headers(headers: &HeaderMap) -> Option<u32> {
    let link = headers.get(LINK)?.to_str().ok()?;
    next_page_from_link(link)
}

fn next_page_from_link(link: &str) -> Option<u32> {
    link.split(',').find_map(|part| {
        let mut sections = part.split(';');
        let target = sections.next()?.trim();
        let is_next = sections.any(|param| param.trim() == r#"rel="next""#);
        if !is_next {
            return None;
        }

        let target = target.strip_prefix('<')?.strip_suffix('>')?;
        let url = Url::parse(target).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_next_page_from_link_header() {
        let link = r#"<https://api.github.com/organizations/1/repos?page=2&per_page=30>; rel="next", <https://api.github.com/organizations/1/repos?page=5&per_page=30>; rel="last""#;
        assert_eq!(next_page_from_link(link), Some(2));

        let last = r#"<https://api.github.com/organizations/1/repos?page=4&per_page=30>; rel="prev", <https://api.github.com/organizations/1/repos?page=1&per_page=30>; rel="first""#;
        assert_eq!(next_page_from_link(last), None);
    }

    #[tokio::test]
    async fn test_lists_org_repositories_with_next_page() {
        let mock_server = MockServer::start().await;
        let next_link = format!(
            r#"<{}/orgs/acme/repos?page=2&per_page=30>; rel="next""#,
            mock_server.uri()
        );

        Mock::given(method("GET"))
            .and(path("/orgs/acme/repos"))
            .and(query_param("page", "1"))
            .and(query_param("per_page", "30"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("link", next_link.as_str())
                    .set_body_string(
                        r#"[{"name":"provider-aws","owner":{"login":"acme"},"private":true}]"#,
                    ),
            )
            .mount(&mock_server)
            .await;

        let source = GitHubSource::new(&mock_server.uri(), TIMEOUT).unwrap();
        let page = source
            .list_org_repositories("acme", 1, "test-token")
            .await
            .unwrap();

        assert_eq!(page.items, vec![Repository::new("acme", "provider-aws")]);
        assert_eq!(page.next_page, Some(2));
    }

    #[tokio::test]
    async fn test_release_by_tag_maps_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/acme/provider-aws/releases/tags/v1.0.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"tag_name":"v1.0.0","assets":[{"name":"provider-aws_1.0.0_SHA256SUMS","url":"https://api.github.com/repos/acme/provider-aws/releases/assets/7","size":120}]}"#,
            ))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/repos/acme/provider-aws/releases/tags/v9.9.9"))
            .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"message":"Not Found"}"#))
            .mount(&mock_server)
            .await;

        let source = GitHubSource::new(&mock_server.uri(), TIMEOUT).unwrap();
        let release = source
            .get_release_by_tag("acme", "provider-aws", "v1.0.0", "test-token")
            .await
            .unwrap();
        assert_eq!(release.tag_name, "v1.0.0");
        assert_eq!(release.assets.len(), 1);
        assert_eq!(release.assets[0].name, "provider-aws_1.0.0_SHA256SUMS");

        let err = source
            .get_release_by_tag("acme", "provider-aws", "v9.9.9", "test-token")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(404));
    }
}
