//! Release asset downloads

use crate::core::error::SourceError;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Content type GitHub requires to serve raw asset bytes from private repositories
pub const DOWNLOAD_CONTENT_TYPE: &str = "application/octet-stream";

/// GitHub REST API version sent with every upstream request
pub const GITHUB_API_VERSION: &str = "2022-11-28";

/// Default timeout for asset downloads
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches the raw contents of a release asset
#[async_trait::async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// Download the bytes behind `url`, authenticating with `token`.
    async fn fetch(&self, url: &str, token: &str) -> Result<Vec<u8>, SourceError>;
}

/// reqwest backed fetcher for GitHub release assets
#[derive(Debug, Clone)]
pub struct HttpArtifactFetcher {
    client: Client,
}

impl HttpArtifactFetcher {
    /// Create a fetcher whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(concat!("gh-plugin-registry/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wrap an existing client, sharing its connection pool
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ArtifactFetcher for HttpArtifactFetcher {
    async fn fetch(&self, url: &str, token: &str) -> Result<Vec<u8>, SourceError> {
        debug!(url, "Downloading release asset");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, DOWNLOAD_CONTENT_TYPE)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::status(
                status.as_u16(),
                format!("failed to fetch from url {:?}: status code: {}", url, status),
            ));
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_sends_download_headers() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/releases/assets/5"))
            .and(header("accept", DOWNLOAD_CONTENT_TYPE))
            .and(header("authorization", "Bearer test-token"))
            .and(header("x-github-api-version", GITHUB_API_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"contents".to_vec()))
            .mount(&mock_server)
            .await;

        let fetcher = HttpArtifactFetcher::new(DEFAULT_HTTP_TIMEOUT).unwrap();
        let bytes = fetcher
            .fetch(
                &format!("{}/releases/assets/5", mock_server.uri()),
                "test-token",
            )
            .await
            .unwrap();

        assert_eq!(bytes, b"contents");
    }

    #[tokio::test]
    async fn test_fetch_reports_non_success_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/releases/assets/9"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let fetcher = HttpArtifactFetcher::new(DEFAULT_HTTP_TIMEOUT).unwrap();
        let err = fetcher
            .fetch(
                &format!("{}/releases/assets/9", mock_server.uri()),
                "test-token",
            )
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), Some(403));
    }
}
