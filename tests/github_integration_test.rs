//! End-to-end tests of the plugin service against a mocked GitHub API
//!
//! Exercises the reqwest-backed repository source and artifact fetcher
//! together: pagination via `Link` headers, token forwarding and asset
//! downloads.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use gh_plugin_registry::core::signing_keys::build_signing_keys_document;
use gh_plugin_registry::test_utils::{TEST_PUBLIC_KEY, TEST_PUBLIC_KEY_ID};
use gh_plugin_registry::{
    GitHubSource, HttpArtifactFetcher, PackageInfoParams, PluginService, RegistryError,
    RequestContext, ServiceConfig,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "ghp_integration";
const TIMEOUT: Duration = Duration::from_secs(5);

fn asset_url(server: &MockServer, id: u32) -> String {
    format!(
        "{}/repos/acme/provider-aws/releases/assets/{}",
        server.uri(),
        id
    )
}

fn create_service(server: &MockServer) -> PluginService {
    let source = GitHubSource::new(&server.uri(), TIMEOUT).unwrap();
    let fetcher = HttpArtifactFetcher::new(TIMEOUT).unwrap();
    PluginService::new(
        Arc::new(source),
        Arc::new(fetcher),
        ServiceConfig {
            public_signing_keys: Some(
                build_signing_keys_document(vec![TEST_PUBLIC_KEY.to_string()]).unwrap(),
            ),
            ..Default::default()
        },
    )
}

/// Two pages of organisation repositories, the plugin repository on the second
async fn mount_repositories(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/orgs/acme/repos"))
        .and(query_param("page", "1"))
        .and(header("authorization", "Bearer ghp_integration"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "link",
                    format!(
                        r#"<{}/orgs/acme/repos?page=2&per_page=30>; rel="next", <{}/orgs/acme/repos?page=2&per_page=30>; rel="last""#,
                        server.uri(),
                        server.uri()
                    )
                    .as_str(),
                )
                .set_body_json(json!([
                    {"name": "website", "owner": {"login": "acme"}, "private": false},
                    {"name": "provider-awsx", "owner": {"login": "acme"}, "private": true}
                ])),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/orgs/acme/repos"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "provider-aws", "owner": {"login": "acme"}, "private": true}
        ])))
        .expect(1)
        .mount(server)
        .await;
}

fn release_json(server: &MockServer, version: &str, base_id: u32) -> serde_json::Value {
    json!({
        "tag_name": format!("v{}", version),
        "name": format!("v{}", version),
        "assets": [
            {
                "name": format!("provider-aws_{}_linux_amd64.zip", version),
                "url": asset_url(server, base_id),
                "browser_download_url": "https://github.com/acme/provider-aws/releases/download/archive.zip"
            },
            {
                "name": format!("provider-aws_{}_registry_info.json", version),
                "url": asset_url(server, base_id + 1)
            },
            {
                "name": format!("provider-aws_{}_SHA256SUMS", version),
                "url": asset_url(server, base_id + 2)
            },
            {
                "name": format!("provider-aws_{}_SHA256SUMS.sig", version),
                "url": asset_url(server, base_id + 3)
            }
        ]
    })
}

async fn mount_asset(server: &MockServer, id: u32, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/repos/acme/provider-aws/releases/assets/{}",
            id
        )))
        .and(header("accept", "application/octet-stream"))
        .and(header("authorization", "Bearer ghp_integration"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_list_versions_follows_pagination() {
    let server = MockServer::start().await;
    mount_repositories(&server).await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/provider-aws/releases"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "link",
                    format!(
                        r#"<{}/repos/acme/provider-aws/releases?page=2&per_page=30>; rel="next""#,
                        server.uri()
                    )
                    .as_str(),
                )
                .set_body_json(json!([
                    release_json(&server, "1.1.0", 10),
                    {"tag_name": "nightly", "assets": []}
                ])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/provider-aws/releases"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([release_json(&server, "1.0.0", 20)])),
        )
        .mount(&server)
        .await;

    mount_asset(&server, 11, r#"{"supportedProtocols":["2.0"]}"#).await;
    mount_asset(&server, 21, r#"{"supportedProtocols":["1.0"]}"#).await;

    let service = create_service(&server);
    let versions = service
        .list_versions(&RequestContext::new(TOKEN), "acme", "aws")
        .await
        .unwrap();

    let listed: Vec<(&str, &[String])> = versions
        .versions
        .iter()
        .map(|v| (v.version.as_str(), v.supported_protocols.as_slice()))
        .collect();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].0, "1.1.0");
    assert_eq!(listed[0].1, ["2.0".to_string()]);
    assert_eq!(listed[1].0, "1.0.0");
    assert_eq!(listed[1].1, ["1.0".to_string()]);
    assert_eq!(versions.versions[0].supported_platforms[0].os, "linux");
}

#[tokio::test]
async fn test_get_package_downloads_checksums() {
    let server = MockServer::start().await;
    mount_repositories(&server).await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/provider-aws/releases/tags/v1.0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(release_json(&server, "1.0.1", 30)))
        .mount(&server)
        .await;

    mount_asset(
        &server,
        31,
        r#"{"supportedProtocols":["1.4","2.1"],"dependencies":{"acme/aws-core":"^1.0.0"}}"#,
    )
    .await;
    mount_asset(
        &server,
        32,
        "1111  provider-aws_1.0.1_darwin_amd64.zip\nc635e6201021832cc1f4cfe5345  provider-aws_1.0.1_linux_amd64.zip\n",
    )
    .await;

    let service = create_service(&server);
    let params = PackageInfoParams {
        organisation: "acme".to_string(),
        plugin: "aws".to_string(),
        version: "1.0.1".to_string(),
        os: "linux".to_string(),
        arch: "amd64".to_string(),
    };

    let package = service
        .get_package(&RequestContext::new(TOKEN), &params)
        .await
        .unwrap();

    assert_eq!(package.filename, "provider-aws_1.0.1_linux_amd64.zip");
    assert_eq!(package.download_url, asset_url(&server, 30));
    assert_eq!(package.shasums_url, asset_url(&server, 32));
    assert_eq!(package.shasums_signature_url, asset_url(&server, 33));
    assert_eq!(package.shasum, "c635e6201021832cc1f4cfe5345");
    assert_eq!(package.signing_keys.gpg[0].key_id, TEST_PUBLIC_KEY_ID);
    assert_eq!(package.supported_protocols, vec!["1.4", "2.1"]);
}

#[tokio::test]
async fn test_missing_release_tag_is_not_found() {
    let server = MockServer::start().await;
    mount_repositories(&server).await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/provider-aws/releases/tags/v2.0.0"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
        .mount(&server)
        .await;

    let service = create_service(&server);
    let params = PackageInfoParams {
        organisation: "acme".to_string(),
        plugin: "aws".to_string(),
        version: "2.0.0".to_string(),
        os: "linux".to_string(),
        arch: "amd64".to_string(),
    };

    let result = service
        .get_package(&RequestContext::new(TOKEN), &params)
        .await;
    assert!(matches!(result, Err(RegistryError::ReleaseNotFound(_))));
}

#[tokio::test]
async fn test_rejected_token_is_unauthorised() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orgs/acme/repos"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Bad credentials"})),
        )
        .mount(&server)
        .await;

    let service = create_service(&server);
    let result = service
        .list_versions(&RequestContext::new("ghp_revoked"), "acme", "aws")
        .await;
    assert!(matches!(result, Err(RegistryError::Unauthorised)));
}

#[tokio::test]
async fn test_slow_upstream_is_cancelled() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orgs/acme/repos"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let service = create_service(&server);
    let ctx = RequestContext::new(TOKEN);
    let cancellation = ctx.cancellation.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancellation.cancel();
    });

    let started = std::time::Instant::now();
    let result = service.list_versions(&ctx, "acme", "aws").await;

    assert!(matches!(result, Err(RegistryError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(2));
}
