//! Plugin service: the registry protocol operations over GitHub releases

use crate::core::error::{RegistryError, RegistryResult};
use crate::core::fetcher::ArtifactFetcher;
use crate::core::package::{resolve_package, PackageRequest};
use crate::core::releases::ReleaseCollector;
use crate::core::resolver::{RepositoryNaming, RepositoryResolver};
use crate::core::source::RepositorySource;
use crate::core::types::{PluginVersionPackage, PluginVersions};
use crate::core::versions::extract_plugin_versions;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Per-request context for a resolution call
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Token forwarded to GitHub for every upstream call
    pub token: String,

    /// Cancelling aborts any in-flight upstream request and fails the call
    pub cancellation: CancellationToken,
}

impl RequestContext {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Run `operation` unless the request is cancelled first.
    ///
    /// The operation future is dropped on cancellation, which aborts any
    /// outstanding network fetch.
    pub async fn run<T, F>(&self, operation: F) -> RegistryResult<T>
    where
        F: Future<Output = RegistryResult<T>>,
    {
        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => Err(RegistryError::Cancelled),
            result = operation => result,
        }
    }
}

/// Parameters identifying one plugin package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfoParams {
    pub organisation: String,
    pub plugin: String,
    pub version: String,
    pub os: String,
    pub arch: String,
}

/// Service configuration for plugin resolution
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Repository naming policy for plugins
    pub naming: RepositoryNaming,

    /// Serialised public signing keys document
    pub public_signing_keys: Option<String>,
}

/// Lists plugin versions and resolves plugin packages from GitHub releases
#[derive(Clone)]
pub struct PluginService {
    source: Arc<dyn RepositorySource>,
    fetcher: Arc<dyn ArtifactFetcher>,
    config: ServiceConfig,
}

impl PluginService {
    pub fn new(
        source: Arc<dyn RepositorySource>,
        fetcher: Arc<dyn ArtifactFetcher>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            source,
            fetcher,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// List the versions of a plugin along with the protocols and platforms
    /// each version supports.
    pub async fn list_versions(
        &self,
        ctx: &RequestContext,
        organisation: &str,
        plugin: &str,
    ) -> RegistryResult<PluginVersions> {
        ctx.run(async {
            let repository = self.resolve_repository(ctx, organisation, plugin).await?;

            let releases = ReleaseCollector::new(self.source.as_ref())
                .list_all(organisation, &repository, &ctx.token)
                .await?;
            debug!(
                organisation,
                repository = %repository,
                releases = releases.len(),
                "Collected plugin releases"
            );

            extract_plugin_versions(&repository, &releases, self.fetcher.as_ref(), &ctx.token)
                .await
        })
        .await
    }

    /// Resolve the download URL, checksum and signing keys for one version and
    /// platform of a plugin.
    pub async fn get_package(
        &self,
        ctx: &RequestContext,
        params: &PackageInfoParams,
    ) -> RegistryResult<PluginVersionPackage> {
        ctx.run(async {
            let repository = self
                .resolve_repository(ctx, &params.organisation, &params.plugin)
                .await?;

            let tag = format!("v{}", params.version);
            let release = ReleaseCollector::new(self.source.as_ref())
                .get_by_tag(&params.organisation, &repository, &tag, &ctx.token)
                .await?;

            let request = PackageRequest {
                repository: &repository,
                release: &release,
                version: &params.version,
                os: &params.os,
                arch: &params.arch,
                signing_keys: self.config.public_signing_keys.as_deref(),
            };

            resolve_package(request, self.fetcher.as_ref(), &ctx.token).await
        })
        .await
    }

    async fn resolve_repository(
        &self,
        ctx: &RequestContext,
        organisation: &str,
        plugin: &str,
    ) -> RegistryResult<String> {
        RepositoryResolver::new(self.source.as_ref(), &self.config.naming)
            .resolve(organisation, plugin, &ctx.token)
            .await
    }
}
