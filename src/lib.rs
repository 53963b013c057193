//! # GitHub Plugin Registry
//!
//! A plugin registry protocol server backed by GitHub. Plugins live in
//! `provider-<name>` or `transformer-<name>` repositories of an organisation,
//! and each `v`-tagged release is one plugin version. The registry lists
//! versions with their supported protocols and platforms, and resolves the
//! download location, checksum and signing keys of a single package.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use gh_plugin_registry::{
//!     GitHubSource, HttpArtifactFetcher, PluginService, RegistryConfig, RequestContext,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RegistryConfig::from_env()?;
//!     let source = GitHubSource::new(&config.github_api_url, config.http_client_timeout())?;
//!     let fetcher = HttpArtifactFetcher::new(config.http_client_timeout())?;
//!
//!     let service = PluginService::new(
//!         Arc::new(source),
//!         Arc::new(fetcher),
//!         config.service_config(),
//!     );
//!
//!     let ctx = RequestContext::new("ghp_example");
//!     let versions = service.list_versions(&ctx, "acme", "aws").await?;
//!     println!("Found {} versions", versions.versions.len());
//!
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod http;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use crate::core::config::{ConfigError, RegistryConfig};
pub use crate::core::error::{RegistryError, RegistryResult, SourceError};
pub use crate::core::fetcher::{ArtifactFetcher, HttpArtifactFetcher};
pub use crate::core::service::{PackageInfoParams, PluginService, RequestContext, ServiceConfig};
pub use crate::core::signing_keys::{
    build_signing_keys_document, extract_hex_key_id, prepare_signing_keys,
};
pub use crate::core::source::{GitHubSource, RepositorySource};
pub use crate::core::types::{PluginVersionPackage, PluginVersions};

/// Version of the registry
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging (safe for testing)
///
/// `RUST_LOG` takes precedence over `level`. JSON output is meant for
/// production deployments, human readable output for development.
pub fn init_logging(level: &str, json: bool) {
    // Only initialize logging once
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        // This will fail silently if already initialized
        if json {
            let subscriber = tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .finish();
            let _ = tracing::subscriber::set_global_default(subscriber);
        } else {
            let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
            let _ = tracing::subscriber::set_global_default(subscriber);
        }
    });
}
