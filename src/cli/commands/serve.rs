//! Serve command implementation

use crate::cli::error::CliResult;
use clap::Args;
use gh_plugin_registry::core::signing_keys::prepare_signing_keys;
use gh_plugin_registry::http::RegistryServer;
use gh_plugin_registry::{
    GitHubSource, HttpArtifactFetcher, PluginService, RegistryConfig, SourceError,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Serve the plugin registry protocol over HTTP
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Host to bind the server to (overrides GH_PLUGIN_REGISTRY_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind the server to (overrides GH_PLUGIN_REGISTRY_PORT)
    #[arg(long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    fn apply(&self, mut config: RegistryConfig) -> RegistryConfig {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        config
    }
}

pub async fn execute_serve(config: RegistryConfig, args: ServeArgs) -> CliResult<()> {
    let config = args.apply(config);

    // Keys are parsed again for every package request; a bad key set should
    // stop the server before it accepts traffic.
    let signing_keys = prepare_signing_keys(config.public_signing_keys.as_deref())?;
    for key in &signing_keys.gpg {
        info!(key_id = %key.key_id, "Loaded public signing key");
    }
    if config.registry_base_url.is_empty() {
        warn!("GH_PLUGIN_REGISTRY_REGISTRY_BASE_URL is not set, manifest endpoints will be relative");
    }

    let source = GitHubSource::new(&config.github_api_url, config.http_client_timeout())
        .map_err(source_setup_error)?;
    let fetcher =
        HttpArtifactFetcher::new(config.http_client_timeout()).map_err(source_setup_error)?;
    let service = Arc::new(PluginService::new(
        Arc::new(source),
        Arc::new(fetcher),
        config.service_config(),
    ));

    let server = RegistryServer::new(service, &config)?;
    info!(
        addr = %server.addr(),
        github_api_url = %config.github_api_url,
        "Starting plugin registry"
    );

    server.serve().await?;
    Ok(())
}

fn source_setup_error(err: SourceError) -> anyhow::Error {
    anyhow::anyhow!("Failed to create GitHub client: {}", err)
}
