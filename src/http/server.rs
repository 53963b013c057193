//! Axum HTTP server implementation

use crate::core::config::RegistryConfig;
use crate::core::service::PluginService;
use crate::http::auth::token_middleware;
use crate::http::handlers::{manifest, plugins, AppState};
use anyhow::Context;
use axum::{middleware, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

/// Create the Axum router with all routes
///
/// The `/plugins` routes require a token in the configured header, the
/// discovery manifest is public.
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    let plugin_routes = Router::new()
        .route(
            "/:organisation/:plugin/versions",
            get(plugins::list_versions),
        )
        .route(
            "/:organisation/:plugin/:version/package/:os/:arch",
            get(plugins::get_package),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            token_middleware,
        ));

    Router::new()
        .route(manifest::MANIFEST_PATH, get(manifest::get_manifest))
        .nest("/plugins", plugin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .with_state(state)
}

/// Registry HTTP server
pub struct RegistryServer {
    state: AppState,
    addr: SocketAddr,
    request_timeout: Duration,
}

impl RegistryServer {
    /// Create a new server instance bound to the configured host and port
    pub fn new(service: Arc<PluginService>, config: &RegistryConfig) -> anyhow::Result<Self> {
        let addr = Self::parse_address(&config.host, config.port)?;

        Ok(Self {
            state: AppState::new(service, config),
            addr,
            request_timeout: config.request_timeout(),
        })
    }

    /// Parse and normalize host:port into a SocketAddr
    fn parse_address(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
        let normalized_host = Self::normalize_host(host);

        // IPv6 addresses need brackets
        let addr_str = if normalized_host.contains(':') {
            format!("[{}]:{}", normalized_host, port)
        } else {
            format!("{}:{}", normalized_host, port)
        };

        addr_str.parse().with_context(|| {
            format!(
                "Unable to parse address '{}'. Use IP addresses like '127.0.0.1', '0.0.0.0' or '::1'",
                addr_str
            )
        })
    }

    fn normalize_host(host: &str) -> &str {
        match host {
            "localhost" => "127.0.0.1",
            "[::1]" => "::1",
            "[::]" => "::",
            _ => host,
        }
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone(), self.request_timeout)
    }

    /// Start the server, running until Ctrl+C or SIGTERM
    pub async fn serve(self) -> anyhow::Result<()> {
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .with_context(|| format!("Failed to bind {}", self.addr))?;
        info!(addr = %listener.local_addr()?, "Plugin registry listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Plugin registry stopped");
        Ok(())
    }

    /// Get server address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        assert_eq!(
            RegistryServer::parse_address("localhost", 8085).unwrap(),
            "127.0.0.1:8085".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            RegistryServer::parse_address("::1", 8085).unwrap(),
            "[::1]:8085".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            RegistryServer::parse_address("0.0.0.0", 0).unwrap(),
            "0.0.0.0:0".parse::<SocketAddr>().unwrap()
        );
        assert!(RegistryServer::parse_address("not a host", 8085).is_err());
    }
}
