//! HTTP request handlers

pub mod manifest;
pub mod plugins;

use crate::core::config::RegistryConfig;
use crate::core::service::PluginService;
use std::sync::Arc;

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PluginService>,
    /// Header clients send their GitHub token in
    pub auth_token_header: String,
    /// Endpoint advertised for both plugin types in the discovery manifest
    pub plugins_base_url: String,
}

impl AppState {
    pub fn new(service: Arc<PluginService>, config: &RegistryConfig) -> Self {
        Self {
            service,
            auth_token_header: config.auth_token_header.clone(),
            plugins_base_url: config.plugins_base_url(),
        }
    }
}
