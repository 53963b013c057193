//! Service discovery manifest handler

use crate::core::fetcher::DOWNLOAD_CONTENT_TYPE;
use crate::http::handlers::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

/// Path clients fetch the discovery manifest from
pub const MANIFEST_PATH: &str = "/.well-known/plugin-services.json";

/// Service discovery document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    #[serde(rename = "provider.v1")]
    pub provider_v1: PluginTypeManifestInfo,
    #[serde(rename = "transformer.v1")]
    pub transformer_v1: PluginTypeManifestInfo,
    #[serde(rename = "auth.v1")]
    pub auth_v1: AuthManifestInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PluginTypeManifestInfo {
    pub endpoint: String,
    /// `Accept` header clients must send when downloading artifacts
    pub download_accept_content_type: String,
}

/// Only API key authentication is supported
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthManifestInfo {
    pub api_key_header: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_auth: Option<String>,
}

impl Manifest {
    pub fn new(plugins_base_url: &str, auth_token_header: &str) -> Self {
        let plugin_type = PluginTypeManifestInfo {
            endpoint: plugins_base_url.to_string(),
            download_accept_content_type: DOWNLOAD_CONTENT_TYPE.to_string(),
        };

        Self {
            provider_v1: plugin_type.clone(),
            transformer_v1: plugin_type,
            auth_v1: AuthManifestInfo {
                api_key_header: auth_token_header.to_string(),
                // Private release assets are downloaded with `Authorization: Bearer <token>`
                download_auth: Some("bearer".to_string()),
            },
        }
    }
}

/// GET /.well-known/plugin-services.json
pub async fn get_manifest(State(state): State<AppState>) -> Json<Manifest> {
    Json(Manifest::new(
        &state.plugins_base_url,
        &state.auth_token_header,
    ))
}
