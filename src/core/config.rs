//! Registry configuration loaded from the environment

use crate::core::resolver::RepositoryNaming;
use crate::core::service::ServiceConfig;
use crate::core::source::github::DEFAULT_GITHUB_API_URL;
use config::{Config, Environment};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Prefix shared by every configuration environment variable
pub const ENV_PREFIX: &str = "GH_PLUGIN_REGISTRY";

/// Environment variable holding the serialised public signing keys document
pub const PUBLIC_SIGNING_KEYS_ENV: &str = "GH_PLUGIN_REGISTRY_PUBLIC_SIGNING_KEYS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Runtime configuration of the registry service
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    pub host: String,
    pub port: u16,

    /// Request header clients send their GitHub token in
    pub auth_token_header: String,

    /// Public base URL of this registry, used in the discovery manifest
    #[serde(default)]
    pub registry_base_url: String,

    #[serde(default)]
    pub public_signing_keys: Option<String>,

    /// Timeout for outbound GitHub requests, in seconds
    pub http_client_timeout: u64,

    /// Timeout for handling one inbound request, in seconds
    pub request_timeout: u64,

    pub logging_level: String,
    pub environment: String,
    pub github_api_url: String,

    /// Optional prefix for plugin repository names, e.g. `acme` for
    /// `acme-provider-aws`
    #[serde(default)]
    pub repository_prefix: Option<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8085,
            auth_token_header: "gh-plugin-registry-token".to_string(),
            registry_base_url: String::new(),
            public_signing_keys: None,
            http_client_timeout: 60,
            request_timeout: 60,
            logging_level: "info".to_string(),
            environment: "production".to_string(),
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            repository_prefix: None,
        }
    }
}

impl RegistryConfig {
    /// Load configuration from `GH_PLUGIN_REGISTRY_*` environment variables
    /// on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    /// Load configuration from an explicit environment source, for tests
    /// that must not depend on the process environment.
    pub fn from_source(source: Environment) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config: Self = Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("auth_token_header", defaults.auth_token_header)?
            .set_default("registry_base_url", defaults.registry_base_url)?
            .set_default("http_client_timeout", defaults.http_client_timeout)?
            .set_default("request_timeout", defaults.request_timeout)?
            .set_default("logging_level", defaults.logging_level)?
            .set_default("environment", defaults.environment)?
            .set_default("github_api_url", defaults.github_api_url)?
            .add_source(source)
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth_token_header.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "auth_token_header must not be empty".to_string(),
            ));
        }
        if self.request_timeout == 0 || self.http_client_timeout == 0 {
            return Err(ConfigError::Invalid(
                "timeouts must be at least one second".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn http_client_timeout(&self) -> Duration {
        Duration::from_secs(self.http_client_timeout)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Base URL of the plugin endpoints advertised in the discovery manifest
    pub fn plugins_base_url(&self) -> String {
        format!("{}/plugins", self.registry_base_url.trim_end_matches('/'))
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            naming: RepositoryNaming::new(self.repository_prefix.clone()),
            public_signing_keys: self.public_signing_keys.clone(),
        }
    }
}
