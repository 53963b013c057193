//! Core resolution layer modules

pub mod config;
pub mod error;
pub mod fetcher;
pub mod package;
pub mod releases;
pub mod resolver;
pub mod service;
pub mod signing_keys;
pub mod source;
pub mod types;
pub mod versions;

// Re-export main types for convenience
pub use config::{ConfigError, RegistryConfig};
pub use error::{RegistryError, RegistryResult, SourceError};
pub use fetcher::{ArtifactFetcher, HttpArtifactFetcher};
pub use resolver::{PluginKind, RepositoryNaming};
pub use service::{PackageInfoParams, PluginService, RequestContext, ServiceConfig};
pub use signing_keys::{build_signing_keys_document, extract_hex_key_id, prepare_signing_keys};
pub use source::{GitHubSource, RepositorySource};
pub use types::*;
