//! Command modules for CLI

pub mod serve;
pub mod signing_keys;

use clap::Subcommand;

#[derive(Debug, Subcommand)]
#[command(about = "Plugin registry commands")]
pub enum Commands {
    /// Serve the registry protocol over HTTP
    #[command(about = "Start the plugin registry HTTP server")]
    Serve(serve::ServeArgs),

    /// Build the public signing keys environment variable from key files
    #[command(about = "Generate GH_PLUGIN_REGISTRY_PUBLIC_SIGNING_KEYS from armored public keys")]
    SigningKeys(signing_keys::SigningKeysArgs),
}
