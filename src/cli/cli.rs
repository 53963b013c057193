//! Main CLI application structure

use clap::Parser;
use gh_plugin_registry::RegistryConfig;

use crate::cli::commands::{serve, signing_keys, Commands};
use crate::cli::error::CliResult;

/// GitHub plugin registry - serve plugin versions and packages from GitHub releases
#[derive(Debug, Parser)]
#[command(name = "gh-plugin-registry")]
#[command(version = gh_plugin_registry::VERSION)]
#[command(about = "Plugin registry protocol server backed by GitHub releases")]
#[command(long_about = "Serves the plugin registry protocol for plugins published as \
                         releases of provider-<name> and transformer-<name> repositories.\n\n\
                         Configuration is read from GH_PLUGIN_REGISTRY_* environment variables.\n\n\
                         Examples:\n\
                           gh-plugin-registry serve --port 8085\n\
                           gh-plugin-registry signing-keys ./signing.asc --insert .env")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> CliResult<()> {
        match self.command {
            Commands::Serve(args) => {
                let config = RegistryConfig::from_env()?;
                gh_plugin_registry::init_logging(&config.logging_level, config.is_production());
                serve::execute_serve(config, args).await
            }
            Commands::SigningKeys(args) => signing_keys::execute_signing_keys(args).await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::try_parse_from([
            "gh-plugin-registry",
            "serve",
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
        ])
        .unwrap();

        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.host.as_deref(), Some("127.0.0.1"));
                assert_eq!(args.port, Some(9000));
            }
            other => panic!("expected serve, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_signing_keys() {
        let cli = Cli::try_parse_from([
            "gh-plugin-registry",
            "signing-keys",
            "a.asc",
            "b.asc",
            "--insert",
            ".env",
        ])
        .unwrap();

        match cli.command {
            Commands::SigningKeys(args) => {
                assert_eq!(args.files, vec![PathBuf::from("a.asc"), PathBuf::from("b.asc")]);
                assert_eq!(args.insert, Some(PathBuf::from(".env")));
            }
            other => panic!("expected signing-keys, got {:?}", other),
        }
    }

    #[test]
    fn test_signing_keys_requires_files() {
        assert!(Cli::try_parse_from(["gh-plugin-registry", "signing-keys"]).is_err());
    }
}
