//! Signing keys command implementation
//!
//! Builds the value of `GH_PLUGIN_REGISTRY_PUBLIC_SIGNING_KEYS` from armored
//! public key files.

use crate::cli::error::{CliError, CliResult};
use clap::Args;
use gh_plugin_registry::core::config::PUBLIC_SIGNING_KEYS_ENV;
use gh_plugin_registry::{build_signing_keys_document, extract_hex_key_id};
use std::path::{Path, PathBuf};

/// Generate the public signing keys environment variable
#[derive(Debug, Args)]
pub struct SigningKeysArgs {
    /// ASCII armored public key files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Insert the variable into this .env file instead of printing it
    #[arg(long, value_name = "ENV_FILE")]
    pub insert: Option<PathBuf>,
}

pub async fn execute_signing_keys(args: SigningKeysArgs) -> CliResult<()> {
    if args.files.is_empty() {
        return Err(CliError::NoKeyFiles);
    }

    let mut public_keys = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let public_key = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CliError::KeyFile {
                path: path.display().to_string(),
                source,
            })?;

        let key_id = extract_hex_key_id(&public_key)?;
        println!("{}: key ID {}", path.display(), key_id);
        public_keys.push(public_key);
    }

    let line = env_var_line(&build_signing_keys_document(public_keys)?);

    match args.insert {
        Some(env_file) => {
            insert_into_env_file(&env_file, &line).await?;
            println!("Updated {} in {}", PUBLIC_SIGNING_KEYS_ENV, env_file.display());
        }
        None => {
            println!("Add the following to your .env file:");
            println!("{}", line);
        }
    }

    Ok(())
}

fn env_var_line(document: &str) -> String {
    format!("{}='{}'", PUBLIC_SIGNING_KEYS_ENV, document)
}

/// Replace the variable's line in `contents`, or append it, dropping blank
/// lines.
fn upsert_env_line(contents: &str, line: &str) -> String {
    let prefix = format!("{}=", PUBLIC_SIGNING_KEYS_ENV);
    let mut replaced = false;

    let mut lines: Vec<&str> = contents
        .lines()
        .filter(|existing| !existing.trim().is_empty())
        .map(|existing| {
            if !replaced && existing.trim_start().starts_with(&prefix) {
                replaced = true;
                line
            } else {
                existing
            }
        })
        .collect();

    if !replaced {
        lines.push(line);
    }

    let mut updated = lines.join("\n");
    updated.push('\n');
    updated
}

async fn insert_into_env_file(env_file: &Path, line: &str) -> CliResult<()> {
    let contents = tokio::fs::read_to_string(env_file).await?;
    tokio::fs::write(env_file, upsert_env_line(&contents, line)).await?;
    Ok(())
}
