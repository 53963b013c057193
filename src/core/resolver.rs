//! Plugin repository resolution
//!
//! Maps an organisation and plugin name to the single GitHub repository that
//! publishes the plugin. Repositories follow the naming convention
//! `[<prefix>-]<kind>-<plugin>`, where kind is `provider` or `transformer`.

use crate::core::error::{RegistryError, RegistryResult};
use crate::core::source::{collect_pages, RepositorySource};
use crate::core::types::Repository;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// The kinds of plugin a registry serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginKind {
    Provider,
    Transformer,
}

impl PluginKind {
    /// All kinds, in the order candidate repository names are built
    pub const ALL: [PluginKind; 2] = [PluginKind::Provider, PluginKind::Transformer];

    pub fn as_str(&self) -> &'static str {
        match self {
            PluginKind::Provider => "provider",
            PluginKind::Transformer => "transformer",
        }
    }
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Naming policy for plugin repositories
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryNaming {
    /// Optional product prefix, e.g. `bluelink` for `bluelink-provider-aws`
    pub prefix: Option<String>,
}

impl RepositoryNaming {
    pub fn new(prefix: Option<String>) -> Self {
        Self {
            prefix: prefix.filter(|prefix| !prefix.trim().is_empty()),
        }
    }

    /// Repository name for a plugin of the given kind
    pub fn repository_name(&self, kind: PluginKind, plugin: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}-{}-{}", prefix, kind, plugin),
            None => format!("{}-{}", kind, plugin),
        }
    }

    /// Candidate repository names for a plugin, provider first
    pub fn candidates(&self, plugin: &str) -> [String; 2] {
        PluginKind::ALL.map(|kind| self.repository_name(kind, plugin))
    }
}

/// Find the repository for `plugin` in a listing of organisation repositories.
///
/// Scans once in listing order and returns the first repository whose name
/// exactly equals one of the candidate names.
pub fn find_plugin_repository<'a>(
    repositories: &'a [Repository],
    naming: &RepositoryNaming,
    plugin: &str,
) -> Option<&'a Repository> {
    let candidates = naming.candidates(plugin);
    repositories
        .iter()
        .find(|repo| candidates.iter().any(|candidate| *candidate == repo.name))
}

/// Resolves plugin names to repositories using a [`RepositorySource`]
pub struct RepositoryResolver<'a> {
    source: &'a dyn RepositorySource,
    naming: &'a RepositoryNaming,
}

impl<'a> RepositoryResolver<'a> {
    pub fn new(source: &'a dyn RepositorySource, naming: &'a RepositoryNaming) -> Self {
        Self { source, naming }
    }

    /// List every repository in the organisation, following pagination.
    pub async fn list_repositories(
        &self,
        organisation: &str,
        token: &str,
    ) -> RegistryResult<Vec<Repository>> {
        let source = self.source;
        collect_pages(move |page| {
            debug!(organisation, page, "Listing organisation repositories");
            source.list_org_repositories(organisation, page, token)
        })
        .await
    }

    /// Resolve the repository name for `plugin` within `organisation`.
    pub async fn resolve(
        &self,
        organisation: &str,
        plugin: &str,
        token: &str,
    ) -> RegistryResult<String> {
        let repositories = self.list_repositories(organisation, token).await?;

        find_plugin_repository(&repositories, self.naming, plugin)
            .map(|repo| repo.name.clone())
            .ok_or_else(|| {
                RegistryError::RepositoryNotFound(format!(
                    "plugin repository for {}/{} not found",
                    organisation, plugin
                ))
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::StubRepositorySource;

    fn repos(names: &[&str]) -> Vec<Repository> {
        names
            .iter()
            .map(|name| Repository::new("acme", *name))
            .collect()
    }

    #[test]
    fn test_repository_names() {
        let naming = RepositoryNaming::default();
        assert_eq!(
            naming.repository_name(PluginKind::Provider, "aws"),
            "provider-aws"
        );

        let naming = RepositoryNaming::new(Some("bluelink".to_string()));
        assert_eq!(
            naming.candidates("aws"),
            [
                "bluelink-provider-aws".to_string(),
                "bluelink-transformer-aws".to_string()
            ]
        );

        let naming = RepositoryNaming::new(Some("  ".to_string()));
        assert_eq!(naming.prefix, None);
    }

    #[test]
    fn test_finds_provider_or_transformer_repository() {
        let naming = RepositoryNaming::default();
        let listing = repos(&["docs", "transformer-celerity", "provider-aws"]);

        let found = find_plugin_repository(&listing, &naming, "celerity").unwrap();
        assert_eq!(found.name, "transformer-celerity");

        let found = find_plugin_repository(&listing, &naming, "aws").unwrap();
        assert_eq!(found.name, "provider-aws");
    }

    #[test]
    fn test_only_exact_names_match() {
        let naming = RepositoryNaming::default();
        let listing = repos(&["provider-aws-extra", "provider-aw", "provider-aws"]);

        let found = find_plugin_repository(&listing, &naming, "aws").unwrap();
        assert_eq!(found.name, "provider-aws");

        let listing = repos(&["provider-aws-extra", "xprovider-aws"]);
        assert!(find_plugin_repository(&listing, &naming, "aws").is_none());
    }

    #[test]
    fn test_first_match_in_listing_order_wins() {
        let naming = RepositoryNaming::default();
        let listing = repos(&["transformer-aws", "provider-aws"]);

        let found = find_plugin_repository(&listing, &naming, "aws").unwrap();
        assert_eq!(found.name, "transformer-aws");
    }

    #[tokio::test]
    async fn test_resolve_follows_pages() {
        let source = StubRepositorySource::new()
            .with_page_size(2)
            .with_repositories(repos(&["docs", "website", "tools", "provider-aws"]));
        let naming = RepositoryNaming::default();

        let resolver = RepositoryResolver::new(&source, &naming);
        let name = resolver.resolve("acme", "aws", "test-token").await.unwrap();
        assert_eq!(name, "provider-aws");
        assert_eq!(source.repository_page_requests(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_resolve_unknown_plugin_is_not_found() {
        let source =
            StubRepositorySource::new().with_repositories(repos(&["provider-aws", "docs"]));
        let naming = RepositoryNaming::default();

        let resolver = RepositoryResolver::new(&source, &naming);
        let result = resolver.resolve("acme", "azure", "test-token").await;
        assert!(matches!(result, Err(RegistryError::RepositoryNotFound(_))));
    }

    #[tokio::test]
    async fn test_resolve_maps_unauthorised_listing() {
        let source = StubRepositorySource::new().failing_with_status(401);
        let naming = RepositoryNaming::default();

        let resolver = RepositoryResolver::new(&source, &naming);
        let result = resolver.resolve("acme", "aws", "bad-token").await;
        assert!(matches!(result, Err(RegistryError::Unauthorised)));
    }
}
