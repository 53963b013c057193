//! Plugin version extraction from GitHub releases
//!
//! Every release tagged with a `v`-prefixed semantic version becomes one
//! protocol version record. Supported protocols come from the release's
//! registry info artifact and supported platforms from the names of its
//! archive assets.

use crate::core::error::{RegistryError, RegistryResult};
use crate::core::fetcher::ArtifactFetcher;
use crate::core::types::{
    PluginRegistryInfo, PluginVersion, PluginVersionPlatform, PluginVersions, Release,
    ReleaseAsset,
};
use regex::Regex;
use semver::Version;
use std::sync::LazyLock;
use tracing::debug;

/// Suffix of the registry info artifact attached to each release
pub const REGISTRY_INFO_SUFFIX: &str = "_registry_info.json";

/// Operating systems plugin archives may be built for
pub const SUPPORTED_OS: [&str; 4] = ["linux", "windows", "darwin", "freebsd"];

/// Architectures plugin archives may be built for
pub const SUPPORTED_ARCH: [&str; 4] = ["amd64", "arm64", "arm", "386"];

static PLATFORM_ARCHIVE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^(linux|windows|darwin|freebsd)_(amd64|arm64|arm|386)\.zip$")
        .expect("Invalid platform archive regex")
});

/// Parse a release tag of the form `vMAJOR.MINOR.PATCH[-pre][+build]`.
///
/// Returns `None` for tags that are not `v`-prefixed semantic versions.
pub fn parse_version_tag(tag: &str) -> Option<Version> {
    let version = tag.strip_prefix('v')?;
    Version::parse(version).ok()
}

/// Version string for a tag, without the leading `v`
pub fn version_from_tag(tag: &str) -> &str {
    tag.strip_prefix('v').unwrap_or(tag)
}

/// Archive filename for a plugin build: `<repository>_<version>_<os>_<arch>.zip`
pub fn archive_filename(repository: &str, version: &str, os: &str, arch: &str) -> String {
    format!("{}_{}_{}_{}.zip", repository, version, os, arch)
}

/// Platform described by an archive asset name, if the asset is an archive of
/// `repository` at `version` for a supported OS and architecture.
pub fn archive_platform(
    repository: &str,
    version: &str,
    asset_name: &str,
) -> Option<PluginVersionPlatform> {
    let platform = asset_name
        .strip_prefix(repository)?
        .strip_prefix('_')?
        .strip_prefix(version)?
        .strip_prefix('_')?;

    let captures = PLATFORM_ARCHIVE_REGEX.captures(platform)?;
    Some(PluginVersionPlatform::new(&captures[1], &captures[2]))
}

/// Supported platforms of a release, in asset order
pub fn extract_supported_platforms(
    repository: &str,
    release: &Release,
) -> Vec<PluginVersionPlatform> {
    let version = version_from_tag(&release.tag_name);
    release
        .assets
        .iter()
        .filter_map(|asset| archive_platform(repository, version, &asset.name))
        .collect()
}

/// The release's registry info asset, if one is attached
pub fn find_registry_info_asset(assets: &[ReleaseAsset]) -> Option<&ReleaseAsset> {
    assets
        .iter()
        .find(|asset| asset.name.ends_with(REGISTRY_INFO_SUFFIX))
}

/// Download and parse the registry info artifact of a release.
///
/// A release without the artifact yields empty registry info. An artifact that
/// is present but not valid JSON is an error.
pub async fn fetch_registry_info(
    fetcher: &dyn ArtifactFetcher,
    release: &Release,
    token: &str,
) -> RegistryResult<PluginRegistryInfo> {
    let Some(asset) = find_registry_info_asset(&release.assets) else {
        debug!(tag = %release.tag_name, "Release has no registry info artifact");
        return Ok(PluginRegistryInfo::default());
    };

    let contents = fetcher
        .fetch(&asset.url, token)
        .await
        .map_err(RegistryError::from_download)?;
    Ok(serde_json::from_slice(&contents)?)
}

/// Convert releases into protocol version records.
///
/// Releases whose tags are not semantic versions are skipped. Output keeps
/// the input order of the qualifying releases.
pub async fn extract_plugin_versions(
    repository: &str,
    releases: &[Release],
    fetcher: &dyn ArtifactFetcher,
    token: &str,
) -> RegistryResult<PluginVersions> {
    let mut versions = Vec::new();

    for release in releases {
        if parse_version_tag(&release.tag_name).is_none() {
            debug!(tag = %release.tag_name, "Skipping release without a semantic version tag");
            continue;
        }

        let registry_info = fetch_registry_info(fetcher, release, token).await?;

        versions.push(PluginVersion {
            version: version_from_tag(&release.tag_name).to_string(),
            supported_protocols: registry_info.supported_protocols,
            supported_platforms: extract_supported_platforms(repository, release),
        });
    }

    Ok(PluginVersions { versions })
}
