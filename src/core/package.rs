//! Package resolution for a single plugin version and platform

use crate::core::error::{RegistryError, RegistryResult};
use crate::core::fetcher::ArtifactFetcher;
use crate::core::signing_keys::prepare_signing_keys;
use crate::core::types::{PluginVersionPackage, Release};
use crate::core::versions::{archive_filename, fetch_registry_info};
use tracing::debug;

/// Inputs for resolving one package from a release
#[derive(Debug, Clone, Copy)]
pub struct PackageRequest<'a> {
    pub repository: &'a str,
    pub release: &'a Release,
    pub version: &'a str,
    pub os: &'a str,
    pub arch: &'a str,
    /// Serialised signing keys document supplied by the operator
    pub signing_keys: Option<&'a str>,
}

/// Name of the checksum manifest: `<repository>_<version>_SHA256SUMS`
pub fn shasums_filename(repository: &str, version: &str) -> String {
    format!("{}_{}_SHA256SUMS", repository, version)
}

/// Name of the checksum manifest signature: `<repository>_<version>_SHA256SUMS.sig`
pub fn shasums_signature_filename(repository: &str, version: &str) -> String {
    format!("{}_{}_SHA256SUMS.sig", repository, version)
}

/// Find the checksum for `filename` in a checksum manifest.
///
/// Manifest lines have the form `<hex digest>  <filename>`. The first line
/// whose filename field equals `filename` wins.
pub fn find_checksum(manifest: &str, filename: &str) -> Option<String> {
    manifest.lines().find_map(|line| {
        let mut fields = line.split_whitespace();
        let digest = fields.next()?;
        let name = fields.next()?;
        // sha256sum marks binary mode with a leading '*'
        let name = name.strip_prefix('*').unwrap_or(name);
        (name == filename).then(|| digest.to_string())
    })
}

/// Fill in archive and checksum asset details from the release assets
fn attach_release_files(request: &PackageRequest<'_>, package: &mut PluginVersionPackage) {
    let archive = archive_filename(request.repository, request.version, request.os, request.arch);
    let shasums = shasums_filename(request.repository, request.version);
    let shasums_signature = shasums_signature_filename(request.repository, request.version);

    for asset in &request.release.assets {
        if asset.name == archive {
            package.filename = archive.clone();
            package.download_url = asset.url.clone();
        } else if asset.name == shasums {
            package.shasums_url = asset.url.clone();
        } else if asset.name == shasums_signature {
            package.shasums_signature_url = asset.url.clone();
        }
    }
}

/// Resolve the package descriptor for one version and platform of a plugin.
///
/// A missing archive leaves `filename` and `download_url` empty. The checksum
/// is looked up for the expected archive name even then, so a release without
/// a matching archive normally fails with [`RegistryError::ChecksumNotFound`].
pub async fn resolve_package(
    request: PackageRequest<'_>,
    fetcher: &dyn ArtifactFetcher,
    token: &str,
) -> RegistryResult<PluginVersionPackage> {
    let registry_info = fetch_registry_info(fetcher, request.release, token).await?;

    let mut package = PluginVersionPackage {
        supported_protocols: registry_info.supported_protocols,
        dependencies: registry_info.dependencies,
        os: request.os.to_string(),
        arch: request.arch.to_string(),
        ..Default::default()
    };

    attach_release_files(&request, &mut package);
    package.signing_keys = prepare_signing_keys(request.signing_keys)?;

    let archive = archive_filename(request.repository, request.version, request.os, request.arch);
    if package.shasums_url.is_empty() {
        debug!(
            repository = request.repository,
            version = request.version,
            "Release has no checksum manifest"
        );
        return Err(RegistryError::ChecksumNotFound(archive));
    }

    let manifest = fetcher
        .fetch(&package.shasums_url, token)
        .await
        .map_err(RegistryError::from_download)?;
    let manifest = String::from_utf8_lossy(&manifest);
    package.shasum =
        find_checksum(&manifest, &archive).ok_or(RegistryError::ChecksumNotFound(archive))?;

    Ok(package)
}
