//! Registry protocol value types and the upstream release model they are built from

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dependency map declared in a plugin's registry info artifact.
///
/// Ordered so that serialised responses are stable across calls.
pub type Dependencies = BTreeMap<String, String>;

/// Versions available for a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PluginVersions {
    pub versions: Vec<PluginVersion>,
}

/// A single plugin version, with enough detail for a client to pick a version
/// that matches its protocol and platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginVersion {
    pub version: String,
    pub supported_protocols: Vec<String>,
    pub supported_platforms: Vec<PluginVersionPlatform>,
}

/// OS and architecture pair that a plugin archive was built for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginVersionPlatform {
    pub os: String,
    pub arch: String,
}

impl PluginVersionPlatform {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }
}

/// Contents of the `*_registry_info.json` artifact published with a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PluginRegistryInfo {
    #[serde(default)]
    pub supported_protocols: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Dependencies>,
}

/// Package information for one plugin version on one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PluginVersionPackage {
    pub supported_protocols: Vec<String>,
    pub os: String,
    pub arch: String,
    pub filename: String,
    pub download_url: String,
    pub shasums_url: String,
    pub shasums_signature_url: String,
    pub shasum: String,
    pub signing_keys: PublicSigningKeys,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Dependencies>,
}

/// Public keys a client can use to verify the checksum manifest signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PublicSigningKeys {
    pub gpg: Vec<PublicSigningKey>,
}

/// An ASCII armored public key together with its hexadecimal key ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSigningKey {
    pub key_id: String,
    pub public_key: String,
}

/// Operator supplied list of public keys, as stored in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SigningKeysInput {
    #[serde(default)]
    pub keys: Vec<SigningKeyInput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningKeyInput {
    pub public_key: String,
}

/// Repository as reported by the upstream source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    #[serde(default)]
    pub owner: Option<RepositoryOwner>,
    #[serde(default)]
    pub private: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
}

impl Repository {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: Some(RepositoryOwner {
                login: owner.into(),
            }),
            private: true,
        }
    }

    pub fn owner_login(&self) -> Option<&str> {
        self.owner.as_ref().map(|owner| owner.login.as_str())
    }
}

/// Release as reported by the upstream source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// A file attached to a release.
///
/// `url` is the API URL of the asset, which serves the raw bytes when requested
/// with an `application/octet-stream` accept header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub url: String,
}

impl ReleaseAsset {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// One page of results from a paginated upstream listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Number of the following page, `None` when this is the last page.
    pub next_page: Option<u32>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_page: None,
        }
    }
}
