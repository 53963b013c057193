//! Test utilities shared across the crate
//!
//! In-memory implementations of the upstream collaborators, usable by unit
//! tests in src/ and by integration tests in tests/.

use crate::core::error::SourceError;
use crate::core::fetcher::ArtifactFetcher;
use crate::core::source::RepositorySource;
use crate::core::types::{Page, Release, ReleaseAsset, Repository};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// ASCII armored RSA public key used across signing key tests
pub const TEST_PUBLIC_KEY: &str = "-----BEGIN PGP PUBLIC KEY BLOCK-----

mQINBGfkhWgBEACksXZaZQeBrzQA2nQsk9Dcw1bDfEe1UVWfrYchcQakSSoE2C7S
20Xup82W5CbeQ9TjwwioyBRJDwaTmgi3J8nTHw4bbOYzfvbm9KnFmaTaOF64F/b0
dE63L3RfLH7CZnXrHrKOW9EXq1tCW3/1jVFeJeVhQzKzzs2+3GWcGs52W8P8fpwo
p/smoMzFjJzhcp69i+KYrjxof56qauxITj5MOrGmqHoLt37cGfoaMWw5Sf+9grii
Zg61a61Iq6m1fF3m6vxx26uRcErxsFdfBnAz5Avo+x4Rrul2JR/MRjT9T7TPiQ4p
3oZWXcvqt/nLj3WvRksxG/d/HWQHPBpxwjJJG0mLfrDw6EioZrTrJfwQ7xPQqMG6
KyYJCeC8KLXm5b53lKi1N6U0DXv5V3PlSIz6IY3p4hhABcl5PcP+cTZD/FlAc1xZ
7dOq95XBZNunMOloUzFBy642BtGbFw1iPG8H1lh28aAp/fUOOacOLWouTKNw+r93
MyglskFXl7tDilR0tLWLG9IX2Eu/FaBrsILmCsPuog1PLnmKr+vEt54rZhcVeHyB
MvKlL/pXaWM4AdCBGK+Rc5QJGCuQ/SMqjZbooShVMYglMJ30M2qi8SsrX/U4Dqzs
N2GOIQJWvJ2i9h3ZNygtS+K46SUp9gR4mUYYuNbUon1Pgc3ws2wFeZusLwARAQAB
tDNBbmRyZSBTdXRoZXJsYW5kIDxhbmRyZXN1dGhlcmxhbmRAdHdvaHVuZHJlZC5j
bG91ZD6JAlEEEwEIADsWIQQ7L4PSxq+my/hLPetD4CL2AdEl3AUCZ+SFaAIbAwUL
CQgHAgIiAgYVCgkICwIEFgIDAQIeBwIXgAAKCRBD4CL2AdEl3JaTD/4qRirNC1Z4
3RDHmevB8MfUHTAyq1GYXBpXeXwGPO0Jd3kbk71d16cojO6ZTozXjZjQJHABnvKn
jM4x32uUVIeAljrHPKBqnXXWQp/nykfj5+rzzxePaUqxaaKZmLRiUYCcznLOgXFM
qhf/8R1i2QVnwo1hfOKYt8y0l/BhgRFiD39000vihHW2KQb4odMINgR5O1UP+eI+
RbOwgMeGlrccd35KNyZNmEF559fJE0rP4T4rTDvZfq62uTkCOY3W/ueSgigdVPMe
0tOEL1T10a2xcsigUGaqWQyJWjxuFe3nJUbjAbVsndrCq+kjbBcIriHhEBTWpsc8
RNmbvQiYA3iYIWi/GkHitVEnX7Qul/EtPYEFdHXoTBu/5xPWQ3HQzRUyKGFbpSVW
l2BjJ/1ZGJJLLbxKCA2hMQDuu5HDOfgnjhe1qxvBz/ixC/Fb2ii41Pl34raXALBf
8QuuZ5+kp+zqPEKPLl6FIEUvZkHgeshfS68Tb7mUG3OeVlDexGvxXY2Ib6eGChnu
gFzX3T4/fsZkE24pCsTihrlsqVWTXqFlZlVk1fJQrA2jnl+2n7vpXBzS80ECh0De
/424/ov5BnlJ+xY4b/TuHOr6JgDU+cli625I30uKrQCNd2RDzyg8Alonzr7T5eX4
nLyGbzygMIX+sqXo8hqEdD78FPdC3siI37kCDQRn5IVoARAAr3y22ARw/1M4eulD
srK/D5f3XLtvAUwwMPBDUGDmGCltxZ74JwXvptrLd+xvrazx6TwQ5gQmz061OowJ
xNtiN2fB2kVD9TPMf5gUbf2pzqBDEC1ckOtISOR9Fk4nRvf33aIOx1/3bOqO+ueJ
/oM7PpYO0OOYrQihYYZM4CFYUvtiYXvQ6eW1H71n//eCOkQAnh3pJvuPbDq7SS7I
FEYYi0kMUXgUslVzSViYjLFsbJO90X3h4WnXs03jk4PfqRiVsi1J8o1V5wvngTKY
Pdus/8mu/YJMfudEllqsaGFJeFj6F4SG7tLvh0XkAHjc8FPyU2xUkaAcZDnpTLrP
Z2lSk8XOBfCLDLnCrk3MyG4SEuHsMHB4b7TLe8m85OSBnFfD+0UNaxOOJyB9jSCL
6yT784s8CEh1dXAKaFgMH1+VuCW8DJNyViwa3AAHyqavw754hdBMQ1mOJLNCyqb1
amArSm7gtbiYWsJck91IqNVxas2b7grYReG8KTOJvWmc+fSx528BkEOFg9NXR1dZ
kCCFMYWHRckF01857FKSEeaO2qEnSoI+zYhNFkRhJOVLoCaYpd0dnIx5fCB2kj7X
ZeLZP//QARcUZUEccgRuWyXcdiNlvX8++FOD1ojjR6e2xWlEaRpQfJ1uxqIzJD9g
i//jA0SXFEC7Zv9ag8XAZQnJgdEAEQEAAYkCNgQYAQgAIBYhBDsvg9LGr6bL+Es9
60PgIvYB0SXcBQJn5IVoAhsMAAoJEEPgIvYB0SXcrNAP/AjRMcSVW4H6kTGxCH12
HTBT2rywx3d7q7qEr9OYz82S84sY8ATP9apcipkAkCaVb80cm7k2h58JdXkTO4PD
vjiSqaBle6lSJvIJCRC4B5gWL2Eq20xk2YQJGisZHkx67yhj6o8tZLpgClxuo/6B
jyk8DmAEFJkB1oyHRJGDECnR21G26/4y+F7Z0vjmOHXLGfPORytrlNTSG/0XMtlH
/3fcfyWjzOZGtADpUbo0goaHwkruW9TgXBRGBF8EAAn/IvBy/DfMmcQ4bybGMurL
1Qaff5onOp4hjxJSpKNAM6bBJE5V/kKxBRYZlE0rUHlmcDFC/2zsN+/DnIzRAp6j
EVHCjiD/NL0rBQCQd+bQskwt4vEDVH0U1SN43jQJVs5Th8fKmQw3LCrKTSAVCiUc
LnquFgUQSj6AwdKN4ZqSBpKGR7L0c1nvtTL9o1j0iJ8OMDV0pd7k/55sBeoFNAMr
7n4nc5DpKEh312syAq9xOPpMoQL5uhR1VDXyS+qCSuvXCFFGkRetEyTr6I+io8Ml
rE2XT4H8JvbpRxFEzrDrNQkeU7OuNoFvADeg/yQDOKOack//E4Mqw32fakfyZH2G
DDLSmXMvEBL+TGOsN7tYeIF5wuCc8is7cMndYDGn/9Zdupdou3UO3ktXdkYQdG2+
a7KeKz6lT3XUTk5yfQN3eVZ5
=gaJ5
-----END PGP PUBLIC KEY BLOCK-----";

/// Key ID of [`TEST_PUBLIC_KEY`]
pub const TEST_PUBLIC_KEY_ID: &str = "43E022F601D125DC";

/// GitHub style API URL for a release asset
pub fn asset_url(asset_id: u64) -> String {
    format!(
        "https://api.github.com/repos/acme/provider-aws/releases/assets/{}",
        asset_id
    )
}

/// Build a release with the given tag and assets
pub fn release(tag: &str, assets: Vec<ReleaseAsset>) -> Release {
    Release {
        tag_name: tag.to_string(),
        assets,
    }
}

/// In-memory repository source.
///
/// Repositories are filtered by owner login, releases are keyed by repository
/// name, and both listings are split into pages of `page_size` items.
#[derive(Debug, Default)]
pub struct StubRepositorySource {
    repositories: Vec<Repository>,
    releases: HashMap<String, Vec<Release>>,
    page_size: Option<usize>,
    failure_status: Option<u16>,
    delay: Option<Duration>,
    repository_pages: Mutex<Vec<u32>>,
    release_pages: Mutex<Vec<u32>>,
}

impl StubRepositorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repositories(mut self, repositories: Vec<Repository>) -> Self {
        self.repositories.extend(repositories);
        self
    }

    pub fn with_releases(mut self, repository: &str, releases: Vec<Release>) -> Self {
        self.releases.insert(repository.to_string(), releases);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size.max(1));
        self
    }

    /// Fail every call with the given HTTP status
    pub fn failing_with_status(mut self, status: u16) -> Self {
        self.failure_status = Some(status);
        self
    }

    /// Delay every call, for exercising cancellation
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Page numbers requested from the repository listing so far
    pub fn repository_page_requests(&self) -> Vec<u32> {
        self.repository_pages
            .lock()
            .map(|pages| pages.clone())
            .unwrap_or_default()
    }

    /// Page numbers requested from release listings so far
    pub fn release_page_requests(&self) -> Vec<u32> {
        self.release_pages
            .lock()
            .map(|pages| pages.clone())
            .unwrap_or_default()
    }

    async fn before_call(&self) -> Result<(), SourceError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.failure_status {
            Some(status) => Err(SourceError::status(status, "stub failure")),
            None => Ok(()),
        }
    }

    fn page_of<T: Clone>(&self, items: &[T], page: u32) -> Page<T> {
        let Some(page_size) = self.page_size else {
            return Page::last(items.to_vec());
        };

        let total = items.len();
        let start = (page.saturating_sub(1) as usize) * page_size;
        let end = (start + page_size).min(total);
        let items = items.get(start..end).map(<[T]>::to_vec).unwrap_or_default();
        let next_page = (end < total).then_some(page + 1);
        Page { items, next_page }
    }
}

#[async_trait::async_trait]
impl RepositorySource for StubRepositorySource {
    async fn list_org_repositories(
        &self,
        org: &str,
        page: u32,
        _token: &str,
    ) -> Result<Page<Repository>, SourceError> {
        if let Ok(mut pages) = self.repository_pages.lock() {
            pages.push(page);
        }
        self.before_call().await?;

        let repositories: Vec<Repository> = self
            .repositories
            .iter()
            .filter(|repo| repo.owner_login() == Some(org))
            .cloned()
            .collect();
        Ok(self.page_of(&repositories, page))
    }

    async fn list_releases(
        &self,
        _org: &str,
        repo: &str,
        page: u32,
        _token: &str,
    ) -> Result<Page<Release>, SourceError> {
        if let Ok(mut pages) = self.release_pages.lock() {
            pages.push(page);
        }
        self.before_call().await?;

        let releases = self.releases.get(repo).cloned().unwrap_or_default();
        Ok(self.page_of(&releases, page))
    }

    async fn get_release_by_tag(
        &self,
        _org: &str,
        repo: &str,
        tag: &str,
        _token: &str,
    ) -> Result<Release, SourceError> {
        self.before_call().await?;

        self.releases
            .get(repo)
            .and_then(|releases| releases.iter().find(|release| release.tag_name == tag))
            .cloned()
            .ok_or_else(|| SourceError::status(404, "release not found"))
    }
}

/// In-memory artifact fetcher keyed by URL.
///
/// Unknown URLs fail with a 404 status.
#[derive(Debug, Default)]
pub struct StubArtifactFetcher {
    contents: HashMap<String, Vec<u8>>,
    requested: Mutex<Vec<String>>,
}

impl StubArtifactFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(mut self, url: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.contents.insert(url.into(), contents.into());
        self
    }

    /// URLs fetched so far, in request order
    pub fn requested_urls(&self) -> Vec<String> {
        self.requested
            .lock()
            .map(|requested| requested.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl ArtifactFetcher for StubArtifactFetcher {
    async fn fetch(&self, url: &str, _token: &str) -> Result<Vec<u8>, SourceError> {
        if let Ok(mut requested) = self.requested.lock() {
            requested.push(url.to_string());
        }

        self.contents
            .get(url)
            .cloned()
            .ok_or_else(|| SourceError::status(404, format!("no stub contents for {}", url)))
    }
}
