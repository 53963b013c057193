//! Error types for plugin resolution

use thiserror::Error;

/// Failure reported by an upstream collaborator (GitHub API or asset download).
///
/// Collaborators classify transport failures by status code before handing
/// them to the resolution engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("upstream responded with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("upstream request failed: {0}")]
    Transport(String),
}

impl SourceError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        SourceError::Status {
            status,
            message: message.into(),
        }
    }

    /// HTTP status code, when the upstream produced a response at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SourceError::Status { status, .. } => Some(*status),
            SourceError::Transport(_) => None,
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => SourceError::status(status.as_u16(), err.to_string()),
            None => SourceError::Transport(err.to_string()),
        }
    }
}

/// Errors produced while resolving plugin versions and packages
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("plugin repository not found: {0}")]
    RepositoryNotFound(String),

    #[error("plugin release not found: {0}")]
    ReleaseNotFound(String),

    #[error("not authorised to access this repository")]
    Unauthorised,

    #[error("forbidden to access this repository")]
    Forbidden,

    #[error("no public signing keys have been configured")]
    MissingSigningKeys,

    #[error("invalid public signing key: {0}")]
    InvalidKey(String),

    #[error("failed to find shasum for archive file: {0}")]
    ChecksumNotFound(String),

    #[error("request was cancelled")]
    Cancelled,

    #[error("malformed JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Internal(String),
}

impl RegistryError {
    /// Whether the error falls outside the classified taxonomy
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            RegistryError::Json(_) | RegistryError::Internal(_) | RegistryError::Cancelled
        )
    }

    /// Classify a failed release asset download.
    ///
    /// The repository and release are already resolved at this point, so a
    /// missing asset is a server side failure rather than a missing plugin.
    pub fn from_download(err: SourceError) -> Self {
        match err.status_code() {
            Some(401) => RegistryError::Unauthorised,
            Some(403) => RegistryError::Forbidden,
            _ => RegistryError::Internal(err.to_string()),
        }
    }

    /// Classify a failed release-by-tag lookup, where 404 means the version is absent
    pub fn from_release_lookup(err: SourceError) -> Self {
        match err.status_code() {
            Some(404) => RegistryError::ReleaseNotFound(err.to_string()),
            _ => err.into(),
        }
    }
}

impl From<SourceError> for RegistryError {
    fn from(err: SourceError) -> Self {
        match err.status_code() {
            Some(401) => RegistryError::Unauthorised,
            Some(403) => RegistryError::Forbidden,
            Some(404) => RegistryError::RepositoryNotFound(err.to_string()),
            _ => RegistryError::Internal(err.to_string()),
        }
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;
