//! HTTP error handling and conversion

use crate::core::error::RegistryError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Message returned for every failure that is not the client's to fix
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// HTTP error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// Missing token, or GitHub rejected the token
    Unauthorized(String),
    /// GitHub refused access with the given token
    Forbidden(String),

    NotFound(String),

    /// The request took longer than the configured request timeout
    Timeout(String),

    /// Server errors; the message is logged but not returned
    InternalServerError(String),
}

impl HttpError {
    /// Convert to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            HttpError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            HttpError::Forbidden(_) => StatusCode::FORBIDDEN,
            HttpError::NotFound(_) => StatusCode::NOT_FOUND,
            HttpError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            HttpError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client
    pub fn message(&self) -> &str {
        match self {
            HttpError::Unauthorized(msg)
            | HttpError::Forbidden(msg)
            | HttpError::NotFound(msg)
            | HttpError::Timeout(msg) => msg,
            HttpError::InternalServerError(_) => UNEXPECTED_ERROR_MESSAGE,
        }
    }

    pub fn unauthorized() -> Self {
        HttpError::Unauthorized("Unauthorized".to_string())
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            HttpError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            HttpError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            HttpError::Timeout(msg) => write!(f, "Request Timeout: {}", msg),
            HttpError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl std::error::Error for HttpError {}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        if let HttpError::InternalServerError(cause) = &self {
            error!(error = %cause, "Error retrieving plugin information");
        }

        let body = Json(json!({ "message": self.message() }));
        (self.status_code(), body).into_response()
    }
}

/// Convert registry errors to HTTP errors
impl From<RegistryError> for HttpError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::RepositoryNotFound(_) => {
                HttpError::NotFound("Plugin repository not found".to_string())
            }
            RegistryError::ReleaseNotFound(_) => {
                HttpError::NotFound("Plugin version not found".to_string())
            }
            RegistryError::Unauthorised => HttpError::unauthorized(),
            RegistryError::Forbidden => HttpError::Forbidden("Forbidden".to_string()),
            RegistryError::Cancelled => HttpError::Timeout("Request cancelled".to_string()),
            other => HttpError::InternalServerError(other.to_string()),
        }
    }
}

/// Result type alias for HTTP operations
pub type HttpResult<T> = Result<T, HttpError>;
