//! Axum middleware for GitHub token authentication
//!
//! Clients send a GitHub token in the configured header. The registry does not
//! validate the token itself; it is forwarded with every upstream call and
//! GitHub decides what the token may see.

use crate::http::errors::HttpError;
use crate::http::handlers::AppState;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

/// Token supplied by the client, attached to the request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken(pub String);

/// Extract a non-blank token from the given header
pub fn extract_token(headers: &HeaderMap, header_name: &str) -> Option<String> {
    let value = headers.get(header_name)?.to_str().ok()?.trim();
    if value.is_empty() {
        return None;
    }
    Some(value.to_string())
}

/// Axum middleware function that requires a token on protected routes
pub async fn token_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let token = extract_token(req.headers(), &state.auth_token_header)
        .ok_or_else(HttpError::unauthorized)?;

    req.extensions_mut().insert(AuthToken(token));
    Ok(next.run(req).await)
}
