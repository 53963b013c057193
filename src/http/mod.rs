//! HTTP server implementation of the plugin registry protocol
//!
//! This module provides the service discovery manifest and the protected
//! `/plugins` endpoints using Axum.

pub mod auth;
pub mod errors;
pub mod handlers;
pub mod server;

pub use errors::{HttpError, HttpResult};
pub use handlers::AppState;
/// Re-export commonly used types
pub use server::RegistryServer;
