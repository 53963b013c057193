//! Token authentication for the registry protocol endpoints

pub mod middleware;

/// Re-export commonly used auth types
pub use middleware::{token_middleware, AuthToken};
