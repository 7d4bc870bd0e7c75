//! Error types for the authorization engine

use scopegate_core::CoreError;
use thiserror::Error;

use crate::discovery::DiscoveryError;

/// Authorization engine errors
#[derive(Debug, Error)]
pub enum AuthzError {
    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Endpoint metadata could not be introspected
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Credential or group store failure
    #[error("Store error: {0}")]
    Store(#[from] CoreError),
}

/// Result type for authorization operations
pub type Result<T> = std::result::Result<T, AuthzError>;
