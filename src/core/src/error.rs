//! Unified error types for scopegate
//!
//! Store implementations and the shared types report failures through
//! [`CoreError`]; the authorization crate wraps it in its own error type.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type shared by stores and types
#[derive(Debug, Error)]
pub enum CoreError {
    /// Backing store failed (connection, query, write)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/Deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Create a storage error
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        CoreError::Storage(msg.into())
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        CoreError::NotFound(msg.into())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let err = CoreError::storage("test");
        assert!(matches!(err, CoreError::Storage(_)));

        let err = CoreError::not_found("test");
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn test_error_display() {
        let err = CoreError::storage("connection refused");
        assert_eq!(err.to_string(), "Storage error: connection refused");

        let err = CoreError::not_found("api key 42");
        assert_eq!(err.to_string(), "Not found: api key 42");
    }

    #[test]
    fn test_from_serde_json() {
        let err: CoreError = serde_json::from_str::<Vec<String>>("{").unwrap_err().into();
        assert!(matches!(err, CoreError::Serialization(_)));
    }
}
