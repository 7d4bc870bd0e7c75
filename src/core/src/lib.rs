//! # scopegate core
//!
//! Shared types, store traits, and error handling for the scopegate
//! workspace. The authorization engine and the HTTP integration both build
//! on these so that a scope means the same thing everywhere.

pub mod types;
pub mod traits;
pub mod error;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use types::{
    EndpointDescriptor, GrantSet, GroupRecord, KeyRecord, LegacyKeyRecord, Operation, Scope,
    UserIdentity, SCOPE_SEPARATOR,
};
pub use traits::{Blake3KeyHasher, CredentialStore, GroupStore, KeyHasher};
