//! Shared types for scopegate

pub mod scope;
pub mod endpoint;
pub mod credential;
pub mod identity;

// Re-export commonly used types
pub use scope::{GrantSet, Scope, ScopeError, SCOPE_SEPARATOR};
pub use endpoint::{EndpointDescriptor, Operation};
pub use credential::{KeyRecord, LegacyKeyRecord};
pub use identity::{GroupRecord, UserIdentity};
