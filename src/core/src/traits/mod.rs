//! Shared traits for scopegate

pub mod store;
pub mod hashing;

// Re-export commonly used traits
pub use store::{CredentialStore, GroupStore};
pub use hashing::{Blake3KeyHasher, KeyHasher};
