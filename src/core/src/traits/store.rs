//! Storage traits for credentials and groups
//!
//! Persistence is owned outside the core; these are the only operations the
//! authorization engine needs from it.

use crate::error::Result;
use crate::types::{GrantSet, KeyRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Credential lookup and last-used tracking
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find the key whose digest matches
    ///
    /// Stores may filter revoked keys out here; callers still check.
    async fn find_by_digest(&self, digest: &str) -> Result<Option<KeyRecord>>;

    /// Record a successful use. Concurrent writers race; last write wins.
    async fn touch_last_used(&self, id: Uuid, at: DateTime<Utc>) -> Result<()>;
}

/// Group grant lookup
#[async_trait]
pub trait GroupStore: Send + Sync {
    /// Union of the grant sets of every group the user belongs to
    ///
    /// Implementations must answer in a single round trip rather than one
    /// query per group.
    async fn scopes_for_user(&self, user_id: &str) -> Result<GrantSet>;
}
