//! Credential records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::scope::GrantSet;

/// Stored API key with its grants
///
/// Only the digest of the secret is kept. An empty grant set means the key
/// is unrestricted (legacy mode).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    /// Unique key identifier
    pub id: Uuid,

    /// Human-readable name
    pub name: String,

    /// Public prefix of the key, safe to display
    pub prefix: String,

    /// Digest of the full key string
    pub digest: String,

    /// Granted scopes (empty = unrestricted)
    #[serde(default)]
    pub scopes: GrantSet,

    /// Revoked keys never authenticate
    #[serde(default)]
    pub revoked: bool,

    /// Optional expiry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Last successful authentication, when tracking is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl KeyRecord {
    pub fn new(
        name: impl Into<String>,
        prefix: impl Into<String>,
        digest: impl Into<String>,
        scopes: GrantSet,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            prefix: prefix.into(),
            digest: digest.into(),
            scopes,
            revoked: false,
            expires_at: None,
            last_used_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn revoked(mut self) -> Self {
        self.revoked = true;
        self
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |expiry| expiry < now)
    }

    /// Not revoked and not expired at `now`
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && !self.is_expired_at(now)
    }

    pub fn is_unrestricted(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Legacy-aware scope check: an unrestricted key has every scope
    pub fn has_scope(&self, required: &str) -> bool {
        self.is_unrestricted() || self.scopes.contains(required)
    }
}

impl fmt::Display for KeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unrestricted() {
            write!(f, "{} (unrestricted scopes)", self.name)
        } else {
            write!(f, "{} ({} scopes)", self.name, self.scopes.len())
        }
    }
}

/// Key record from before scopes existed
///
/// Migrated into [`KeyRecord`] with an empty grant set, which keeps the
/// key's unrestricted behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyKeyRecord {
    pub id: Uuid,
    pub name: String,
    pub prefix: String,
    pub digest: String,
    #[serde(default)]
    pub revoked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<LegacyKeyRecord> for KeyRecord {
    fn from(legacy: LegacyKeyRecord) -> Self {
        Self {
            id: legacy.id,
            name: legacy.name,
            prefix: legacy.prefix,
            digest: legacy.digest,
            scopes: GrantSet::new(),
            revoked: legacy.revoked,
            expires_at: legacy.expires_at,
            last_used_at: None,
            created_at: legacy.created_at,
        }
    }
}
