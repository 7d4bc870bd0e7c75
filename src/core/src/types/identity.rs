//! User identities and scoped groups

use serde::{Deserialize, Serialize};
use std::fmt;

use super::scope::GrantSet;

/// A user already authenticated by another mechanism (session, JWT, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,

    #[serde(default)]
    pub username: String,

    /// Superusers pass every scope check
    #[serde(default)]
    pub is_superuser: bool,
}

impl UserIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            username: id.clone(),
            id,
            is_superuser: false,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn superuser(mut self) -> Self {
        self.is_superuser = true;
        self
    }
}

/// Named group of users with a grant set
///
/// An empty grant set grants nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub name: String,

    #[serde(default)]
    pub scopes: GrantSet,
}

impl GroupRecord {
    pub fn new(name: impl Into<String>, scopes: GrantSet) -> Self {
        Self {
            name: name.into(),
            scopes,
        }
    }

    pub fn has_scope(&self, required: &str) -> bool {
        self.scopes.contains(required)
    }
}

impl fmt::Display for GroupRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} scopes)", self.name, self.scopes.len())
    }
}
