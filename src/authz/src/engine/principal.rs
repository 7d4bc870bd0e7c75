//! Authenticated principals
//!
//! A principal is either a keyed credential, whose grants travel with the
//! record, or a user whose grants are the union of their groups' grants.
//! The union is looked up at most once per principal, so a request that is
//! checked several times pays for one store round trip.

use scopegate_core::{CoreError, GrantSet, GroupStore, KeyRecord, UserIdentity};
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Kind of principal, which decides how an empty grant set is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalKind {
    /// Empty grants mean unrestricted
    Credential,
    /// Empty grants mean no access
    User,
}

enum Identity {
    Credential(KeyRecord),
    User {
        user: UserIdentity,
        groups: Arc<dyn GroupStore>,
    },
}

/// The identity a request is evaluated for
pub struct Principal {
    identity: Identity,
    grants: OnceCell<GrantSet>,
}

impl Principal {
    /// Principal for an authenticated API key
    pub fn credential(key: KeyRecord) -> Self {
        Self {
            identity: Identity::Credential(key),
            grants: OnceCell::new(),
        }
    }

    /// Principal for a user authenticated elsewhere
    pub fn user(user: UserIdentity, groups: Arc<dyn GroupStore>) -> Self {
        Self {
            identity: Identity::User { user, groups },
            grants: OnceCell::new(),
        }
    }

    pub fn kind(&self) -> PrincipalKind {
        match self.identity {
            Identity::Credential(_) => PrincipalKind::Credential,
            Identity::User { .. } => PrincipalKind::User,
        }
    }

    /// Key id or user id
    pub fn id(&self) -> String {
        match &self.identity {
            Identity::Credential(key) => key.id.to_string(),
            Identity::User { user, .. } => user.id.clone(),
        }
    }

    pub fn key(&self) -> Option<&KeyRecord> {
        match &self.identity {
            Identity::Credential(key) => Some(key),
            Identity::User { .. } => None,
        }
    }

    pub fn user_identity(&self) -> Option<&UserIdentity> {
        match &self.identity {
            Identity::User { user, .. } => Some(user),
            Identity::Credential(_) => None,
        }
    }

    /// API keys are never superusers
    pub fn is_superuser(&self) -> bool {
        self.user_identity().map_or(false, |user| user.is_superuser)
    }

    /// Effective grant set, resolved on first use
    pub async fn grant_set(&self) -> Result<&GrantSet, CoreError> {
        match &self.identity {
            Identity::Credential(key) => Ok(&key.scopes),
            Identity::User { user, groups } => {
                self.grants
                    .get_or_try_init(|| async { groups.scopes_for_user(&user.id).await })
                    .await
            }
        }
    }

    /// Whether the group union has already been looked up
    pub fn is_grant_set_resolved(&self) -> bool {
        match self.identity {
            Identity::Credential(_) => true,
            Identity::User { .. } => self.grants.initialized(),
        }
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Principal");
        s.field("kind", &self.kind()).field("id", &self.id());
        if let Identity::Credential(key) = &self.identity {
            s.field("name", &key.name);
        }
        s.finish_non_exhaustive()
    }
}
