//! Authorization decision types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a check ended the way it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    /// Endpoint has no resource name and no override
    NoScopeRequired,
    /// Keyed credential with an empty grant set (legacy mode)
    Unrestricted,
    /// Superuser identity
    Superuser,
    /// Required scope is in the grant set
    ScopeGranted,
    /// A scope is required and there is no principal
    Unauthenticated,
    /// User principal whose groups grant nothing
    EmptyGrants,
    /// Required scope is not in the grant set
    MissingScope,
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NoScopeRequired => "no scope required",
            Self::Unrestricted => "unrestricted credential",
            Self::Superuser => "superuser",
            Self::ScopeGranted => "scope granted",
            Self::Unauthenticated => "no principal",
            Self::EmptyGrants => "no scopes granted",
            Self::MissingScope => "missing scope",
        };
        f.write_str(s)
    }
}

/// Outcome of one scope check
///
/// Carries no timestamps or ids, so two checks against unchanged state
/// compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthDecision {
    /// Whether the request is allowed
    pub allowed: bool,

    /// Scope the endpoint required, if any
    pub required_scope: Option<String>,

    pub reason: DecisionReason,
}

impl AuthDecision {
    pub fn allow(required_scope: Option<String>, reason: DecisionReason) -> Self {
        Self {
            allowed: true,
            required_scope,
            reason,
        }
    }

    pub fn deny(required_scope: Option<String>, reason: DecisionReason) -> Self {
        Self {
            allowed: false,
            required_scope,
            reason,
        }
    }

    /// The missing scope name for a denial, for diagnostics
    pub fn denial_reason(&self) -> Option<&str> {
        if self.allowed {
            None
        } else {
            self.required_scope.as_deref()
        }
    }
}

impl fmt::Display for AuthDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.allowed { "allow" } else { "deny" };
        match &self.required_scope {
            Some(scope) => write!(f, "{} ({}: {})", verdict, self.reason, scope),
            None => write!(f, "{} ({})", verdict, self.reason),
        }
    }
}
