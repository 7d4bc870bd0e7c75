//! Scope authorizer
//!
//! Decides, for one endpoint invocation, whether a principal holds the scope
//! the endpoint requires.
//!
//! # Decision order
//!
//! ```text
//! required scope ── none ──────────────────────────────▶ allow
//!       │
//!   no principal ──────────────────────────────────────▶ deny
//!       │
//!   superuser ─────────────────────────────────────────▶ allow
//!       │
//!   empty grants ── credential ▶ allow   user ▶ deny
//!       │
//!   membership ──── granted ▶ allow      missing ▶ deny
//! ```

pub mod decision;
pub mod principal;

pub use decision::{AuthDecision, DecisionReason};
pub use principal::{Principal, PrincipalKind};

use scopegate_core::{EndpointDescriptor, Operation, Scope};
use tracing::debug;

use crate::config::AuthorizerConfig;
use crate::error::Result;
use crate::scope::scope_for;

/// Scope an endpoint invocation requires
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequiredScope {
    /// Endpoint opted out of scope enforcement
    None,
    /// Declared override, used verbatim
    Explicit(String),
    /// `resource.action` derived from the endpoint and operation
    Derived(Scope),
}

impl RequiredScope {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RequiredScope::None => None,
            RequiredScope::Explicit(scope) => Some(scope),
            RequiredScope::Derived(scope) => Some(scope.as_str()),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, RequiredScope::None)
    }
}

/// Checks principals against endpoint scopes
///
/// Holds no per-request state; one instance serves every request.
#[derive(Debug, Clone, Default)]
pub struct ScopeAuthorizer {
    config: AuthorizerConfig,
}

impl ScopeAuthorizer {
    pub fn new(config: AuthorizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AuthorizerConfig {
        &self.config
    }

    /// Scope required to invoke `operation` on `endpoint`
    ///
    /// An explicit override always wins; the derived scope is not computed
    /// at all in that case. An empty override opts the endpoint out.
    pub fn required_scope(&self, endpoint: &EndpointDescriptor, operation: &Operation) -> RequiredScope {
        match endpoint.required_scope.as_deref() {
            Some("") => return RequiredScope::None,
            Some(explicit) => return RequiredScope::Explicit(explicit.to_string()),
            None => {}
        }

        match scope_for(endpoint, operation) {
            Some(scope) => RequiredScope::Derived(scope),
            None => RequiredScope::None,
        }
    }

    /// Decide whether `principal` may invoke `operation` on `endpoint`
    ///
    /// Side-effect free apart from resolving the principal's grant set on
    /// first use; repeated calls against unchanged state agree.
    pub async fn check(
        &self,
        principal: Option<&Principal>,
        endpoint: &EndpointDescriptor,
        operation: &Operation,
    ) -> Result<AuthDecision> {
        let required = self.required_scope(endpoint, operation);
        let Some(scope) = required.as_str() else {
            return Ok(AuthDecision::allow(None, DecisionReason::NoScopeRequired));
        };
        let scope_owned = || Some(scope.to_string());

        let Some(principal) = principal else {
            debug!(scope = %scope, "Denied: no principal");
            return Ok(AuthDecision::deny(scope_owned(), DecisionReason::Unauthenticated));
        };

        if self.config.superuser_bypass && principal.is_superuser() {
            return Ok(AuthDecision::allow(scope_owned(), DecisionReason::Superuser));
        }

        let grants = principal.grant_set().await?;

        let decision = if grants.is_empty() {
            match principal.kind() {
                PrincipalKind::Credential => {
                    AuthDecision::allow(scope_owned(), DecisionReason::Unrestricted)
                }
                PrincipalKind::User => AuthDecision::deny(scope_owned(), DecisionReason::EmptyGrants),
            }
        } else if grants.contains(scope) {
            AuthDecision::allow(scope_owned(), DecisionReason::ScopeGranted)
        } else {
            AuthDecision::deny(scope_owned(), DecisionReason::MissingScope)
        };

        if !decision.allowed {
            debug!(
                principal = %principal.id(),
                scope = %scope,
                reason = %decision.reason,
                "Denied"
            );
        }

        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use scopegate_core::{CoreError, GrantSet, GroupStore, KeyRecord, UserIdentity};
    use std::sync::Arc;

    struct FixedGroups(GrantSet);

    #[async_trait]
    impl GroupStore for FixedGroups {
        async fn scopes_for_user(&self, _user_id: &str) -> scopegate_core::Result<GrantSet> {
            Ok(self.0.clone())
        }
    }

    struct BrokenGroups;

    #[async_trait]
    impl GroupStore for BrokenGroups {
        async fn scopes_for_user(&self, _user_id: &str) -> scopegate_core::Result<GrantSet> {
            Err(CoreError::storage("connection refused"))
        }
    }

    fn posts() -> EndpointDescriptor {
        EndpointDescriptor::new("blog", "PostViewSet")
            .with_resource("posts")
            .with_handlers(["list", "create", "destroy"])
    }

    fn key(scopes: &[&str]) -> Principal {
        Principal::credential(KeyRecord::new(
            "test",
            "abcd1234",
            "digest",
            scopes.iter().copied().collect(),
        ))
    }

    fn user(scopes: &[&str]) -> Principal {
        let groups = FixedGroups(scopes.iter().copied().collect());
        Principal::user(UserIdentity::new("u1"), Arc::new(groups))
    }

    #[test]
    fn test_required_scope_derivation() {
        let authorizer = ScopeAuthorizer::default();
        assert_eq!(
            authorizer.required_scope(&posts(), &Operation::Write).as_str(),
            Some("posts.write")
        );

        let export = EndpointDescriptor::new("reports", "ReportView")
            .with_resource("reports")
            .with_required_scope("analytics.export");
        assert_eq!(
            authorizer.required_scope(&export, &Operation::Read),
            RequiredScope::Explicit("analytics.export".to_string())
        );

        let anonymous = EndpointDescriptor::new("misc", "View");
        assert!(authorizer.required_scope(&anonymous, &Operation::Read).is_none());
    }

    #[tokio::test]
    async fn test_missing_scope_denied_with_reason() {
        let authorizer = ScopeAuthorizer::default();
        let decision = authorizer
            .check(Some(&key(&["posts.read"])), &posts(), &Operation::Write)
            .await
            .unwrap();

        assert!(!decision.allowed);
        assert_eq!(decision.reason, DecisionReason::MissingScope);
        assert_eq!(decision.denial_reason(), Some("posts.write"));
    }

    #[tokio::test]
    async fn test_empty_grant_asymmetry() {
        let authorizer = ScopeAuthorizer::default();

        let legacy = authorizer
            .check(Some(&key(&[])), &posts(), &Operation::Delete)
            .await
            .unwrap();
        assert!(legacy.allowed);
        assert_eq!(legacy.reason, DecisionReason::Unrestricted);

        let groupless = authorizer
            .check(Some(&user(&[])), &posts(), &Operation::Read)
            .await
            .unwrap();
        assert!(!groupless.allowed);
        assert_eq!(groupless.reason, DecisionReason::EmptyGrants);
    }

    #[tokio::test]
    async fn test_no_principal() {
        let authorizer = ScopeAuthorizer::default();
        let decision = authorizer.check(None, &posts(), &Operation::Read).await.unwrap();
        assert_eq!(decision.reason, DecisionReason::Unauthenticated);

        let anonymous = EndpointDescriptor::new("misc", "View");
        let decision = authorizer.check(None, &anonymous, &Operation::Read).await.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.reason, DecisionReason::NoScopeRequired);
    }

    #[tokio::test]
    async fn test_superuser_bypass_is_configurable() {
        let admin = Principal::user(
            UserIdentity::new("root").superuser(),
            Arc::new(FixedGroups(GrantSet::new())),
        );

        let on = ScopeAuthorizer::default();
        let decision = on.check(Some(&admin), &posts(), &Operation::Delete).await.unwrap();
        assert_eq!(decision.reason, DecisionReason::Superuser);

        let off = ScopeAuthorizer::new(AuthorizerConfig {
            superuser_bypass: false,
        });
        let decision = off.check(Some(&admin), &posts(), &Operation::Delete).await.unwrap();
        assert!(!decision.allowed);
    }

    #[tokio::test]
    async fn test_group_store_failure_propagates() {
        let principal = Principal::user(UserIdentity::new("u1"), Arc::new(BrokenGroups));
        let result = ScopeAuthorizer::default()
            .check(Some(&principal), &posts(), &Operation::Read)
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_check_outside_runtime() {
        let authorizer = ScopeAuthorizer::default();
        let principal = key(&["posts.read"]);

        let decision = tokio_test::block_on(async {
            authorizer
                .check(Some(&principal), &posts(), &Operation::Read)
                .await
                .unwrap()
        });
        assert_eq!(decision.reason, DecisionReason::ScopeGranted);
    }

    #[tokio::test]
    async fn test_empty_override_requires_nothing() {
        let endpoint = posts().with_required_scope("");
        let authorizer = ScopeAuthorizer::default();

        assert_eq!(authorizer.required_scope(&endpoint, &Operation::Write), RequiredScope::None);

        let decision = authorizer
            .check(Some(&key(&["posts.read"])), &endpoint, &Operation::Write)
            .await
            .unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.reason, DecisionReason::NoScopeRequired);
        assert_eq!(decision.required_scope, None);
    }
}
