//! End-to-end checks: headers in, decision out

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use http::{HeaderMap, HeaderValue};
use scopegate_authz::store::{InMemoryCredentialStore, InMemoryGroupStore};
use scopegate_authz::{
    generate_key, ApiKeyAuthenticator, AuthConfig, AuthError, DecisionReason, EndpointRegistry,
    Principal, PrincipalKind, ScopeAuthorizer,
};
use scopegate_core::{
    Blake3KeyHasher, CoreError, CredentialStore, EndpointDescriptor, GrantSet, GroupRecord,
    KeyRecord, Operation, UserIdentity,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

fn grants(scopes: &[&str]) -> GrantSet {
    scopes.iter().copied().collect()
}

fn api_key_header(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        http::header::AUTHORIZATION,
        HeaderValue::from_str(value).unwrap(),
    );
    headers
}

fn posts() -> EndpointDescriptor {
    EndpointDescriptor::new("blog", "PostViewSet")
        .with_resource("posts")
        .with_handlers(["create", "list", "destroy"])
        .with_custom_action("publish")
}

/// Store with one issued key; returns the plaintext key
fn store_with(record_scopes: GrantSet) -> (Arc<InMemoryCredentialStore>, String, Uuid) {
    let store = Arc::new(InMemoryCredentialStore::new());
    let issued = generate_key("test", record_scopes, &Blake3KeyHasher::new());
    let id = issued.record.id;
    store.insert(issued.record);
    (store, issued.key, id)
}

#[test]
fn test_posts_catalogue_order() {
    let registry: EndpointRegistry = [posts()].into_iter().collect();
    let catalogue = registry.discover();

    assert_eq!(
        catalogue.get("blog", "posts").unwrap(),
        &["posts.read", "posts.write", "posts.delete", "posts.publish"]
    );
}

#[test]
fn test_catalogue_lists_every_enforced_action() {
    let names = [
        "list", "retrieve", "read", "create", "update", "partial_update", "write", "destroy",
        "delete", "publish",
    ];
    let endpoint = names
        .iter()
        .fold(EndpointDescriptor::new("blog", "PostViewSet"), |ep, name| {
            ep.with_custom_action(*name)
        });

    let registry: EndpointRegistry = [endpoint.clone()].into_iter().collect();
    let catalogue = registry.discover();
    let authorizer = ScopeAuthorizer::default();

    for name in names {
        let required = authorizer.required_scope(&endpoint, &Operation::from_handler(name));
        let scope = required.as_str().unwrap();
        assert!(catalogue.contains(scope), "{} enforces {} which is not listed", name, scope);
    }
    assert_eq!(
        catalogue.get("blog", "post").unwrap(),
        &["post.read", "post.write", "post.delete", "post.publish"]
    );
}

#[tokio::test]
async fn test_read_only_key_denied_write() {
    let (store, key, _) = store_with(grants(&["posts.read"]));
    let authn = ApiKeyAuthenticator::new(AuthConfig::default(), store).unwrap();
    let authorizer = ScopeAuthorizer::default();

    let principal = authn
        .authenticate(&api_key_header(&format!("Api-Key {}", key)))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(principal.kind(), PrincipalKind::Credential);

    let read = authorizer.check(Some(&principal), &posts(), &Operation::Read).await.unwrap();
    assert!(read.allowed);

    let write = authorizer
        .check(Some(&principal), &posts(), &Operation::from_handler("create"))
        .await
        .unwrap();
    assert!(!write.allowed);
    assert_eq!(write.denial_reason(), Some("posts.write"));
}

#[tokio::test]
async fn test_keyword_casing_resolves_same_record() {
    let (store, key, id) = store_with(grants(&["posts.read"]));
    let authn = ApiKeyAuthenticator::new(AuthConfig::default(), store).unwrap();

    for keyword in ["Api-Key", "api-key", "API-KEY", "aPi-KeY"] {
        let principal = authn
            .authenticate(&api_key_header(&format!("{} {}", keyword, key)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(principal.key().unwrap().id, id);
    }
}

#[tokio::test]
async fn test_required_scope_override() {
    let export = EndpointDescriptor::new("reports", "ReportViewSet")
        .with_handler("list")
        .with_required_scope("analytics.export");
    let authorizer = ScopeAuthorizer::default();

    let (store, key, _) = store_with(grants(&["report.read"]));
    let authn = ApiKeyAuthenticator::new(AuthConfig::default(), store).unwrap();
    let reader = authn.authenticate_key(&key).await.unwrap();

    let decision = authorizer.check(Some(&reader), &export, &Operation::Read).await.unwrap();
    assert!(!decision.allowed);
    assert_eq!(decision.denial_reason(), Some("analytics.export"));

    let (store, key, _) = store_with(grants(&["analytics.export"]));
    let authn = ApiKeyAuthenticator::new(AuthConfig::default(), store).unwrap();
    let exporter = authn.authenticate_key(&key).await.unwrap();

    let decision = authorizer.check(Some(&exporter), &export, &Operation::Read).await.unwrap();
    assert!(decision.allowed);
}

#[tokio::test]
async fn test_expired_and_revoked_keys_never_authenticate() {
    let hasher = Blake3KeyHasher::new();
    let store = Arc::new(InMemoryCredentialStore::new());

    let mut expired = generate_key("expired", GrantSet::new(), &hasher);
    expired.record = expired.record.with_expiry(Utc::now() - Duration::minutes(1));
    store.insert(expired.record);

    let mut revoked = generate_key("revoked", GrantSet::new(), &hasher);
    revoked.record = revoked.record.revoked();
    store.insert(revoked.record);

    let authn = ApiKeyAuthenticator::new(AuthConfig::default(), store).unwrap();

    for key in [&expired.key, &revoked.key, &"unknown.key".to_string()] {
        let err = authn
            .authenticate(&api_key_header(&format!("Api-Key {}", key)))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredential));
        assert_eq!(err.to_string(), "Invalid API key");
    }
}

#[tokio::test]
async fn test_future_expiry_still_authenticates() {
    let hasher = Blake3KeyHasher::new();
    let store = Arc::new(InMemoryCredentialStore::new());
    let mut issued = generate_key("soon", GrantSet::new(), &hasher);
    issued.record = issued.record.with_expiry(Utc::now() + Duration::days(1));
    store.insert(issued.record);

    let authn = ApiKeyAuthenticator::new(AuthConfig::default(), store).unwrap();
    assert!(authn.authenticate_key(&issued.key).await.is_ok());
}

#[tokio::test]
async fn test_empty_grant_asymmetry() {
    let authorizer = ScopeAuthorizer::default();
    let endpoint = posts();

    let (store, key, _) = store_with(GrantSet::new());
    let authn = ApiKeyAuthenticator::new(AuthConfig::default(), store).unwrap();
    let legacy_key = authn.authenticate_key(&key).await.unwrap();

    let groups = Arc::new(InMemoryGroupStore::new());
    groups.add_group(GroupRecord::new("nothing", GrantSet::new()));
    groups.add_member("u1", "nothing");
    let user = Principal::user(UserIdentity::new("u1"), groups);

    for op in [
        Operation::Read,
        Operation::Write,
        Operation::Delete,
        Operation::custom("publish"),
    ] {
        let allowed = authorizer.check(Some(&legacy_key), &endpoint, &op).await.unwrap();
        assert!(allowed.allowed);
        assert_eq!(allowed.reason, DecisionReason::Unrestricted);

        let denied = authorizer.check(Some(&user), &endpoint, &op).await.unwrap();
        assert!(!denied.allowed);
        assert_eq!(denied.reason, DecisionReason::EmptyGrants);
    }
}

#[tokio::test]
async fn test_group_union_across_memberships() {
    let groups = Arc::new(InMemoryGroupStore::new());
    groups.add_group(GroupRecord::new("readers", grants(&["posts.read"])));
    groups.add_group(GroupRecord::new("publishers", grants(&["posts.publish"])));
    groups.add_member("alice", "readers");
    groups.add_member("alice", "publishers");

    let alice = Principal::user(UserIdentity::new("alice"), groups);
    let authorizer = ScopeAuthorizer::default();

    let publish = authorizer
        .check(Some(&alice), &posts(), &Operation::from_handler("publish"))
        .await
        .unwrap();
    assert!(publish.allowed);

    let delete = authorizer.check(Some(&alice), &posts(), &Operation::Delete).await.unwrap();
    assert_eq!(delete.denial_reason(), Some("posts.delete"));
}

#[tokio::test]
async fn test_repeated_checks_agree() {
    let (store, key, _) = store_with(grants(&["posts.read"]));
    let authn = ApiKeyAuthenticator::new(AuthConfig::default(), store).unwrap();
    let principal = authn.authenticate_key(&key).await.unwrap();
    let authorizer = ScopeAuthorizer::default();

    for op in [Operation::Read, Operation::Write] {
        let first = authorizer.check(Some(&principal), &posts(), &op).await.unwrap();
        let second = authorizer.check(Some(&principal), &posts(), &op).await.unwrap();
        assert_eq!(first, second);
    }
}

#[tokio::test]
async fn test_last_used_tracking() {
    let (store, key, id) = store_with(GrantSet::new());

    let untracked = ApiKeyAuthenticator::new(AuthConfig::default(), store.clone()).unwrap();
    untracked.authenticate_key(&key).await.unwrap();
    tokio::task::yield_now().await;
    assert!(store.get(&id).unwrap().last_used_at.is_none());

    let tracked = ApiKeyAuthenticator::new(
        AuthConfig::default().with_last_used_tracking(true),
        store.clone(),
    )
    .unwrap();
    let principal = tracked.authenticate_key(&key).await.unwrap();
    assert!(principal.key().unwrap().last_used_at.is_some());

    for _ in 0..100 {
        if store.get(&id).unwrap().last_used_at.is_some() {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert!(store.get(&id).unwrap().last_used_at.is_some());
}

/// Lookups succeed; every last-used write fails
struct ReadOnlyStore {
    inner: InMemoryCredentialStore,
    touches: AtomicUsize,
}

#[async_trait]
impl CredentialStore for ReadOnlyStore {
    async fn find_by_digest(&self, digest: &str) -> scopegate_core::Result<Option<KeyRecord>> {
        self.inner.find_by_digest(digest).await
    }

    async fn touch_last_used(&self, _id: Uuid, _at: DateTime<Utc>) -> scopegate_core::Result<()> {
        self.touches.fetch_add(1, Ordering::SeqCst);
        Err(CoreError::storage("read-only replica"))
    }
}

#[tokio::test]
async fn test_failed_last_used_write_does_not_fail_request() {
    let issued = generate_key("ci", grants(&["posts.read"]), &Blake3KeyHasher::new());
    let inner = InMemoryCredentialStore::new();
    inner.insert(issued.record);

    let store = Arc::new(ReadOnlyStore {
        inner,
        touches: AtomicUsize::new(0),
    });
    let authn = ApiKeyAuthenticator::new(
        AuthConfig::default().with_last_used_tracking(true),
        Arc::clone(&store) as Arc<dyn CredentialStore>,
    )
    .unwrap();

    let principal = authn.authenticate_key(&issued.key).await.unwrap();
    for _ in 0..100 {
        if store.touches.load(Ordering::SeqCst) > 0 {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert!(store.touches.load(Ordering::SeqCst) >= 1);

    let decision = ScopeAuthorizer::default()
        .check(Some(&principal), &posts(), &Operation::Read)
        .await
        .unwrap();
    assert!(decision.allowed);
}

#[tokio::test]
async fn test_custom_keyword_and_header() {
    let (store, key, id) = store_with(GrantSet::new());
    let config = AuthConfig::default()
        .with_keyword("Token")
        .with_custom_header("X-Api-Key");
    let authn = ApiKeyAuthenticator::new(config, store).unwrap();

    let via_scheme = authn
        .authenticate(&api_key_header(&format!("token {}", key)))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(via_scheme.key().unwrap().id, id);

    let mut headers = HeaderMap::new();
    headers.insert("x-api-key", HeaderValue::from_str(&key).unwrap());
    let via_header = authn.authenticate(&headers).await.unwrap().unwrap();
    assert_eq!(via_header.key().unwrap().id, id);

    let default_keyword = authn
        .authenticate(&api_key_header(&format!("Api-Key {}", key)))
        .await
        .unwrap();
    assert!(default_keyword.is_none());
}
