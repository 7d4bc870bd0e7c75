//! # scopegate Authorization Engine
//!
//! Scope-based access control for API endpoints. A scope is a
//! `resource.action` string; a request is allowed when its principal holds
//! the scope its endpoint requires.
//!
//! ## Components
//!
//! - **Resource name resolution** ([`scope`]): one function maps an endpoint
//!   to its resource name, shared by discovery and enforcement
//! - **Scope discovery** ([`discovery`]): the catalogue of assignable scopes,
//!   grouped by app and resource
//! - **API key authentication** ([`authn`]): request headers to principal
//! - **Scope authorization** ([`engine`]): allow/deny with a reason
//!
//! ## Example
//!
//! ```rust
//! use scopegate_authz::{AuthConfig, ApiKeyAuthenticator, ScopeAuthorizer, generate_key};
//! use scopegate_authz::store::InMemoryCredentialStore;
//! use scopegate_core::{Blake3KeyHasher, EndpointDescriptor, Operation};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(InMemoryCredentialStore::new());
//!     let issued = generate_key(
//!         "reporting",
//!         ["posts.read"].into_iter().collect(),
//!         &Blake3KeyHasher::new(),
//!     );
//!     store.insert(issued.record);
//!
//!     let authn = ApiKeyAuthenticator::new(AuthConfig::default(), store)?;
//!     let principal = authn.authenticate_key(&issued.key).await?;
//!
//!     let posts = EndpointDescriptor::new("blog", "PostViewSet").with_handlers(["list", "create"]);
//!     let decision = ScopeAuthorizer::default()
//!         .check(Some(&principal), &posts, &Operation::Write)
//!         .await?;
//!
//!     assert!(!decision.allowed);
//!     assert_eq!(decision.denial_reason(), Some("post.write"));
//!     Ok(())
//! }
//! ```

pub mod authn;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod migrate;
pub mod scope;
pub mod store;

// Re-export commonly used types
pub use authn::{generate_key, ApiKeyAuthenticator, AuthError, GeneratedKey};
pub use config::{AuthConfig, AuthorizerConfig};
pub use discovery::{DiscoveryError, EndpointRegistry, ScopeCatalogue, ScopeDiscovery};
pub use engine::{AuthDecision, DecisionReason, Principal, PrincipalKind, RequiredScope, ScopeAuthorizer};
pub use error::{AuthzError, Result};
pub use scope::resolve_resource_name;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
