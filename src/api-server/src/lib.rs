//! axum integration for scopegate
//!
//! ```no_run
//! use axum::routing::get;
//! use scopegate_api_server::{AppState, ScopedRouter};
//! use scopegate_authz::store::InMemoryCredentialStore;
//! use scopegate_authz::{ApiKeyAuthenticator, AuthConfig, ScopeAuthorizer};
//! use scopegate_core::EndpointDescriptor;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(InMemoryCredentialStore::new());
//! let authn = ApiKeyAuthenticator::new(AuthConfig::from_env()?, store)?;
//! let mut app = ScopedRouter::new(AppState::new(authn, ScopeAuthorizer::default()));
//!
//! let posts = app.register(
//!     EndpointDescriptor::new("blog", "PostViewSet").with_handlers(["list", "create"]),
//! );
//! let router = app
//!     .route("/posts", &posts, get(|| async { "[]" }).post(|| async { "created" }))
//!     .into_router();
//! # let _ = router;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, Result};
pub use middleware::{scope_guard, RouteGuard};
pub use routes::{Endpoint, ScopedRouter};
pub use server::{serve, ServerConfig};
pub use state::AppState;

/// API version
pub const API_VERSION: &str = "v1";
