use scopegate_authz::store::InMemoryGroupStore;
use scopegate_authz::{ApiKeyAuthenticator, ScopeAuthorizer};
use scopegate_core::GroupStore;
use std::sync::Arc;
use std::time::Instant;

/// Application state shared by every guarded route
#[derive(Clone)]
pub struct AppState {
    /// API key authentication
    pub authenticator: Arc<ApiKeyAuthenticator>,

    pub authorizer: Arc<ScopeAuthorizer>,

    /// Grant lookup for users authenticated by an outer layer
    pub groups: Arc<dyn GroupStore>,

    /// Server start time for uptime calculation
    pub start_time: Instant,

    pub version: String,
}

impl AppState {
    pub fn new(authenticator: ApiKeyAuthenticator, authorizer: ScopeAuthorizer) -> Self {
        Self {
            authenticator: Arc::new(authenticator),
            authorizer: Arc::new(authorizer),
            groups: Arc::new(InMemoryGroupStore::new()),
            start_time: Instant::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn with_groups(mut self, groups: Arc<dyn GroupStore>) -> Self {
        self.groups = groups;
        self
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
