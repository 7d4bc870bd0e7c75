//! API key authentication
//!
//! Turns request headers into a [`Principal`]. A request without a
//! credential is anonymous, not an error, so other authentication schemes
//! can still handle it. A credential that does not resolve to an active key
//! fails with one uniform error whatever the cause.

pub mod keys;

pub use keys::{generate_key, key_prefix, GeneratedKey, PREFIX_LEN};

use chrono::Utc;
use http::header::AUTHORIZATION;
use http::HeaderMap;
use scopegate_core::{Blake3KeyHasher, CoreError, CredentialStore, KeyHasher};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::AuthConfig;
use crate::engine::Principal;
use crate::error::Result;

/// Authentication failure
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown, revoked or expired key
    #[error("Invalid API key")]
    InvalidCredential,

    #[error("credential store error: {0}")]
    Store(#[from] CoreError),
}

/// Authenticates `Authorization: <keyword> <key>` (or a custom header)
/// against a [`CredentialStore`]
pub struct ApiKeyAuthenticator {
    config: AuthConfig,
    store: Arc<dyn CredentialStore>,
    hasher: Arc<dyn KeyHasher>,
}

impl ApiKeyAuthenticator {
    /// Create an authenticator; the configuration is validated here
    pub fn new(config: AuthConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            hasher: Arc::new(Blake3KeyHasher::new()),
        })
    }

    /// Use a different digest function (must match the one keys were issued with)
    pub fn with_hasher(mut self, hasher: Arc<dyn KeyHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Value for `WWW-Authenticate` on a 401
    pub fn challenge(&self) -> &str {
        &self.config.keyword
    }

    /// Credential presented on the request, if any
    ///
    /// The scheme keyword is matched case-insensitively. A missing or
    /// malformed `Authorization` header, or one for another scheme, falls
    /// through to the custom header when one is configured.
    pub fn extract_credential<'h>(&self, headers: &'h HeaderMap) -> Option<&'h str> {
        headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| self.parse_authorization(value))
            .or_else(|| self.custom_header_credential(headers))
    }

    fn parse_authorization<'h>(&self, value: &'h str) -> Option<&'h str> {
        let (keyword, key) = value.trim().split_once(char::is_whitespace)?;
        let key = key.trim();

        if key.is_empty() || !keyword.eq_ignore_ascii_case(&self.config.keyword) {
            return None;
        }
        Some(key)
    }

    fn custom_header_credential<'h>(&self, headers: &'h HeaderMap) -> Option<&'h str> {
        let name = self.config.custom_header.as_deref()?;
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Authenticate a request
    ///
    /// `Ok(None)` means no credential was presented.
    pub async fn authenticate(&self, headers: &HeaderMap) -> std::result::Result<Option<Principal>, AuthError> {
        match self.extract_credential(headers) {
            Some(key) => self.authenticate_key(key).await.map(Some),
            None => Ok(None),
        }
    }

    /// Resolve a presented key to a principal
    pub async fn authenticate_key(&self, key: &str) -> std::result::Result<Principal, AuthError> {
        let digest = self.hasher.digest(key);
        let prefix = key_prefix(key).unwrap_or("-");

        let Some(mut record) = self.store.find_by_digest(&digest).await? else {
            debug!(prefix = %prefix, "Authentication failed: unknown key");
            return Err(AuthError::InvalidCredential);
        };

        let now = Utc::now();
        if record.revoked {
            debug!(prefix = %prefix, key_id = %record.id, "Authentication failed: key revoked");
            return Err(AuthError::InvalidCredential);
        }
        if record.is_expired_at(now) {
            debug!(prefix = %prefix, key_id = %record.id, "Authentication failed: key expired");
            return Err(AuthError::InvalidCredential);
        }

        if self.config.track_last_used {
            record.last_used_at = Some(now);
            let store = Arc::clone(&self.store);
            let id = record.id;
            tokio::spawn(async move {
                if let Err(e) = store.touch_last_used(id, now).await {
                    warn!(key_id = %id, "Failed to record key last-used time: {}", e);
                }
            });
        }

        debug!(key_id = %record.id, name = %record.name, "Authenticated API key");
        Ok(Principal::credential(record))
    }
}

impl std::fmt::Debug for ApiKeyAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyAuthenticator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
