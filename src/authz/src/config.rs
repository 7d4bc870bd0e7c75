//! Authentication and authorization configuration
//!
//! Values are passed explicitly into [`ApiKeyAuthenticator`] and
//! [`ScopeAuthorizer`]; nothing reads ambient settings after construction.
//!
//! Environment variables read by [`AuthConfig::from_env`]:
//! - `SCOPEGATE_AUTH_KEYWORD` - scheme keyword (default: `Api-Key`)
//! - `SCOPEGATE_API_KEY_HEADER` - custom header carrying the bare key
//! - `SCOPEGATE_TRACK_LAST_USED` - `true`/`1`/`yes`/`on` enables tracking
//!
//! [`ApiKeyAuthenticator`]: crate::authn::ApiKeyAuthenticator
//! [`ScopeAuthorizer`]: crate::engine::ScopeAuthorizer

use http::HeaderName;
use serde::{Deserialize, Serialize};

use crate::error::{AuthzError, Result};

/// Default authentication scheme keyword
pub const DEFAULT_KEYWORD: &str = "Api-Key";

pub const ENV_KEYWORD: &str = "SCOPEGATE_AUTH_KEYWORD";
pub const ENV_CUSTOM_HEADER: &str = "SCOPEGATE_API_KEY_HEADER";
pub const ENV_TRACK_LAST_USED: &str = "SCOPEGATE_TRACK_LAST_USED";

/// Credential authentication configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Scheme keyword in `Authorization: <keyword> <key>`, matched
    /// case-insensitively
    pub keyword: String,

    /// Header carrying the bare key, consulted when the `Authorization`
    /// header yields no credential
    pub custom_header: Option<String>,

    /// Persist a last-used timestamp on successful authentication
    pub track_last_used: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            keyword: DEFAULT_KEYWORD.to_string(),
            custom_header: None,
            track_last_used: false,
        }
    }
}

impl AuthConfig {
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = keyword.into();
        self
    }

    pub fn with_custom_header(mut self, header: impl Into<String>) -> Self {
        self.custom_header = Some(header.into());
        self
    }

    pub fn with_last_used_tracking(mut self, enabled: bool) -> Self {
        self.track_last_used = enabled;
        self
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(keyword) = lookup(ENV_KEYWORD).filter(|v| !v.trim().is_empty()) {
            config.keyword = keyword.trim().to_string();
        }

        config.custom_header = lookup(ENV_CUSTOM_HEADER)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        if let Some(raw) = lookup(ENV_TRACK_LAST_USED) {
            config.track_last_used = parse_flag(&raw).ok_or_else(|| {
                AuthzError::Configuration(format!("{}: not a boolean: '{}'", ENV_TRACK_LAST_USED, raw))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject keywords and header names that could never match a request
    pub fn validate(&self) -> Result<()> {
        if self.keyword.is_empty() || self.keyword.chars().any(char::is_whitespace) {
            return Err(AuthzError::Configuration(format!(
                "scheme keyword must be a single non-empty token, got '{}'",
                self.keyword
            )));
        }

        if let Some(header) = &self.custom_header {
            HeaderName::from_bytes(header.as_bytes()).map_err(|_| {
                AuthzError::Configuration(format!("invalid custom header name '{}'", header))
            })?;
        }

        Ok(())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Scope authorizer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorizerConfig {
    /// Superuser identities pass every scoped check
    pub superuser_bypass: bool,
}

impl Default for AuthorizerConfig {
    fn default() -> Self {
        Self {
            superuser_bypass: true,
        }
    }
}
