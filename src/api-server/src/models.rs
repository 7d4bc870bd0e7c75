//! Response bodies

use scopegate_authz::discovery::render::ScopeChoice;
use serde::{Deserialize, Serialize};

/// Error body for every non-2xx response produced here
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Flat, labelled scope list for assignment forms
#[derive(Debug, Clone, Serialize)]
pub struct ScopeChoicesResponse {
    pub total: usize,
    pub choices: Vec<ScopeChoice>,
}
