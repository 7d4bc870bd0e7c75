use axum::{extract::State, Json};
use scopegate_authz::discovery::render::choices;
use scopegate_authz::ScopeCatalogue;
use std::sync::Arc;

use crate::models::{HealthResponse, ScopeChoicesResponse};
use crate::state::AppState;

/// State for the unguarded catalogue and health routes
#[derive(Clone)]
pub struct CatalogueState {
    pub app: AppState,
    /// Built once from the frozen endpoint registry
    pub catalogue: Arc<ScopeCatalogue>,
}

/// Health check endpoint
pub async fn health_check(State(state): State<CatalogueState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.app.version.clone(),
        uptime_seconds: state.app.uptime_seconds(),
    })
}

/// Discovered scopes grouped by app and resource
pub async fn list_scopes(State(state): State<CatalogueState>) -> Json<ScopeCatalogue> {
    Json(state.catalogue.as_ref().clone())
}

/// Discovered scopes with display labels
pub async fn scope_choices(State(state): State<CatalogueState>) -> Json<ScopeChoicesResponse> {
    let choices = choices(&state.catalogue);
    Json(ScopeChoicesResponse {
        total: choices.len(),
        choices,
    })
}
