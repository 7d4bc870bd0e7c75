//! Route definitions for the API server
//!
//! Guarded routes are added through [`ScopedRouter`], which records each
//! endpoint descriptor in the same [`EndpointRegistry`] the catalogue is
//! built from. A route cannot be guarded by a descriptor the catalogue does
//! not know about.
//!
//! Unguarded routes:
//! - `GET /health`
//! - `GET /v1/scopes` - catalogue grouped by app and resource
//! - `GET /v1/scopes/choices` - labelled scope list

use axum::{
    middleware as axum_middleware,
    routing::{get, MethodRouter},
    Router,
};
use scopegate_authz::{EndpointRegistry, ScopeCatalogue};
use scopegate_core::{EndpointDescriptor, Operation};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers::{self, CatalogueState};
use crate::middleware::{self, RouteGuard};
use crate::state::AppState;

/// Handle to a registered endpoint descriptor
#[derive(Debug, Clone)]
pub struct Endpoint(Arc<EndpointDescriptor>);

impl Endpoint {
    pub fn descriptor(&self) -> &EndpointDescriptor {
        &self.0
    }
}

/// Router builder that keeps enforcement and discovery in step
pub struct ScopedRouter {
    state: AppState,
    registry: EndpointRegistry,
    router: Router,
}

impl ScopedRouter {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            registry: EndpointRegistry::new(),
            router: Router::new(),
        }
    }

    /// Register an endpoint; the handle guards any number of routes
    pub fn register(&mut self, endpoint: EndpointDescriptor) -> Endpoint {
        Endpoint(self.registry.register(endpoint))
    }

    /// Guard a route; each request's operation comes from its HTTP method
    pub fn route(self, path: &str, endpoint: &Endpoint, method_router: MethodRouter) -> Self {
        let guard = RouteGuard::new(self.state.clone(), Arc::clone(&endpoint.0));
        self.guarded(path, guard, method_router)
    }

    /// Guard a route that invokes a named handler (`retrieve`, `publish`, ...)
    pub fn action(
        self,
        path: &str,
        endpoint: &Endpoint,
        handler: &str,
        method_router: MethodRouter,
    ) -> Self {
        let guard = RouteGuard::new(self.state.clone(), Arc::clone(&endpoint.0))
            .with_operation(Operation::from_handler(handler));
        self.guarded(path, guard, method_router)
    }

    fn guarded(mut self, path: &str, guard: RouteGuard, method_router: MethodRouter) -> Self {
        let route = Router::new()
            .route(path, method_router)
            .route_layer(axum_middleware::from_fn_with_state(guard, middleware::scope_guard));
        self.router = self.router.merge(route);
        self
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    pub fn catalogue(&self) -> ScopeCatalogue {
        self.registry.discover()
    }

    /// Finish building: adds the catalogue and health routes and the
    /// shared middleware layers
    pub fn into_router(self) -> Router {
        let catalogue = Arc::new(self.registry.discover());
        info!(
            endpoints = self.registry.len(),
            resources = catalogue.resource_count(),
            scopes = catalogue.scope_count(),
            "Scope catalogue built"
        );

        let open_routes = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/v1/scopes", get(handlers::list_scopes))
            .route("/v1/scopes/choices", get(handlers::scope_choices))
            .with_state(CatalogueState {
                app: self.state,
                catalogue,
            });

        self.router
            .merge(open_routes)
            .layer(axum_middleware::from_fn(middleware::request_id_middleware))
            .layer(middleware::cors_layer())
            .layer(TraceLayer::new_for_http())
    }
}
