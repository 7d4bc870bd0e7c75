//! Middleware layer for the API server
//!
//! - [`scope_guard`]: authentication and scope authorization per route
//! - request ID propagation
//! - CORS configuration

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use scopegate_authz::Principal;
use scopegate_core::{EndpointDescriptor, Operation, UserIdentity};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::debug;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Request ID header name
pub const X_REQUEST_ID: &str = "x-request-id";

/// Guard configuration for one route
#[derive(Clone)]
pub struct RouteGuard {
    pub state: AppState,
    pub endpoint: Arc<EndpointDescriptor>,
    /// Named operation; `None` derives it from the HTTP method
    pub operation: Option<Operation>,
}

impl RouteGuard {
    pub fn new(state: AppState, endpoint: Arc<EndpointDescriptor>) -> Self {
        Self {
            state,
            endpoint,
            operation: None,
        }
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = Some(operation);
        self
    }

    fn operation_for(&self, method: &Method) -> Operation {
        self.operation
            .clone()
            .unwrap_or_else(|| Operation::from_http_method(method.as_str()))
    }
}

/// Authenticate the request and check the route's scope
///
/// A principal already attached by an earlier guard is reused, so its
/// group grants are looked up once per request. Otherwise the API key
/// authenticator runs; without a key, a [`UserIdentity`] placed in the
/// request extensions by an outer authentication layer is used.
///
/// On success the principal is attached as `Arc<Principal>` for handlers.
pub async fn scope_guard(
    State(guard): State<RouteGuard>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let operation = guard.operation_for(request.method());
    let state = &guard.state;

    let existing = request.extensions().get::<Arc<Principal>>().cloned();
    let principal = match existing {
        Some(principal) => Some(principal),
        None => {
            let headers = request.headers().clone();
            let user = request.extensions().get::<UserIdentity>().cloned();
            resolve_principal(state, &headers, user).await?
        }
    };

    let decision = state
        .authorizer
        .check(principal.as_deref(), &guard.endpoint, &operation)
        .await?;

    if !decision.allowed {
        debug!(
            path = %request.uri().path(),
            reason = %decision.reason,
            scope = decision.denial_reason().unwrap_or("-"),
            "Scope check failed"
        );
        return Err(match principal {
            None => ApiError::unauthenticated(
                "Authentication credentials were not provided.",
                state.authenticator.challenge(),
            ),
            Some(_) => ApiError::Forbidden,
        });
    }

    if let Some(principal) = principal {
        request.extensions_mut().insert(principal);
    }
    Ok(next.run(request).await)
}

async fn resolve_principal(
    state: &AppState,
    headers: &HeaderMap,
    user: Option<UserIdentity>,
) -> Result<Option<Arc<Principal>>> {
    let authenticator = &state.authenticator;

    match authenticator.authenticate(headers).await {
        Ok(Some(principal)) => Ok(Some(Arc::new(principal))),
        Ok(None) => Ok(user.map(|user| Arc::new(Principal::user(user, Arc::clone(&state.groups))))),
        Err(e) => Err(ApiError::from_auth(e, authenticator.challenge())),
    }
}

/// Configure CORS middleware
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::HeaderName::from_static(X_REQUEST_ID),
        ])
        .expose_headers([
            header::HeaderName::from_static(X_REQUEST_ID),
            header::WWW_AUTHENTICATE,
        ])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Request ID middleware
///
/// Keeps a valid incoming `x-request-id` or generates one, and echoes it on
/// the response.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    request.extensions_mut().insert(request_id);

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
    response
}
