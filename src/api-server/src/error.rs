use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use scopegate_authz::{AuthError, AuthzError};
use tracing::error;

use crate::models::ErrorResponse;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Message for every authorization denial; the missing scope stays in logs
pub const FORBIDDEN_MESSAGE: &str = "You do not have permission to perform this action.";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or invalid credential; `challenge` goes into `WWW-Authenticate`
    #[error("{message}")]
    Unauthenticated { message: String, challenge: String },

    #[error("{}", FORBIDDEN_MESSAGE)]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authorization error: {0}")]
    Authz(#[from] AuthzError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn unauthenticated(message: impl Into<String>, challenge: impl Into<String>) -> Self {
        ApiError::Unauthenticated {
            message: message.into(),
            challenge: challenge.into(),
        }
    }

    /// Map an authentication failure
    pub fn from_auth(err: AuthError, challenge: &str) -> Self {
        match err {
            AuthError::InvalidCredential => ApiError::unauthenticated(err.to_string(), challenge),
            AuthError::Store(e) => ApiError::Internal(format!("credential store: {}", e)),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Authz(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Store failures are not the caller's business
        let message = if status.is_server_error() {
            error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(ErrorResponse {
            error: message,
            status: status.as_u16(),
        });
        let mut response = (status, body).into_response();

        if let ApiError::Unauthenticated { challenge, .. } = &self {
            if let Ok(value) = HeaderValue::from_str(challenge) {
                response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
            }
        }

        response
    }
}
