//! Unified error handling for the API boundary.
//!
//! Every failure maps to one payload shape: status code, a stable category
//! label, a message, the request path, a timestamp, and (for validation
//! failures) a field→message map. Internal failures are logged with their
//! detail and surfaced as an opaque 500.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use quince_commerce::CommerceError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A domain operation failed.
    #[error(transparent)]
    Commerce(#[from] CommerceError),

    /// Field-level constraint violations, keyed by field name.
    #[error("input validation failed")]
    Validation(BTreeMap<String, String>),

    /// The caller's identity could not be established.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// The caller lacks a required role.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A malformed request outside the validation map (bad path segment,
    /// unparsable enum, ...).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Unexpected failure; detail is logged, never exposed.
    #[error("internal error: {0}")]
    Internal(String),
}

/// The wire shape of every error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// Numeric HTTP status, duplicated in the payload.
    pub status: u16,
    /// Stable category label, e.g. `"Resource Not Found"`.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Request path; attached by the error-payload middleware.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// When the error was produced.
    pub timestamp: DateTime<Utc>,
    /// Field→message map for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<BTreeMap<String, String>>,
}

impl ErrorBody {
    /// Attach the request path.
    #[must_use]
    pub fn with_path(mut self, path: String) -> Self {
        self.path = Some(path);
        self
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String, Option<BTreeMap<String, String>>) {
        match self {
            Self::Commerce(err) => match err {
                CommerceError::NotFound { .. } => (
                    StatusCode::NOT_FOUND,
                    "Resource Not Found",
                    err.to_string(),
                    None,
                ),
                CommerceError::Conflict(_) => {
                    (StatusCode::CONFLICT, "Conflict", err.to_string(), None)
                }
                CommerceError::InvalidArgument(_) | CommerceError::InsufficientStock { .. } => (
                    StatusCode::BAD_REQUEST,
                    "Invalid Request",
                    err.to_string(),
                    None,
                ),
                CommerceError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    "Authentication Failed",
                    "Invalid credentials".to_owned(),
                    None,
                ),
                CommerceError::AccountLocked => (
                    StatusCode::UNAUTHORIZED,
                    "Account Locked",
                    "Account is locked".to_owned(),
                    None,
                ),
                CommerceError::AccountDisabled => (
                    StatusCode::FORBIDDEN,
                    "Account Disabled",
                    "Account is disabled".to_owned(),
                    None,
                ),
                CommerceError::PasswordHash => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "An unexpected error occurred. Please try again later.".to_owned(),
                    None,
                ),
            },
            Self::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                "Validation Failed",
                "Input validation failed".to_owned(),
                Some(fields.clone()),
            ),
            Self::Unauthenticated(_) => (
                StatusCode::UNAUTHORIZED,
                "Authentication Failed",
                "Invalid credentials or authentication token".to_owned(),
                None,
            ),
            Self::Forbidden(_) => (
                StatusCode::FORBIDDEN,
                "Access Denied",
                "You don't have permission to access this resource".to_owned(),
                None,
            ),
            Self::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                "Invalid Request",
                message.clone(),
                None,
            ),
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                "An unexpected error occurred. Please try again later.".to_owned(),
                None,
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Log internal detail; never expose it to the caller.
        if matches!(
            self,
            Self::Internal(_) | Self::Commerce(CommerceError::PasswordHash)
        ) {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let (status, label, message, field_errors) = self.parts();
        let body = ErrorBody {
            status: status.as_u16(),
            error: label.to_owned(),
            message,
            path: None,
            timestamp: Utc::now(),
            field_errors,
        };

        let mut response = (status, Json(body.clone())).into_response();
        // The error-payload middleware re-renders the body with the request
        // path; IntoResponse has no access to the URI.
        response.extensions_mut().insert(body);
        response
    }
}

/// Result type alias for API handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
