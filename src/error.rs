//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::store::StoreError;

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Validation Errors**: Caller supplied invalid input (e.g. blank name)
/// - **Resource Errors**: Requested API key does not exist
/// - **Authentication Errors**: Presented key did not match any stored key
/// - **Store Errors**: The persistence layer failed; details stay in the logs
/// - **Upstream Errors**: GitHub or the summarizer failed
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String describes the violated constraint.
    #[error("{0}")]
    Validation(String),

    /// Requested API key does not exist.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("API key not found")]
    NotFound,

    /// Presented API key is missing, malformed or unknown.
    ///
    /// Returns HTTP 401 Unauthorized. The message never says which.
    #[error("Invalid API key")]
    Unauthenticated,

    /// The credential store failed or timed out.
    ///
    /// Returns HTTP 503 Service Unavailable without internal detail.
    #[error("Service temporarily unavailable")]
    StoreUnavailable,

    /// GitHub or the summarizer returned an error.
    ///
    /// Returns HTTP 502 Bad Gateway.
    #[error("{0}")]
    Upstream(String),

    /// No summarizer credentials were configured.
    ///
    /// Returns HTTP 503 Service Unavailable.
    #[error("Repository summarization is not configured")]
    SummarizerDisabled,
}

impl AppError {
    /// Stable machine-readable code used in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "invalid_request",
            AppError::NotFound => "api_key_not_found",
            AppError::Unauthenticated => "invalid_api_key",
            AppError::StoreUnavailable => "service_unavailable",
            AppError::Upstream(_) => "upstream_error",
            AppError::SummarizerDisabled => "summarizer_disabled",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::StoreUnavailable | AppError::SummarizerDisabled => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Map store failures onto caller-facing errors.
///
/// `NotFound` and `Unavailable` stay distinct. Unavailability is logged here
/// and the detail is dropped from what the caller sees.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound,
            StoreError::DuplicateSecret => {
                AppError::Validation("Secret is already assigned to another API key".to_string())
            }
            StoreError::Conflict => {
                tracing::error!("Credential store rejected a concurrent write");
                AppError::StoreUnavailable
            }
            StoreError::Unavailable(detail) => {
                tracing::error!(error = %detail, "Credential store unavailable");
                AppError::StoreUnavailable
            }
        }
    }
}

/// Unreadable JSON bodies become a 400 with the standard error body.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

/// Malformed path parameters (e.g. an id that is not a UUID).
impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(format!("Invalid path parameter: {}", rejection.body_text()))
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.to_string()
            }
        }));

        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_keep_their_distinction() {
        assert!(matches!(AppError::from(StoreError::NotFound), AppError::NotFound));
        assert!(matches!(
            AppError::from(StoreError::Unavailable("connection refused".to_string())),
            AppError::StoreUnavailable
        ));
        assert!(matches!(
            AppError::from(StoreError::DuplicateSecret),
            AppError::Validation(_)
        ));
    }

    #[test]
    fn unavailable_message_hides_internal_detail() {
        let err = AppError::from(StoreError::Unavailable("password authentication failed".to_string()));

        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(!err.to_string().contains("password"));
    }

    #[test]
    fn status_codes() {
        assert_eq!(AppError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Upstream("x".into()).status(), StatusCode::BAD_GATEWAY);
    }
}
