//! Key validation endpoints used by the playground and protected pages.
//!
//! - POST /api/validate-api-key - Validate a key and record its use
//! - GET /api/check-auth - Read-only check of a key
//!
//! Missing, malformed and unknown keys all produce the same 401 body.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::{
    error::AppError,
    models::{
        auth::{CheckAuthQuery, CheckAuthResponse, KeyUser, ValidateKeyRequest, ValidateKeyResponse},
        credential::ValidationOutcome,
    },
    state::AppState,
};

const INVALID_KEY_MESSAGE: &str = "Invalid API key";

/// Validate an API key.
///
/// # Request Body
///
/// ```json
/// { "apiKey": "pk_..." }
/// ```
///
/// # Response (200)
///
/// ```json
/// {
///   "valid": true,
///   "message": "API key is valid",
///   "user": {
///     "id": "550e8400-...",
///     "name": "Production",
///     "apiKeyName": "Production",
///     "description": "prod key",
///     "validatedAt": "2025-12-21T19:00:00Z",
///     "lastUsed": "2025-12-21T19:00:00Z"
///   }
/// }
/// ```
///
/// # Response (401)
///
/// `{"valid": false, "message": "Invalid API key"}`, also for unreadable bodies.
pub async fn validate_api_key(
    State(state): State<AppState>,
    body: Result<Json<ValidateKeyRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let api_key = body.ok().and_then(|Json(b)| b.api_key).unwrap_or_default();

    let response = match state.credentials.validate(&api_key).await? {
        ValidationOutcome::Valid(credential) => (
            StatusCode::OK,
            Json(ValidateKeyResponse {
                valid: true,
                message: "API key is valid".to_string(),
                user: Some(KeyUser::from_credential(&credential, Utc::now())),
            }),
        ),
        ValidationOutcome::Invalid => (
            StatusCode::UNAUTHORIZED,
            Json(ValidateKeyResponse {
                valid: false,
                message: INVALID_KEY_MESSAGE.to_string(),
                user: None,
            }),
        ),
    };

    Ok(response.into_response())
}

/// Check an API key passed as `?apiKey=` without recording use.
pub async fn check_auth(
    State(state): State<AppState>,
    Query(query): Query<CheckAuthQuery>,
) -> Result<Response, AppError> {
    let api_key = query.api_key.unwrap_or_default();

    let response = match state.credentials.check(&api_key).await? {
        ValidationOutcome::Valid(credential) => (
            StatusCode::OK,
            Json(CheckAuthResponse {
                authenticated: true,
                message: None,
                user: Some(KeyUser::from_credential(&credential, Utc::now())),
            }),
        ),
        ValidationOutcome::Invalid => (
            StatusCode::UNAUTHORIZED,
            Json(CheckAuthResponse {
                authenticated: false,
                message: Some(INVALID_KEY_MESSAGE.to_string()),
                user: None,
            }),
        ),
    };

    Ok(response.into_response())
}
