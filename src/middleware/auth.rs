//! API key authentication middleware.
//!
//! This middleware intercepts every key-gated request to:
//! 1. Extract the API key from the `x-api-key` header
//! 2. Validate it through the credential service (recording usage)
//! 3. Inject authentication context into the request
//! 4. Reject unknown keys with HTTP 401

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{error::AppError, models::credential::ValidationOutcome, state::AppState};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Authentication context attached to authenticated requests.
///
/// Route handlers extract it with `Extension<AuthContext>`.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// ID of the authenticated API key
    pub api_key_id: Uuid,

    pub api_key_name: String,

    pub description: Option<String>,

    pub validated_at: DateTime<Utc>,
}

/// API key authentication middleware function.
///
/// # Flow
///
/// 1. Read the `x-api-key` header
/// 2. Validate the key, which also updates its `last_used_at`
/// 3. If valid: inject `AuthContext` into request, call next handler
/// 4. If not: return 401 Unauthorized error
///
/// # Returns
///
/// - `Err(AppError::Validation)` if the header is missing or blank (400)
/// - `Err(AppError::Unauthenticated)` if the key is unknown (401)
/// - `Err(AppError::StoreUnavailable)` if the store failed (503)
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let api_key = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| AppError::Validation("API key is required".to_string()))?
        .to_string();

    let credential = match state.credentials.validate(&api_key).await? {
        ValidationOutcome::Valid(credential) => credential,
        ValidationOutcome::Invalid => return Err(AppError::Unauthenticated),
    };

    let auth_context = AuthContext {
        api_key_id: credential.id,
        api_key_name: credential.name,
        description: credential.description,
        validated_at: credential.last_used_at.unwrap_or_else(Utc::now),
    };

    request.extensions_mut().insert(auth_context);

    Ok(next.run(request).await)
}
