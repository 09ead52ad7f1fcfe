//! API key management HTTP handlers.
//!
//! This module implements the dashboard endpoints:
//! - GET /api/api-keys - List all keys, newest first
//! - POST /api/api-keys - Create a key
//! - GET /api/api-keys/stats - Dashboard totals
//! - GET /api/api-keys/{id} - Get a key
//! - PUT /api/api-keys/{id} - Edit a key
//! - DELETE /api/api-keys/{id} - Delete a key

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::credential::{
        CreateCredentialRequest, Credential, CredentialStats, UpdateCredentialRequest,
    },
    state::AppState,
};

/// List all API keys.
///
/// # Response
///
/// - **Success (200 OK)**: Array of keys (may be empty), newest first
/// - **Error (503)**: Store unavailable
pub async fn list_credentials(
    State(state): State<AppState>,
) -> Result<Json<Vec<Credential>>, AppError> {
    let credentials = state.credentials.list_all().await?;
    Ok(Json(credentials))
}

/// Create a new API key.
///
/// # Request Body
///
/// ```json
/// {
///   "name": "Production",
///   "description": "prod key"
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: The created key, including its generated secret
/// - **Error (400)**: Name missing or blank
///
/// ```json
/// {
///   "id": "550e8400-e29b-41d4-a716-446655440000",
///   "name": "Production",
///   "description": "prod key",
///   "secret": "pk_7Q2M0XK4B9TZ1HC8WJ3N5RVA6LYE2DGP",
///   "created_at": "2025-12-20T10:00:00Z",
///   "last_used_at": null
/// }
/// ```
pub async fn create_credential(
    State(state): State<AppState>,
    body: Result<Json<CreateCredentialRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = body?;
    let credential = state.credentials.create(request).await?;
    Ok((StatusCode::CREATED, Json(credential)))
}

/// Get a specific API key by ID.
///
/// # Response
///
/// - **Success (200 OK)**: The key
/// - **Error (404)**: Unknown id
pub async fn get_credential(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Credential>, AppError> {
    let Path(id) = path?;
    let credential = state.credentials.get(id).await?;
    Ok(Json(credential))
}

/// Edit an API key.
///
/// # Request Body
///
/// ```json
/// {
///   "name": "Renamed",
///   "description": "new description",
///   "secret": "pk_OPTIONAL_REPLACEMENT"
/// }
/// ```
///
/// Every field is optional. Without `secret` the existing key keeps working.
pub async fn update_credential(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<UpdateCredentialRequest>, JsonRejection>,
) -> Result<Json<Credential>, AppError> {
    let Path(id) = path?;
    let Json(request) = body?;
    let credential = state.credentials.update(id, request).await?;
    Ok(Json(credential))
}

/// Delete an API key permanently.
///
/// # Response
///
/// - **Success (200 OK)**: `{"message": "API key deleted successfully"}`
/// - **Error (404)**: Unknown id
pub async fn delete_credential(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = path?;
    state.credentials.remove(id).await?;
    Ok(Json(json!({ "message": "API key deleted successfully" })))
}

/// Dashboard totals.
///
/// ```json
/// { "total": 3, "active": 1, "recently_created": 2 }
/// ```
pub async fn credential_stats(
    State(state): State<AppState>,
) -> Result<Json<CredentialStats>, AppError> {
    let stats = state.credentials.stats().await?;
    Ok(Json(stats))
}
