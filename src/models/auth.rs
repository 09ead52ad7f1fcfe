//! Request/response bodies for key validation endpoints.
//!
//! Field names are camelCase on the wire to match the dashboard client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::credential::Credential;

/// Request body for `POST /api/validate-api-key`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateKeyRequest {
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Query string for `GET /api/check-auth`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAuthQuery {
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Identity attached to a successfully validated key.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyUser {
    pub id: Uuid,
    /// Key name, or "API User" when the name is blank
    pub name: String,
    pub api_key_name: String,
    pub description: Option<String>,
    pub validated_at: DateTime<Utc>,
    pub last_used: Option<DateTime<Utc>>,
}

impl KeyUser {
    pub fn from_credential(credential: &Credential, validated_at: DateTime<Utc>) -> Self {
        let name = if credential.name.trim().is_empty() {
            "API User".to_string()
        } else {
            credential.name.clone()
        };

        Self {
            id: credential.id,
            name,
            api_key_name: credential.name.clone(),
            description: credential.description.clone(),
            validated_at,
            last_used: credential.last_used_at,
        }
    }
}

/// Response body for `POST /api/validate-api-key`.
#[derive(Debug, Serialize)]
pub struct ValidateKeyResponse {
    pub valid: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<KeyUser>,
}

/// Response body for `GET /api/check-auth`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAuthResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<KeyUser>,
}
