//! API key (credential) model.
//!
//! An API key is an opaque bearer token identified by a `pk_` prefix. The
//! record keeps the secret itself so the dashboard can show it again on read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents an API key record from the database.
///
/// # Database Table
///
/// Maps to the `api_keys` table with columns:
/// - `id`: Unique identifier (UUID), assigned by the store
/// - `name`: Human-readable label
/// - `description`: Optional free text
/// - `secret`: The bearer token (`pk_` followed by uppercase alphanumerics)
/// - `created_at`: When the key was created
/// - `last_used_at`: When the key last passed validation, `NULL` until then
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize)]
pub struct Credential {
    pub id: Uuid,

    pub name: String,

    pub description: Option<String>,

    /// The bearer token callers present
    pub secret: String,

    pub created_at: DateTime<Utc>,

    /// Never moves backwards once set
    pub last_used_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// Whether this key has passed validation at least once.
    pub fn has_been_used(&self) -> bool {
        self.last_used_at.is_some()
    }
}

/// Fields supplied when inserting a new key. The store fills in `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub name: String,
    pub description: Option<String>,
    pub secret: String,
}

/// Partial update applied by the store.
///
/// `None` leaves the column untouched. `description: Some(None)` clears it.
/// `last_used_at` is applied as `max(existing, new)`.
#[derive(Debug, Clone, Default)]
pub struct CredentialChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub secret: Option<String>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl CredentialChanges {
    /// Changes that only record usage at `at`.
    pub fn used_at(at: DateTime<Utc>) -> Self {
        Self {
            last_used_at: Some(at),
            ..Self::default()
        }
    }
}

/// Request body for creating a new API key.
///
/// # JSON Example
///
/// ```json
/// {
///   "name": "Production",
///   "description": "Key for the production deployment"
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct CreateCredentialRequest {
    /// Required and non-blank; missing is reported the same way as blank
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

/// Request body for editing an API key.
///
/// Omitting `secret` (or sending an empty one) keeps the existing key so
/// metadata can be edited without rotating it.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCredentialRequest {
    #[serde(default)]
    pub name: Option<String>,

    /// An empty string clears the description
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub secret: Option<String>,
}

/// Result of checking a presented secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid(Credential),
    Invalid,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid(_))
    }

    pub fn credential(&self) -> Option<&Credential> {
        match self {
            ValidationOutcome::Valid(credential) => Some(credential),
            ValidationOutcome::Invalid => None,
        }
    }
}

/// Aggregate numbers shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialStats {
    pub total: usize,
    /// Keys validated at least once
    pub active: usize,
    /// Keys created within the last seven days
    pub recently_created: usize,
}

/// Trim a free-text field, mapping blank input to `None`.
pub fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_drops_blank_values() {
        assert_eq!(normalize_text(None), None);
        assert_eq!(normalize_text(Some("   ".to_string())), None);
        assert_eq!(
            normalize_text(Some("  prod key ".to_string())),
            Some("prod key".to_string())
        );
    }

    #[test]
    fn update_request_accepts_partial_bodies() {
        let request: UpdateCredentialRequest =
            serde_json::from_str(r#"{"name":"Renamed"}"#).unwrap();

        assert_eq!(request.name.as_deref(), Some("Renamed"));
        assert!(request.description.is_none());
        assert!(request.secret.is_none());
    }

    #[test]
    fn credential_serializes_null_last_used_at() {
        let credential = Credential {
            id: Uuid::new_v4(),
            name: "Prod".to_string(),
            description: None,
            secret: "pk_ABC".to_string(),
            created_at: Utc::now(),
            last_used_at: None,
        };

        let value = serde_json::to_value(&credential).unwrap();
        assert!(value["last_used_at"].is_null());
        assert_eq!(value["secret"], "pk_ABC");
        assert!(!credential.has_been_used());
    }
}
