//! In-memory credential store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CredentialStore, StoreError};
use crate::models::credential::{Credential, CredentialChanges, NewCredential};

/// Keeps credentials in a `HashMap` behind an async `RwLock`.
///
/// Enforces the same secret uniqueness as the `api_keys` table.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    credentials: RwLock<HashMap<Uuid, Credential>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with existing records.
    pub fn with_credentials(credentials: Vec<Credential>) -> Self {
        Self {
            credentials: RwLock::new(credentials.into_iter().map(|c| (c.id, c)).collect()),
        }
    }
}

fn secret_taken(credentials: &HashMap<Uuid, Credential>, secret: &str, except: Option<Uuid>) -> bool {
    credentials
        .values()
        .any(|c| c.secret == secret && Some(c.id) != except)
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn list_all(&self) -> Result<Vec<Credential>, StoreError> {
        let credentials = self.credentials.read().await;

        let mut result: Vec<Credential> = credentials.values().cloned().collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(result)
    }

    async fn insert(&self, new: NewCredential) -> Result<Credential, StoreError> {
        let mut credentials = self.credentials.write().await;

        if secret_taken(&credentials, &new.secret, None) {
            return Err(StoreError::DuplicateSecret);
        }

        let credential = Credential {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
            secret: new.secret,
            created_at: Utc::now(),
            last_used_at: None,
        };

        credentials.insert(credential.id, credential.clone());
        Ok(credential)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Credential, StoreError> {
        let credentials = self.credentials.read().await;
        credentials.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn find_by_secret(&self, secret: &str) -> Result<Credential, StoreError> {
        let credentials = self.credentials.read().await;

        credentials
            .values()
            .find(|c| c.secret == secret)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, id: Uuid, changes: CredentialChanges) -> Result<Credential, StoreError> {
        let mut credentials = self.credentials.write().await;

        if !credentials.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        if let Some(ref secret) = changes.secret {
            if secret_taken(&credentials, secret, Some(id)) {
                return Err(StoreError::DuplicateSecret);
            }
        }

        let credential = credentials.get_mut(&id).ok_or(StoreError::NotFound)?;

        if let Some(name) = changes.name {
            credential.name = name;
        }
        if let Some(description) = changes.description {
            credential.description = description;
        }
        if let Some(secret) = changes.secret {
            credential.secret = secret;
        }
        if let Some(used_at) = changes.last_used_at {
            credential.last_used_at = Some(match credential.last_used_at {
                Some(previous) => previous.max(used_at),
                None => used_at,
            });
        }

        Ok(credential.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut credentials = self.credentials.write().await;

        credentials
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}
