//! Credential storage.
//!
//! The store is the only path to persisted API keys. The service receives it
//! as a `SharedCredentialStore` at construction time.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::credential::{Credential, CredentialChanges, NewCredential};

/// In-memory store (no database configured, tests)
pub mod memory;
/// PostgreSQL store
pub mod postgres;

pub use memory::InMemoryCredentialStore;
pub use postgres::PgCredentialStore;

/// Errors reported by a credential store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("credential not found")]
    NotFound,

    /// The secret is already held by another credential.
    #[error("secret already in use")]
    DuplicateSecret,

    /// A concurrent write was rejected and may succeed if repeated.
    #[error("concurrent write conflict")]
    Conflict,

    /// The backing store failed. The message is for logs only.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage operations for API keys.
#[async_trait]
pub trait CredentialStore: Send + Sync + Debug {
    /// All credentials, newest `created_at` first.
    async fn list_all(&self) -> Result<Vec<Credential>, StoreError>;

    /// Insert a credential. The store assigns `id` and `created_at`; `last_used_at` starts empty.
    async fn insert(&self, new: NewCredential) -> Result<Credential, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Credential, StoreError>;

    /// Exact-match lookup. No prefix or partial matching.
    async fn find_by_secret(&self, secret: &str) -> Result<Credential, StoreError>;

    async fn update(&self, id: Uuid, changes: CredentialChanges) -> Result<Credential, StoreError>;

    /// Permanently remove a credential. Missing ids yield `NotFound`.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Cheap connectivity probe used by the health endpoint.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

pub type SharedCredentialStore = Arc<dyn CredentialStore>;
