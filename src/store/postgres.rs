//! PostgreSQL credential store backed by the `api_keys` table.

use async_trait::async_trait;
use uuid::Uuid;

use super::{CredentialStore, StoreError};
use crate::db::DbPool;
use crate::models::credential::{Credential, CredentialChanges, NewCredential};

const COLUMNS: &str = "id, name, description, secret, created_at, last_used_at";

/// Unique constraint violation
const UNIQUE_VIOLATION: &str = "23505";
/// Serialization failure under concurrent transactions
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

/// Map sqlx errors onto store errors.
///
/// `RowNotFound` is not expected here since lookups use `fetch_optional`.
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => return StoreError::DuplicateSecret,
                Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED) => {
                    return StoreError::Conflict;
                }
                _ => {}
            }
        }

        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

/// Credential store using a shared PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: DbPool,
}

impl PgCredentialStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn list_all(&self) -> Result<Vec<Credential>, StoreError> {
        let credentials = sqlx::query_as::<_, Credential>(&format!(
            "SELECT {COLUMNS} FROM api_keys ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(credentials)
    }

    async fn insert(&self, new: NewCredential) -> Result<Credential, StoreError> {
        let credential = sqlx::query_as::<_, Credential>(&format!(
            r#"
            INSERT INTO api_keys (name, description, secret, last_used_at)
            VALUES ($1, $2, $3, NULL)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(new.name)
        .bind(new.description)
        .bind(new.secret)
        .fetch_one(&self.pool)
        .await?;

        Ok(credential)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Credential, StoreError> {
        sqlx::query_as::<_, Credential>(&format!("SELECT {COLUMNS} FROM api_keys WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_secret(&self, secret: &str) -> Result<Credential, StoreError> {
        sqlx::query_as::<_, Credential>(&format!(
            "SELECT {COLUMNS} FROM api_keys WHERE secret = $1"
        ))
        .bind(secret)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn update(&self, id: Uuid, changes: CredentialChanges) -> Result<Credential, StoreError> {
        let (set_description, description) = match changes.description {
            Some(value) => (true, value),
            None => (false, None),
        };

        // last_used_at only ever moves forward
        sqlx::query_as::<_, Credential>(&format!(
            r#"
            UPDATE api_keys
            SET name = COALESCE($2, name),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                secret = COALESCE($5, secret),
                last_used_at = CASE
                    WHEN $6::timestamptz IS NULL THEN last_used_at
                    ELSE GREATEST(COALESCE(last_used_at, $6::timestamptz), $6::timestamptz)
                END
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(set_description)
        .bind(description)
        .bind(changes.secret)
        .bind(changes.last_used_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM api_keys WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_are_unavailable() {
        let err = StoreError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert_eq!(StoreError::from(sqlx::Error::RowNotFound), StoreError::NotFound);
    }
}
