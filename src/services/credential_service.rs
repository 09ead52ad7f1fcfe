//! Credential service - business rules for API keys.
//!
//! This service handles:
//! - Name validation and secret generation on create
//! - Partial edits that keep the secret unless a replacement is supplied
//! - Validation of presented secrets and usage bookkeeping
//! - Dashboard statistics
//!
//! # Consistency
//!
//! `validate` reads then writes without a transaction. Concurrent validations
//! of the same key race on `last_used_at`; the store keeps the later timestamp.

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::secret_generator::{self, SecretGenerator};
use crate::error::AppError;
use crate::models::credential::{
    CreateCredentialRequest, Credential, CredentialChanges, CredentialStats, NewCredential,
    UpdateCredentialRequest, ValidationOutcome, normalize_text,
};
use crate::store::{SharedCredentialStore, StoreError};

/// Attempts at finding an unused secret before giving up.
const MAX_SECRET_ATTEMPTS: usize = 3;

/// Window for the "recently created" statistic.
const RECENT_WINDOW_DAYS: i64 = 7;

/// API key operations layered over a credential store.
#[derive(Debug, Clone)]
pub struct CredentialService {
    store: SharedCredentialStore,
    generator: SecretGenerator,
}

impl CredentialService {
    pub fn new(store: SharedCredentialStore) -> Self {
        Self {
            store,
            generator: SecretGenerator::new(),
        }
    }

    /// Replace the secret generator.
    pub fn with_generator(mut self, generator: SecretGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Create a new API key.
    ///
    /// # Process
    ///
    /// 1. Require a non-blank name
    /// 2. Generate a secret
    /// 3. Insert with `last_used_at` empty, regenerating the secret if it collides
    ///
    /// # Errors
    ///
    /// - `Validation`: Name missing or blank
    /// - `StoreUnavailable`: Store failed, or no free secret after several attempts
    pub async fn create(&self, request: CreateCredentialRequest) -> Result<Credential, AppError> {
        let name = normalize_text(request.name)
            .ok_or_else(|| AppError::Validation("Name is required".to_string()))?;
        let description = normalize_text(request.description);

        for attempt in 1..=MAX_SECRET_ATTEMPTS {
            let new = NewCredential {
                name: name.clone(),
                description: description.clone(),
                secret: self.generator.generate(),
            };

            match self.store.insert(new).await {
                Ok(credential) => {
                    info!(id = %credential.id, name = %credential.name, "API key created");
                    return Ok(credential);
                }
                Err(StoreError::DuplicateSecret) => {
                    warn!(attempt, "Generated secret collided, regenerating");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(StoreError::Unavailable(format!(
            "no unused secret after {MAX_SECRET_ATTEMPTS} attempts"
        ))
        .into())
    }

    /// Get a single API key.
    pub async fn get(&self, id: Uuid) -> Result<Credential, AppError> {
        Ok(self.store.find_by_id(id).await?)
    }

    /// Edit an API key.
    ///
    /// `name` and `description` are applied when present. The secret is only
    /// replaced when a non-blank one is supplied.
    ///
    /// # Errors
    ///
    /// - `Validation`: Blank name, or the new secret belongs to another key
    /// - `NotFound`: Unknown id
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateCredentialRequest,
    ) -> Result<Credential, AppError> {
        let name = match request.name {
            Some(name) => Some(
                normalize_text(Some(name))
                    .ok_or_else(|| AppError::Validation("Name cannot be empty".to_string()))?,
            ),
            None => None,
        };

        let rotated = normalize_text(request.secret);
        let changes = CredentialChanges {
            name,
            description: request.description.map(|d| normalize_text(Some(d))),
            secret: rotated.clone(),
            last_used_at: None,
        };

        let credential = self.store.update(id, changes).await?;
        info!(id = %id, rotated = rotated.is_some(), "API key updated");

        Ok(credential)
    }

    /// Permanently delete an API key.
    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.store.delete(id).await?;
        info!(id = %id, "API key deleted");
        Ok(())
    }

    /// All API keys, newest first.
    pub async fn list_all(&self) -> Result<Vec<Credential>, AppError> {
        Ok(self.store.list_all().await?)
    }

    /// Check a presented secret and record its use.
    ///
    /// Unknown, empty or malformed secrets return `Invalid` and change nothing.
    /// Store failures are errors, never `Invalid`.
    ///
    /// # Process
    ///
    /// 1. Look up the trimmed secret
    /// 2. Re-compare the stored secret in constant time
    /// 3. Set `last_used_at` to now, retrying once on a write conflict
    pub async fn validate(&self, secret: &str) -> Result<ValidationOutcome, AppError> {
        let Some(credential) = self.lookup(secret).await? else {
            return Ok(ValidationOutcome::Invalid);
        };

        let used = match self.record_usage(credential.id).await {
            Ok(updated) => updated,
            // Deleted between lookup and write
            Err(StoreError::NotFound) => return Ok(ValidationOutcome::Invalid),
            Err(err) => return Err(err.into()),
        };

        debug!(id = %used.id, "API key validated");
        Ok(ValidationOutcome::Valid(used))
    }

    /// Check a presented secret without recording use.
    pub async fn check(&self, secret: &str) -> Result<ValidationOutcome, AppError> {
        Ok(match self.lookup(secret).await? {
            Some(credential) => ValidationOutcome::Valid(credential),
            None => ValidationOutcome::Invalid,
        })
    }

    /// Totals shown on the dashboard.
    pub async fn stats(&self) -> Result<CredentialStats, AppError> {
        let credentials = self.store.list_all().await?;
        let recent_cutoff = Utc::now() - Duration::days(RECENT_WINDOW_DAYS);

        Ok(CredentialStats {
            total: credentials.len(),
            active: credentials.iter().filter(|c| c.has_been_used()).count(),
            recently_created: credentials
                .iter()
                .filter(|c| c.created_at > recent_cutoff)
                .count(),
        })
    }

    /// Verify the store is reachable.
    pub async fn ping(&self) -> Result<(), AppError> {
        Ok(self.store.ping().await?)
    }

    async fn lookup(&self, secret: &str) -> Result<Option<Credential>, AppError> {
        let secret = secret.trim();
        if secret.is_empty() {
            return Ok(None);
        }

        match self.store.find_by_secret(secret).await {
            Ok(credential) if secret_generator::constant_time_eq(&credential.secret, secret) => {
                Ok(Some(credential))
            }
            Ok(_) | Err(StoreError::NotFound) => {
                debug!(
                    fingerprint = %secret_generator::fingerprint(secret),
                    "Rejected unknown API key"
                );
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn record_usage(&self, id: Uuid) -> Result<Credential, StoreError> {
        match self.store.update(id, CredentialChanges::used_at(Utc::now())).await {
            Err(StoreError::Conflict) => {
                warn!(id = %id, "Usage write conflicted, retrying once");
                self.store
                    .update(id, CredentialChanges::used_at(Utc::now()))
                    .await
            }
            result => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CredentialStore, InMemoryCredentialStore};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Wraps the in-memory store with injectable failures.
    #[derive(Debug, Default)]
    struct FlakyStore {
        inner: InMemoryCredentialStore,
        unavailable: AtomicBool,
        conflicts_remaining: AtomicUsize,
        duplicates_remaining: AtomicUsize,
        updates: AtomicUsize,
    }

    impl FlakyStore {
        fn check(&self) -> Result<(), StoreError> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("connection refused".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl CredentialStore for FlakyStore {
        async fn list_all(&self) -> Result<Vec<Credential>, StoreError> {
            self.check()?;
            self.inner.list_all().await
        }

        async fn insert(&self, new: NewCredential) -> Result<Credential, StoreError> {
            self.check()?;
            if self
                .duplicates_remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(StoreError::DuplicateSecret);
            }
            self.inner.insert(new).await
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Credential, StoreError> {
            self.check()?;
            self.inner.find_by_id(id).await
        }

        async fn find_by_secret(&self, secret: &str) -> Result<Credential, StoreError> {
            self.check()?;
            self.inner.find_by_secret(secret).await
        }

        async fn update(
            &self,
            id: Uuid,
            changes: CredentialChanges,
        ) -> Result<Credential, StoreError> {
            self.check()?;
            self.updates.fetch_add(1, Ordering::SeqCst);
            if self
                .conflicts_remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(StoreError::Conflict);
            }
            self.inner.update(id, changes).await
        }

        async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
            self.check()?;
            self.inner.delete(id).await
        }
    }

    fn service() -> (CredentialService, Arc<FlakyStore>) {
        let store = Arc::new(FlakyStore::default());
        (CredentialService::new(store.clone()), store)
    }

    fn create_request(name: &str, description: Option<&str>) -> CreateCredentialRequest {
        CreateCredentialRequest {
            name: Some(name.to_string()),
            description: description.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn create_generates_prefixed_secret() {
        let (service, _) = service();

        let created = service
            .create(create_request("Prod", Some("prod key")))
            .await
            .unwrap();
        let fetched = service.get(created.id).await.unwrap();

        assert_eq!(fetched.name, "Prod");
        assert_eq!(fetched.description.as_deref(), Some("prod key"));
        assert!(fetched.secret.starts_with("pk_"));
        assert!(fetched.secret.len() >= 23);
        assert!(fetched.last_used_at.is_none());
    }

    #[tokio::test]
    async fn create_uses_configured_secret_length() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let service =
            CredentialService::new(store).with_generator(SecretGenerator::new().with_length(40));

        let created = service.create(create_request("Prod", None)).await.unwrap();

        assert_eq!(created.secret.len(), 43);
    }

    #[tokio::test]
    async fn create_rejects_missing_or_blank_name() {
        let (service, store) = service();

        let missing = service.create(CreateCredentialRequest::default()).await;
        assert!(matches!(missing, Err(AppError::Validation(_))));

        let blank = service.create(create_request("   ", None)).await;
        assert!(matches!(blank, Err(AppError::Validation(_))));

        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_regenerates_colliding_secret() {
        let (service, store) = service();
        store.duplicates_remaining.store(2, Ordering::SeqCst);

        let created = service.create(create_request("Prod", None)).await.unwrap();

        assert_eq!(store.find_by_id(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn create_gives_up_after_repeated_collisions() {
        let (service, store) = service();
        store
            .duplicates_remaining
            .store(MAX_SECRET_ATTEMPTS, Ordering::SeqCst);

        let result = service.create(create_request("Prod", None)).await;

        assert!(matches!(result, Err(AppError::StoreUnavailable)));
    }

    #[tokio::test]
    async fn validate_records_usage() {
        let (service, _) = service();
        let created = service.create(create_request("Prod", None)).await.unwrap();
        let before = Utc::now();

        let outcome = service.validate(&created.secret).await.unwrap();

        assert!(outcome.is_valid());
        assert_eq!(outcome.credential().unwrap().name, "Prod");
        let stored = service.get(created.id).await.unwrap();
        assert!(stored.last_used_at.unwrap() >= before);
    }

    #[tokio::test]
    async fn validate_trims_whitespace() {
        let (service, _) = service();
        let created = service.create(create_request("Prod", None)).await.unwrap();

        let outcome = service
            .validate(&format!("  {}\n", created.secret))
            .await
            .unwrap();

        assert!(outcome.is_valid());
    }

    #[tokio::test]
    async fn last_used_at_is_non_decreasing_across_validations() {
        let (service, _) = service();
        let created = service.create(create_request("Prod", None)).await.unwrap();

        let first = service.validate(&created.secret).await.unwrap();
        let second = service.validate(&created.secret).await.unwrap();

        let t1 = first.credential().unwrap().last_used_at.unwrap();
        let t2 = second.credential().unwrap().last_used_at.unwrap();
        assert!(t2 >= t1);
    }

    #[tokio::test]
    async fn unknown_secret_is_invalid_without_side_effects() {
        let (service, store) = service();
        let created = service.create(create_request("Prod", None)).await.unwrap();

        for input in ["not-a-real-key", "", "   ", "pk_", &created.secret[..10]] {
            let outcome = service.validate(input).await.unwrap();
            assert_eq!(outcome, ValidationOutcome::Invalid);
        }

        assert_eq!(store.updates.load(Ordering::SeqCst), 0);
        assert!(service.get(created.id).await.unwrap().last_used_at.is_none());
    }

    #[tokio::test]
    async fn lookup_failure_is_an_error_not_invalid() {
        let (service, store) = service();
        store.unavailable.store(true, Ordering::SeqCst);

        let result = service.validate("pk_ANYTHING").await;

        assert!(matches!(result, Err(AppError::StoreUnavailable)));
    }

    #[tokio::test]
    async fn usage_write_conflict_is_retried_once() {
        let (service, store) = service();
        let created = service.create(create_request("Prod", None)).await.unwrap();
        store.conflicts_remaining.store(1, Ordering::SeqCst);

        let outcome = service.validate(&created.secret).await.unwrap();

        assert!(outcome.is_valid());
        assert_eq!(store.updates.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn second_usage_write_conflict_surfaces() {
        let (service, store) = service();
        let created = service.create(create_request("Prod", None)).await.unwrap();
        store.conflicts_remaining.store(2, Ordering::SeqCst);

        let result = service.validate(&created.secret).await;

        assert!(matches!(result, Err(AppError::StoreUnavailable)));
        assert_eq!(store.updates.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn check_does_not_record_usage() {
        let (service, store) = service();
        let created = service.create(create_request("Prod", None)).await.unwrap();

        let outcome = service.check(&created.secret).await.unwrap();

        assert!(outcome.is_valid());
        assert_eq!(store.updates.load(Ordering::SeqCst), 0);
        assert!(service.get(created.id).await.unwrap().last_used_at.is_none());
    }

    #[tokio::test]
    async fn update_without_secret_keeps_secret() {
        let (service, _) = service();
        let created = service
            .create(create_request("Prod", Some("prod key")))
            .await
            .unwrap();

        let updated = service
            .update(
                created.id,
                UpdateCredentialRequest {
                    name: Some("X".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "X");
        assert_eq!(updated.secret, created.secret);
        assert_eq!(updated.description.as_deref(), Some("prod key"));
    }

    #[tokio::test]
    async fn update_with_secret_changes_only_secret() {
        let (service, _) = service();
        let created = service
            .create(create_request("Prod", Some("prod key")))
            .await
            .unwrap();

        let updated = service
            .update(
                created.id,
                UpdateCredentialRequest {
                    secret: Some("new".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.secret, "new");
        assert_eq!(updated.name, "Prod");
        assert_eq!(updated.description.as_deref(), Some("prod key"));
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn update_with_blank_secret_keeps_secret() {
        let (service, _) = service();
        let created = service.create(create_request("Prod", None)).await.unwrap();

        let updated = service
            .update(
                created.id,
                UpdateCredentialRequest {
                    secret: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.secret, created.secret);
    }

    #[tokio::test]
    async fn update_rejects_secret_of_another_key() {
        let (service, _) = service();
        let first = service.create(create_request("a", None)).await.unwrap();
        let second = service.create(create_request("b", None)).await.unwrap();

        let result = service
            .update(
                second.id,
                UpdateCredentialRequest {
                    secret: Some(first.secret.clone()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn update_rejects_blank_name() {
        let (service, _) = service();
        let created = service.create(create_request("Prod", None)).await.unwrap();

        let result = service
            .update(
                created.id,
                UpdateCredentialRequest {
                    name: Some(" ".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn deleted_key_is_gone_everywhere() {
        let (service, _) = service();
        let created = service.create(create_request("Prod", None)).await.unwrap();

        service.remove(created.id).await.unwrap();

        assert!(matches!(service.get(created.id).await, Err(AppError::NotFound)));
        assert!(matches!(
            service
                .update(created.id, UpdateCredentialRequest::default())
                .await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(service.remove(created.id).await, Err(AppError::NotFound)));
        assert_eq!(
            service.validate(&created.secret).await.unwrap(),
            ValidationOutcome::Invalid
        );
    }

    #[tokio::test]
    async fn list_returns_every_key_newest_first() {
        let (service, _) = service();
        for name in ["one", "two", "three"] {
            service.create(create_request(name, None)).await.unwrap();
        }

        let listed = service.list_all().await.unwrap();

        assert_eq!(listed.len(), 3);
        assert!(listed.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn stats_count_used_and_recent_keys() {
        let old = Credential {
            id: Uuid::new_v4(),
            name: "old".to_string(),
            description: None,
            secret: "pk_OLDKEY".to_string(),
            created_at: Utc::now() - Duration::days(30),
            last_used_at: Some(Utc::now() - Duration::days(1)),
        };
        let store = Arc::new(InMemoryCredentialStore::with_credentials(vec![old]));
        let service = CredentialService::new(store);
        service.create(create_request("fresh", None)).await.unwrap();

        let stats = service.stats().await.unwrap();

        assert_eq!(
            stats,
            CredentialStats {
                total: 2,
                active: 1,
                recently_created: 1,
            }
        );
    }
}
