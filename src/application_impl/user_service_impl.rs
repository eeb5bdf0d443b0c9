use crate::application_port::*;
use crate::domain_model::UserId;
use crate::domain_port::{UserRecord, UserRepo};
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub struct Argon2PasswordHasher;

#[async_trait::async_trait]
impl CredentialHasher for Argon2PasswordHasher {
    async fn hash_password(&self, password: &str) -> Result<String, CredentialError> {
        let salt = argon2::password_hash::SaltString::generate(&mut OsRng);
        let argon2 = argon2::Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CredentialError::InternalError(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    async fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, CredentialError> {
        let parsed = PasswordHash::new(password_hash).map_err(|e| {
            CredentialError::InternalError(format!("invalid PHC hash: {}", e.to_string()))
        })?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(CredentialError::InternalError(format!(
                "verify error: {}",
                e.to_string()
            ))),
        }
    }
}

pub struct RealUserService {
    user_repo: Arc<dyn UserRepo>,
    credential_hasher: Arc<dyn CredentialHasher>,
}

impl RealUserService {
    pub fn new(
        user_repo: Arc<dyn UserRepo>,
        credential_hasher: Arc<dyn CredentialHasher>,
    ) -> Self {
        Self {
            user_repo,
            credential_hasher,
        }
    }

    #[inline]
    fn new_user_id() -> UserId {
        UserId(Uuid::new_v4())
    }

    fn account(record: &UserRecord) -> UserAccount {
        UserAccount {
            user_id: record.user_id,
            username: record.username.clone(),
            email: record.email.clone(),
            created_at: record.created_at,
        }
    }
}

#[async_trait::async_trait]
impl UserService for RealUserService {
    async fn register(
        &self,
        request: RegistrationInput,
    ) -> Result<UserAccount, CredentialError> {
        let RegistrationInput {
            username,
            email,
            password,
        } = request;

        // Fast-path checks, username first: when both fields collide, the
        // username conflict is the one reported. The unique indexes behind
        // `save` stay authoritative for concurrent registrations.
        if self.user_repo.exists_by_username(&username).await? {
            return Err(CredentialError::UsernameTaken);
        }
        if self.user_repo.exists_by_email(&email).await? {
            return Err(CredentialError::EmailTaken);
        }

        let password_hash = self.credential_hasher.hash_password(&password).await?;

        let record = UserRecord {
            user_id: Self::new_user_id(),
            username,
            email,
            password_hash,
            created_at: Utc::now(),
        };
        self.user_repo.save(&record).await?;

        Ok(Self::account(&record))
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserAccount, CredentialError> {
        let record = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(CredentialError::UserNotFound)?;

        let ok = self
            .credential_hasher
            .verify_password(password, &record.password_hash)
            .await?;
        if !ok {
            return Err(CredentialError::PasswordMismatch);
        }

        Ok(Self::account(&record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryUserRepo {
        rows: Mutex<Vec<UserRecord>>,
    }

    impl MemoryUserRepo {
        fn row_count(&self) -> usize {
            self.rows.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl UserRepo for MemoryUserRepo {
        async fn exists_by_username(&self, username: &str) -> Result<bool, CredentialError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().any(|r| r.username == username))
        }

        async fn exists_by_email(&self, email: &str) -> Result<bool, CredentialError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().any(|r| r.email == email))
        }

        async fn find_by_username(
            &self,
            username: &str,
        ) -> Result<Option<UserRecord>, CredentialError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().find(|r| r.username == username).cloned())
        }

        async fn save(&self, record: &UserRecord) -> Result<(), CredentialError> {
            let mut rows = self.rows.lock().unwrap();
            if rows.iter().any(|r| r.username == record.username) {
                return Err(CredentialError::UsernameTaken);
            }
            if rows.iter().any(|r| r.email == record.email) {
                return Err(CredentialError::EmailTaken);
            }
            rows.push(record.clone());
            Ok(())
        }
    }

    /// Repo whose existence checks always answer "free", as seen by a
    /// registration that lost a race against a concurrent insert. Saves still
    /// go through the wrapped repo's uniqueness enforcement.
    struct StalePrecheckRepo {
        inner: Arc<MemoryUserRepo>,
    }

    #[async_trait::async_trait]
    impl UserRepo for StalePrecheckRepo {
        async fn exists_by_username(&self, _username: &str) -> Result<bool, CredentialError> {
            Ok(false)
        }

        async fn exists_by_email(&self, _email: &str) -> Result<bool, CredentialError> {
            Ok(false)
        }

        async fn find_by_username(
            &self,
            username: &str,
        ) -> Result<Option<UserRecord>, CredentialError> {
            self.inner.find_by_username(username).await
        }

        async fn save(&self, record: &UserRecord) -> Result<(), CredentialError> {
            self.inner.save(record).await
        }
    }

    struct FakeHasher;

    #[async_trait::async_trait]
    impl CredentialHasher for FakeHasher {
        async fn hash_password(&self, password: &str) -> Result<String, CredentialError> {
            Ok(format!("hashed:{}", password))
        }

        async fn verify_password(
            &self,
            password: &str,
            password_hash: &str,
        ) -> Result<bool, CredentialError> {
            Ok(password_hash == format!("hashed:{}", password))
        }
    }

    fn service_with(repo: Arc<dyn UserRepo>) -> RealUserService {
        RealUserService::new(repo, Arc::new(FakeHasher))
    }

    fn input(username: &str, email: &str, password: &str) -> RegistrationInput {
        RegistrationInput {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn register_persists_and_returns_account() {
        let repo = Arc::new(MemoryUserRepo::default());
        let service = service_with(repo.clone());

        let account = service
            .register(input("alice", "alice@x.com", "pw1"))
            .await
            .unwrap();
        assert_eq!(account.username, "alice");
        assert_eq!(account.email, "alice@x.com");

        assert_eq!(repo.row_count(), 1);
        assert!(repo.exists_by_username("alice").await.unwrap());
        assert!(repo.exists_by_email("alice@x.com").await.unwrap());

        let stored = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "pw1");
    }

    #[tokio::test]
    async fn username_conflict_wins_when_both_fields_collide() {
        let repo = Arc::new(MemoryUserRepo::default());
        let service = service_with(repo.clone());

        service
            .register(input("alice", "alice@x.com", "pw1"))
            .await
            .unwrap();

        let err = service
            .register(input("alice", "alice@x.com", "pw2"))
            .await
            .unwrap_err();
        assert!(matches!(err, CredentialError::UsernameTaken));
        assert_eq!(repo.row_count(), 1);
    }

    #[tokio::test]
    async fn stale_prechecks_still_hit_store_uniqueness() {
        let inner = Arc::new(MemoryUserRepo::default());
        service_with(inner.clone())
            .register(input("alice", "alice@x.com", "pw1"))
            .await
            .unwrap();

        let racing = service_with(Arc::new(StalePrecheckRepo {
            inner: inner.clone(),
        }));

        let err = racing
            .register(input("alice", "other@x.com", "pw2"))
            .await
            .unwrap_err();
        assert!(matches!(err, CredentialError::UsernameTaken));

        let err = racing
            .register(input("bob", "alice@x.com", "pw3"))
            .await
            .unwrap_err();
        assert!(matches!(err, CredentialError::EmailTaken));

        assert_eq!(inner.row_count(), 1);
    }

    #[tokio::test]
    async fn credential_check_scenario() {
        let repo = Arc::new(MemoryUserRepo::default());
        let service = service_with(repo.clone());

        let alice = service
            .register(input("alice", "alice@x.com", "pw1"))
            .await
            .unwrap();

        let err = service
            .register(input("alice", "other@x.com", "pw2"))
            .await
            .unwrap_err();
        assert!(matches!(err, CredentialError::UsernameTaken));

        let err = service
            .register(input("bob", "alice@x.com", "pw3"))
            .await
            .unwrap_err();
        assert!(matches!(err, CredentialError::EmailTaken));

        assert_eq!(repo.row_count(), 1);

        let authed = service.authenticate("alice", "pw1").await.unwrap();
        assert_eq!(authed, alice);

        let err = service.authenticate("alice", "pw2").await.unwrap_err();
        assert!(matches!(err, CredentialError::PasswordMismatch));

        let err = service.authenticate("carol", "any").await.unwrap_err();
        assert!(matches!(err, CredentialError::UserNotFound));
    }

    #[tokio::test]
    async fn argon2_hashes_are_salted_and_verifiable() {
        let hasher = Argon2PasswordHasher;

        let hash = hasher.hash_password("pw1").await.unwrap();
        assert_ne!(hash, "pw1");
        assert!(hash.starts_with("$argon2"));

        // Fresh salt per call: same input, different hash.
        let again = hasher.hash_password("pw1").await.unwrap();
        assert_ne!(hash, again);

        assert!(hasher.verify_password("pw1", &hash).await.unwrap());
        assert!(!hasher.verify_password("pw2", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn argon2_rejects_malformed_stored_hash() {
        let hasher = Argon2PasswordHasher;
        let err = hasher
            .verify_password("pw1", "not-a-phc-string")
            .await
            .unwrap_err();
        assert!(matches!(err, CredentialError::InternalError(_)));
    }

    #[tokio::test]
    async fn register_and_authenticate_with_argon2() {
        let repo = Arc::new(MemoryUserRepo::default());
        let service = RealUserService::new(repo, Arc::new(Argon2PasswordHasher));

        let account = service
            .register(input("dave", "dave@x.com", "hunter2"))
            .await
            .unwrap();
        let authed = service.authenticate("dave", "hunter2").await.unwrap();
        assert_eq!(account, authed);
    }
}
