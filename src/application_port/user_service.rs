use crate::domain_model::UserId;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("username already taken")]
    UsernameTaken,
    #[error("email already registered")]
    EmailTaken,
    #[error("user not found")]
    UserNotFound,
    #[error("password mismatch")]
    PasswordMismatch,
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(Debug, Clone)]
pub struct RegistrationInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// The account view handed back to callers. The stored password hash stays
/// behind the repo boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserAccount {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, CredentialError>;
    async fn verify_password(&self, password: &str, password_hash: &str)
    -> Result<bool, CredentialError>;
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    async fn register(&self, request: RegistrationInput) -> Result<UserAccount, CredentialError>;
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserAccount, CredentialError>;
}
