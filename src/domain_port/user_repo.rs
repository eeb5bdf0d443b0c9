use crate::application_port::CredentialError;
use crate::domain_model::UserId;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    async fn exists_by_username(&self, username: &str) -> Result<bool, CredentialError>;

    async fn exists_by_email(&self, email: &str) -> Result<bool, CredentialError>;

    /// Fetch the full record by username (for login).
    async fn find_by_username(&self, username: &str)
    -> Result<Option<UserRecord>, CredentialError>;

    /// Insert one row. Username and email uniqueness is enforced atomically
    /// by the store; a duplicate-key violation must come back as
    /// `UsernameTaken` or `EmailTaken`, never as a bare store error.
    async fn save(&self, record: &UserRecord) -> Result<(), CredentialError>;
}
