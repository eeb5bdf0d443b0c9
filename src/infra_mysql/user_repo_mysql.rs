use super::util::dup_key_conflict;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

pub struct MySqlUserRepo {
    pool: MySqlPool,
}

impl MySqlUserRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlUserRepo { pool }
    }

    #[inline]
    fn uid_as_bytes(id: &UserId) -> &[u8] {
        id.0.as_bytes()
    }

    #[inline]
    fn uid_from_bytes(id: &[u8]) -> Result<UserId, CredentialError> {
        Ok(UserId(
            Uuid::from_slice(id).map_err(|e| CredentialError::Store(e.to_string()))?,
        ))
    }

    fn row_to_record(row: MySqlRow) -> Result<UserRecord, CredentialError> {
        let user_id_bytes: Vec<u8> = row
            .try_get("user_id")
            .map_err(|e| CredentialError::Store(e.to_string()))?;
        let user_id = Self::uid_from_bytes(&user_id_bytes)?;

        let username: String = row
            .try_get("username")
            .map_err(|e| CredentialError::Store(e.to_string()))?;
        let email: String = row
            .try_get("email")
            .map_err(|e| CredentialError::Store(e.to_string()))?;
        let password_hash: String = row
            .try_get("password_hash")
            .map_err(|e| CredentialError::Store(e.to_string()))?;

        let created_at: DateTime<Utc> = row
            .try_get("created_at")
            .map_err(|e| CredentialError::Store(e.to_string()))?;

        Ok(UserRecord {
            user_id,
            username,
            email,
            password_hash,
            created_at,
        })
    }
}

#[async_trait::async_trait]
impl UserRepo for MySqlUserRepo {
    async fn exists_by_username(&self, username: &str) -> Result<bool, CredentialError> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM user WHERE username = ?"#)
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| CredentialError::Store(e.to_string()))?;

        Ok(count > 0)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, CredentialError> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM user WHERE email = ?"#)
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| CredentialError::Store(e.to_string()))?;

        Ok(count > 0)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, CredentialError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT user_id, username, email, password_hash, created_at
FROM user
WHERE username = ?
"#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CredentialError::Store(e.to_string()))?;

        row_opt.map(Self::row_to_record).transpose()
    }

    async fn save(&self, record: &UserRecord) -> Result<(), CredentialError> {
        sqlx::query(
            r#"
INSERT INTO user (user_id, username, email, password_hash, created_at)
VALUES (?, ?, ?, ?, ?)
"#,
        )
        .bind(Self::uid_as_bytes(&record.user_id))
        .bind(&record.username)
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            dup_key_conflict(&e).unwrap_or_else(|| CredentialError::Store(e.to_string()))
        })?;

        Ok(())
    }
}
