use crate::application_port::*;
use crate::domain_model::UserId;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct FakeUserService {
    accounts: Mutex<HashMap<String, (UserAccount, String)>>,
}

impl FakeUserService {
    pub fn new() -> Self {
        Self::default()
    }
}

// Minimal in-memory fake for running the server without MySQL.
// Extend to simulate store failures and configurable responses when needed.
#[async_trait::async_trait]
impl UserService for FakeUserService {
    async fn register(
        &self,
        request: RegistrationInput,
    ) -> Result<UserAccount, CredentialError> {
        let mut accounts = self.accounts.lock().unwrap();

        if accounts.contains_key(&request.username) {
            return Err(CredentialError::UsernameTaken);
        }
        if accounts.values().any(|(a, _)| a.email == request.email) {
            return Err(CredentialError::EmailTaken);
        }

        let account = UserAccount {
            user_id: get_fake_id(&request.username),
            username: request.username.clone(),
            email: request.email,
            created_at: Utc::now(),
        };
        accounts.insert(
            request.username,
            (account.clone(), format!("fake-hash:{}", request.password)),
        );

        Ok(account)
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<UserAccount, CredentialError> {
        let accounts = self.accounts.lock().unwrap();

        let (account, stored) = accounts
            .get(username)
            .ok_or(CredentialError::UserNotFound)?;
        if stored != &format!("fake-hash:{}", password) {
            return Err(CredentialError::PasswordMismatch);
        }

        Ok(account.clone())
    }
}

fn get_fake_id(username: &str) -> UserId {
    UserId(uuid::Uuid::new_v5(
        &uuid::Uuid::NAMESPACE_OID,
        username.as_bytes(),
    ))
}
