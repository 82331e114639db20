//! In-memory identity backend.
//!
//! Stands in for a hosted sign-in service within a single process.
//! Accounts are lost when the process exits.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use agenda_core::domain::User;
use agenda_core::ports::{IdentityError, IdentityProvider, PasswordService};
use agenda_core::validation::{PASSWORD_MIN_LEN, validate_email};

use crate::auth::Argon2PasswordService;

struct Account {
    user: User,
    password_hash: String,
}

/// Email/password accounts plus a single signed-in user.
pub struct InMemoryIdentityProvider {
    accounts: RwLock<HashMap<String, Account>>,
    current: RwLock<Option<User>>,
    passwords: Arc<dyn PasswordService>,
}

impl InMemoryIdentityProvider {
    pub fn new(passwords: Arc<dyn PasswordService>) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            current: RwLock::new(None),
            passwords,
        }
    }

    pub async fn account_count(&self) -> usize {
        self.accounts.read().await.len()
    }

    fn account_key(email: &str) -> String {
        email.trim().to_lowercase()
    }
}

impl Default for InMemoryIdentityProvider {
    fn default() -> Self {
        Self::new(Arc::new(Argon2PasswordService::new()))
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, IdentityError> {
        let accounts = self.accounts.read().await;
        let account = accounts
            .get(&Self::account_key(email))
            .ok_or(IdentityError::InvalidCredentials)?;

        if !self.passwords.verify(password, &account.password_hash)? {
            tracing::debug!(user_id = %account.user.id, "Password mismatch");
            return Err(IdentityError::InvalidCredentials);
        }

        let user = account.user.clone();
        drop(accounts);

        *self.current.write().await = Some(user.clone());
        tracing::info!(user_id = %user.id, "User signed in");
        Ok(user)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<User, IdentityError> {
        let email = email.trim();
        validate_email(email).map_err(|_| IdentityError::MalformedEmail)?;
        if password.chars().count() < PASSWORD_MIN_LEN {
            return Err(IdentityError::WeakPassword {
                min: PASSWORD_MIN_LEN,
            });
        }

        let password_hash = self.passwords.hash(password)?;
        let user = User::new(Uuid::new_v4().simple().to_string(), email);

        {
            let mut accounts = self.accounts.write().await;
            let key = Self::account_key(email);
            if accounts.contains_key(&key) {
                return Err(IdentityError::EmailInUse);
            }
            accounts.insert(
                key,
                Account {
                    user: user.clone(),
                    password_hash,
                },
            );
        }

        *self.current.write().await = Some(user.clone());
        tracing::info!(user_id = %user.id, "Account created");
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        if let Some(user) = self.current.write().await.take() {
            tracing::info!(user_id = %user.id, "User signed out");
        }
        Ok(())
    }

    async fn current_user(&self) -> Option<User> {
        self.current.read().await.clone()
    }
}
