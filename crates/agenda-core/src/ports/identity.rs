//! Identity backend ports.

use async_trait::async_trait;

use crate::domain::User;

/// Identity provider trait - abstraction over the hosted sign-in service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Sign in an existing account. On success the account becomes the current user.
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, IdentityError>;

    /// Create an account and sign it in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<User, IdentityError>;

    /// Invalidate the current session.
    async fn sign_out(&self) -> Result<(), IdentityError>;

    /// The signed-in user, if any.
    async fn current_user(&self) -> Option<User>;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, IdentityError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, IdentityError>;
}

/// Identity backend errors. The message is what the user gets to see.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("The supplied credentials are incorrect or have expired")]
    InvalidCredentials,

    #[error("The email address is badly formatted")]
    MalformedEmail,

    #[error("Password should be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("The email address is already in use by another account")]
    EmailInUse,

    #[error("Hashing error: {0}")]
    HashingError(String),

    #[error("Identity backend unavailable: {0}")]
    Unavailable(String),
}
