//! Domain-level error types.

use thiserror::Error;

/// Field-level validation failures. The display text is shown next to the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Enter your email")]
    EmptyEmail,

    #[error("Invalid email")]
    InvalidEmail,

    #[error("Enter your password")]
    EmptyPassword,

    #[error("Minimum 6 characters")]
    PasswordTooShort,

    #[error("Repeat the password")]
    EmptyConfirmation,

    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// Document store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Store connection failed: {0}")]
    Connection(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// A write issued by the event list that the backend did not accept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncWriteError {
    #[error("Failed to create event: {source}")]
    Create { source: StoreError },

    #[error("Failed to update event {id}: {source}")]
    Update { id: String, source: StoreError },

    #[error("Failed to delete event {id}: {source}")]
    Delete { id: String, source: StoreError },
}

impl SyncWriteError {
    pub fn source_error(&self) -> &StoreError {
        match self {
            SyncWriteError::Create { source }
            | SyncWriteError::Update { source, .. }
            | SyncWriteError::Delete { source, .. } => source,
        }
    }
}
