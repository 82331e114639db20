//! Form validation run before any call reaches a backend.
//!
//! Every check is pure and synchronous. The per-form records collect one
//! optional error per field so a front-end can show them side by side.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::Credentials;
use crate::error::ValidationError;

/// Minimum accepted password length, in characters.
pub const PASSWORD_MIN_LEN: usize = 6;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // One `@`, a dotted domain whose labels start alphanumeric.
        let pattern = r"^[A-Za-z0-9+._%\-]{1,256}@[A-Za-z0-9][A-Za-z0-9\-]{0,64}(\.[A-Za-z0-9][A-Za-z0-9\-]{0,25})+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::EmptyEmail);
    }
    if !email_regex().is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.trim().is_empty() {
        return Err(ValidationError::EmptyPassword);
    }
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

pub fn validate_confirmation(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if confirm.trim().is_empty() {
        return Err(ValidationError::EmptyConfirmation);
    }
    if confirm != password {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// Registration form as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegistrationForm {
    pub credentials: Credentials,
    pub confirm: String,
}

impl RegistrationForm {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        confirm: impl Into<String>,
    ) -> Self {
        Self {
            credentials: Credentials::new(email, password),
            confirm: confirm.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistrationErrors {
    pub email: Option<ValidationError>,
    pub password: Option<ValidationError>,
    pub confirmation: Option<ValidationError>,
}

impl RegistrationErrors {
    pub fn is_valid(&self) -> bool {
        self.email.is_none() && self.password.is_none() && self.confirmation.is_none()
    }
}

pub fn validate_registration(form: &RegistrationForm) -> RegistrationErrors {
    let Credentials { email, password } = &form.credentials;
    RegistrationErrors {
        email: validate_email(email).err(),
        password: validate_password(password).err(),
        confirmation: validate_confirmation(password, &form.confirm).err(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoginErrors {
    pub email: Option<ValidationError>,
    pub password: Option<ValidationError>,
}

impl LoginErrors {
    pub fn is_valid(&self) -> bool {
        self.email.is_none() && self.password.is_none()
    }
}

/// Login only rejects empty fields; format checks are left to the backend.
pub fn validate_login(credentials: &Credentials) -> LoginErrors {
    LoginErrors {
        email: credentials
            .email
            .trim()
            .is_empty()
            .then_some(ValidationError::EmptyEmail),
        password: credentials
            .password
            .trim()
            .is_empty()
            .then_some(ValidationError::EmptyPassword),
    }
}
