//! Authentication session shared by every screen.

use std::sync::Arc;

use tokio::sync::watch;

use crate::domain::{Credentials, User};
use crate::ports::{IdentityError, IdentityProvider};
use crate::validation::{
    LoginErrors, RegistrationErrors, RegistrationForm, validate_login, validate_registration,
};

/// Observable outcome of the latest auth call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// A sign-in or sign-up call is in flight.
    Pending,
    /// Not loading and no failure; `true` when a user is signed in.
    Authenticated(bool),
    /// The backend rejected the call.
    Failed(String),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(true))
    }
}

/// Wraps the identity backend and publishes a single shared [`AuthState`].
///
/// Calls are not isolated from each other: overlapping calls simply race and
/// the last one to finish decides the published state.
pub struct AuthSession {
    identity: Arc<dyn IdentityProvider>,
    state: watch::Sender<AuthState>,
}

impl AuthSession {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        let (state, _) = watch::channel(AuthState::Authenticated(false));
        Self { identity, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub async fn current_user(&self) -> Option<User> {
        self.identity.current_user().await
    }

    /// Publish `Authenticated(true)` if the backend still holds a session.
    pub async fn restore(&self) -> AuthState {
        if let Some(user) = self.identity.current_user().await {
            tracing::info!(user_id = %user.id, "Restored existing session");
            self.state.send_replace(AuthState::Authenticated(true));
        }
        self.state()
    }

    pub async fn login(&self, credentials: &Credentials) -> AuthState {
        self.state.send_replace(AuthState::Pending);
        let result = self
            .identity
            .sign_in(&credentials.email, &credentials.password)
            .await;
        self.finish("login", result)
    }

    pub async fn register(&self, credentials: &Credentials) -> AuthState {
        self.state.send_replace(AuthState::Pending);
        let result = self
            .identity
            .sign_up(&credentials.email, &credentials.password)
            .await;
        self.finish("register", result)
    }

    /// Validate the login form, then log in. The backend is not called on field errors.
    pub async fn submit_login(&self, credentials: &Credentials) -> Result<AuthState, LoginErrors> {
        let errors = validate_login(credentials);
        if !errors.is_valid() {
            return Err(errors);
        }
        Ok(self.login(credentials).await)
    }

    /// Validate the registration form, then register. The backend is not called on field errors.
    pub async fn submit_registration(
        &self,
        form: &RegistrationForm,
    ) -> Result<AuthState, RegistrationErrors> {
        let errors = validate_registration(form);
        if !errors.is_valid() {
            tracing::debug!(?errors, "Registration blocked by validation");
            return Err(errors);
        }
        Ok(self.register(&form.credentials).await)
    }

    pub async fn sign_out(&self) -> AuthState {
        if let Err(e) = self.identity.sign_out().await {
            tracing::warn!(error = %e, "Sign-out failed at the backend, clearing local state anyway");
        }
        self.state.send_replace(AuthState::Authenticated(false));
        tracing::info!("Signed out");
        self.state()
    }

    fn finish(&self, action: &'static str, result: Result<User, IdentityError>) -> AuthState {
        let next = match result {
            Ok(user) => {
                tracing::info!(action, user_id = %user.id, "Authenticated");
                AuthState::Authenticated(true)
            }
            Err(e) => {
                tracing::warn!(action, error = %e, "Authentication failed");
                AuthState::Failed(e.to_string())
            }
        };
        self.state.send_replace(next.clone());
        next
    }
}
