//! # Agenda Core
//!
//! The client-side core of the Agenda app: domain types, backend ports,
//! form validation, the authentication session and the live event list.
//! Backends are injected as trait objects, so everything here runs against
//! fakes as easily as against a hosted service.

pub mod domain;
pub mod error;
pub mod ports;
pub mod session;
pub mod sync;
pub mod validation;

pub use error::{StoreError, SyncWriteError, ValidationError};
pub use session::{AuthSession, AuthState};
pub use sync::EventListSync;
