//! # Agenda Infrastructure
//!
//! Concrete implementations of the ports defined in `agenda-core`.
//!
//! - `identity` - in-memory email/password accounts with Argon2 hashes
//! - `store` - in-memory document store pushing full snapshots to subscribers
//! - `auth` - password hashing

pub mod auth;
pub mod identity;
pub mod store;

pub use auth::Argon2PasswordService;
pub use identity::InMemoryIdentityProvider;
pub use store::{InMemoryDocumentStore, InMemoryStoreConfig};
