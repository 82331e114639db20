//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that backends must implement.

mod document_store;
mod identity;

pub use document_store::{Document, DocumentStore, FieldFilter, SnapshotStream};
pub use identity::{IdentityError, IdentityProvider, PasswordService};
