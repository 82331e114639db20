//! Domain entities - the core business objects.

mod user;

mod event;

pub use event::{Event, EventDraft, EventRecord};
pub use user::{Credentials, User};
