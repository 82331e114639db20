//! Application state - shared by the prompt and the render task.

use std::sync::Arc;

use agenda_core::ports::{DocumentStore, IdentityProvider};
use agenda_core::{AuthSession, EventListSync};
use agenda_infra::{InMemoryDocumentStore, InMemoryIdentityProvider};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<AuthSession>,
    pub events: Arc<EventListSync>,
}

impl AppState {
    /// Build the state around the given backends.
    pub fn new(
        config: &AppConfig,
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        let session = Arc::new(AuthSession::new(identity.clone()));
        let events = Arc::new(EventListSync::with_collection(
            identity,
            store,
            config.events_collection.clone(),
        ));
        Self { session, events }
    }

    /// Build the state with in-process backends.
    pub fn in_memory(config: &AppConfig) -> Self {
        let identity: Arc<dyn IdentityProvider> = Arc::new(InMemoryIdentityProvider::default());
        let store: Arc<dyn DocumentStore> =
            Arc::new(InMemoryDocumentStore::new(config.store.clone()));

        tracing::info!(
            collection = %config.events_collection,
            buffer_size = config.store.buffer_size,
            "Using in-memory backends"
        );
        Self::new(config, identity, store)
    }
}
