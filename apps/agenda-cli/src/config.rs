//! Application configuration loaded from environment variables.

use std::env;

use agenda_core::sync::DEFAULT_COLLECTION;
use agenda_infra::InMemoryStoreConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Collection holding event documents.
    pub events_collection: String,
    pub store: InMemoryStoreConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            events_collection: env::var("EVENTS_COLLECTION")
                .ok()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
            store: InMemoryStoreConfig::from_env(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            events_collection: DEFAULT_COLLECTION.to_string(),
            store: InMemoryStoreConfig::default(),
        }
    }
}
