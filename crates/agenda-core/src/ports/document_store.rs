//! Document store port - abstraction over the hosted document database.

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;

use crate::error::StoreError;

/// A stored document: backend-assigned id plus JSON data.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

/// Equality filter on a single top-level field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: Value,
}

impl FieldFilter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, data: &Value) -> bool {
        data.get(&self.field) == Some(&self.value)
    }
}

/// Stream of full result sets. Every item supersedes the previous one.
/// Dropping the stream releases the subscription.
pub type SnapshotStream = BoxStream<'static, Result<Vec<Document>, StoreError>>;

/// Document store trait.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Open a standing query. The first item is the current result set.
    async fn subscribe(
        &self,
        collection: &str,
        filter: FieldFilter,
    ) -> Result<SnapshotStream, StoreError>;

    /// Fetch one document by id. `None` when it does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Insert a document and return the id the backend assigned to it.
    async fn insert(&self, collection: &str, data: Value) -> Result<String, StoreError>;

    /// Replace the data of an existing document.
    async fn update(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError>;

    /// Delete a document by id.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}
