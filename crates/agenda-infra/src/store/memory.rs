//! In-memory document store with push subscriptions.
//!
//! Works within a single process only. Every write broadcasts the name of the
//! touched collection; each subscriber re-runs its own query and pushes the
//! full result set when it differs from the last one it delivered.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use agenda_core::StoreError;
use agenda_core::ports::{Document, DocumentStore, FieldFilter, SnapshotStream};

/// In-memory store configuration.
#[derive(Debug, Clone)]
pub struct InMemoryStoreConfig {
    /// Change notifications buffered per subscriber before it lags.
    pub buffer_size: usize,
}

impl Default for InMemoryStoreConfig {
    fn default() -> Self {
        Self { buffer_size: 100 }
    }
}

impl InMemoryStoreConfig {
    pub fn from_env() -> Self {
        Self {
            buffer_size: std::env::var("STORE_BUFFER_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|size| *size > 0)
                .unwrap_or(100),
        }
    }
}

struct Inner {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    changes: broadcast::Sender<String>,
}

impl Inner {
    async fn query(&self, collection: &str, filter: &FieldFilter) -> Vec<Document> {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| filter.matches(&doc.data))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn notify(&self, collection: &str) {
        // Ignore send errors (no subscribers)
        let _ = self.changes.send(collection.to_string());
    }
}

/// Collections kept as insertion-ordered vectors.
#[derive(Clone)]
pub struct InMemoryDocumentStore {
    inner: Arc<Inner>,
}

impl InMemoryDocumentStore {
    pub fn new(config: InMemoryStoreConfig) -> Self {
        let (changes, _) = broadcast::channel(config.buffer_size.max(1));
        Self {
            inner: Arc::new(Inner {
                collections: RwLock::new(HashMap::new()),
                changes,
            }),
        }
    }

    pub fn from_env() -> Self {
        Self::new(InMemoryStoreConfig::from_env())
    }

    pub async fn document_count(&self, collection: &str) -> usize {
        self.inner
            .collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }

    /// Number of open subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.changes.receiver_count()
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new(InMemoryStoreConfig::default())
    }
}

struct SubscriptionState {
    inner: Arc<Inner>,
    receiver: broadcast::Receiver<String>,
    collection: String,
    filter: FieldFilter,
    last: Option<Vec<Document>>,
}

impl SubscriptionState {
    /// Wait until the result set changes. `None` once the store is gone.
    async fn next_snapshot(&mut self) -> Option<Vec<Document>> {
        if self.last.is_none() {
            let initial = self.inner.query(&self.collection, &self.filter).await;
            self.last = Some(initial.clone());
            return Some(initial);
        }

        loop {
            match self.receiver.recv().await {
                Ok(changed) if changed == self.collection => {}
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    // Snapshots are full result sets, so skipped notices are harmless.
                    tracing::warn!(
                        collection = %self.collection,
                        lagged = count,
                        "Subscriber lagged behind"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }

            let docs = self.inner.query(&self.collection, &self.filter).await;
            if self.last.as_ref() != Some(&docs) {
                self.last = Some(docs.clone());
                return Some(docs);
            }
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn subscribe(
        &self,
        collection: &str,
        filter: FieldFilter,
    ) -> Result<SnapshotStream, StoreError> {
        // Subscribe before the initial query so no write slips between them.
        let state = SubscriptionState {
            inner: self.inner.clone(),
            receiver: self.inner.changes.subscribe(),
            collection: collection.to_string(),
            filter,
            last: None,
        };
        tracing::info!(collection = %collection, "Subscribed to collection");

        let stream = futures::stream::unfold(state, |mut state| async move {
            state
                .next_snapshot()
                .await
                .map(|docs| (Ok::<_, StoreError>(docs), state))
        });
        Ok(stream.boxed())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self
            .inner
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| doc.id == id))
            .cloned())
    }

    async fn insert(&self, collection: &str, data: Value) -> Result<String, StoreError> {
        if !data.is_object() {
            return Err(StoreError::Rejected(
                "document data must be a JSON object".to_string(),
            ));
        }

        let id = Uuid::new_v4().simple().to_string();
        self.inner
            .collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(Document::new(id.clone(), data));

        self.inner.notify(collection);
        tracing::debug!(collection = %collection, id = %id, "Document inserted");
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError> {
        if !data.is_object() {
            return Err(StoreError::Rejected(
                "document data must be a JSON object".to_string(),
            ));
        }

        {
            let mut collections = self.inner.collections.write().await;
            let doc = collections
                .get_mut(collection)
                .and_then(|docs| docs.iter_mut().find(|doc| doc.id == id))
                .ok_or_else(|| StoreError::NotFound(format!("{collection}/{id}")))?;
            doc.data = data;
        }

        self.inner.notify(collection);
        tracing::debug!(collection = %collection, id = %id, "Document updated");
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let removed = {
            let mut collections = self.inner.collections.write().await;
            collections.get_mut(collection).is_some_and(|docs| {
                let before = docs.len();
                docs.retain(|doc| doc.id != id);
                docs.len() != before
            })
        };

        if removed {
            self.inner.notify(collection);
            tracing::debug!(collection = %collection, id = %id, "Document deleted");
        } else {
            tracing::debug!(collection = %collection, id = %id, "Delete of missing document");
        }
        Ok(())
    }
}
