//! Live, per-user event list backed by a document store subscription.
//!
//! The list is never patched locally. Writes go to the store and the visible
//! snapshot only changes when the store pushes its next result set, so a
//! freshly added event may be missing for a moment.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::{Event, EventDraft, EventRecord};
use crate::error::{StoreError, SyncWriteError};
use crate::ports::{Document, DocumentStore, FieldFilter, IdentityProvider};

/// Collection used when none is configured.
pub const DEFAULT_COLLECTION: &str = "events";

struct Subscription {
    owner_id: String,
    task: JoinHandle<()>,
}

/// Keeps the signed-in user's events in sync with the document store.
pub struct EventListSync {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn DocumentStore>,
    collection: String,
    snapshot: watch::Sender<Vec<Event>>,
    write_error: watch::Sender<Option<SyncWriteError>>,
    subscription: Mutex<Option<Subscription>>,
    /// Bumped on every start and stop. A task only publishes for its own generation.
    generation: Arc<AtomicU64>,
}

impl EventListSync {
    pub fn new(identity: Arc<dyn IdentityProvider>, store: Arc<dyn DocumentStore>) -> Self {
        Self::with_collection(identity, store, DEFAULT_COLLECTION)
    }

    pub fn with_collection(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn DocumentStore>,
        collection: impl Into<String>,
    ) -> Self {
        let (snapshot, _) = watch::channel(Vec::new());
        let (write_error, _) = watch::channel(None);
        Self {
            identity,
            store,
            collection: collection.into(),
            snapshot,
            write_error,
            subscription: Mutex::new(None),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Event>> {
        self.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> Vec<Event> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe_write_errors(&self) -> watch::Receiver<Option<SyncWriteError>> {
        self.write_error.subscribe()
    }

    pub fn last_write_error(&self) -> Option<SyncWriteError> {
        self.write_error.borrow().clone()
    }

    /// Owner of the running subscription, `None` while unsubscribed.
    pub fn owner(&self) -> Option<String> {
        self.lock_subscription()
            .as_ref()
            .map(|sub| sub.owner_id.clone())
    }

    /// Subscribe to `owner_id`'s events, replacing any running subscription.
    pub async fn start(&self, owner_id: &str) -> Result<(), StoreError> {
        let filter = FieldFilter::eq(EventRecord::OWNER_FIELD, owner_id);
        let mut stream = self.store.subscribe(&self.collection, filter).await?;

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = self.lock_subscription().take() {
            previous.task.abort();
            if previous.owner_id != owner_id {
                // Never show the previous owner's events under the new owner.
                self.snapshot.send_replace(Vec::new());
            }
            tracing::debug!(owner_id = %previous.owner_id, "Replaced event subscription");
        }

        let snapshot = self.snapshot.clone();
        let current = self.generation.clone();
        let owner = owner_id.to_string();
        let collection = self.collection.clone();
        let task = tokio::spawn(async move {
            while let Some(item) = stream.next().await {
                match item {
                    Ok(documents) => {
                        let events = remap(&documents);
                        tracing::debug!(
                            owner_id = %owner,
                            documents = documents.len(),
                            events = events.len(),
                            "Event snapshot received"
                        );
                        let published = snapshot.send_if_modified(|visible| {
                            if current.load(Ordering::SeqCst) != generation {
                                return false;
                            }
                            *visible = events;
                            true
                        });
                        if !published {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!(owner_id = %owner, collection = %collection, error = %e, "Subscription error");
                    }
                }
            }
            tracing::info!(owner_id = %owner, "Event subscription ended");
        });

        *self.lock_subscription() = Some(Subscription {
            owner_id: owner_id.to_string(),
            task,
        });

        tracing::info!(owner_id = %owner_id, collection = %self.collection, "Subscribed to events");
        Ok(())
    }

    /// Start for whoever is signed in. Returns `false` when nobody is.
    pub async fn start_for_current_user(&self) -> Result<bool, StoreError> {
        match self.identity.current_user().await {
            Some(user) => {
                self.start(&user.id).await?;
                Ok(true)
            }
            None => {
                tracing::debug!("No signed-in user, event subscription not started");
                Ok(false)
            }
        }
    }

    /// Release the subscription and forget the current snapshot.
    pub fn stop(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(sub) = self.lock_subscription().take() {
            sub.task.abort();
            tracing::info!(owner_id = %sub.owner_id, "Unsubscribed from events");
        }
        self.snapshot.send_replace(Vec::new());
    }

    /// Create an event for the signed-in user.
    ///
    /// Returns the new id, or `None` without touching the store when nobody is
    /// signed in. The snapshot picks the event up from the next push.
    pub async fn add(&self, draft: EventDraft) -> Result<Option<String>, SyncWriteError> {
        let Some(user) = self.identity.current_user().await else {
            tracing::debug!("Ignoring add, no signed-in user");
            return Ok(None);
        };

        let result = self
            .insert_record(&user.id, draft)
            .await
            .map_err(|source| SyncWriteError::Create { source });

        let id = self.record_write(result)?;
        tracing::debug!(event_id = %id, owner_id = %user.id, "Event created");
        Ok(Some(id))
    }

    /// Replace an existing event's fields in place. Ownership does not change.
    ///
    /// Returns `false` without touching the store when nobody is signed in.
    /// Events owned by another user are rejected.
    pub async fn update(&self, event_id: &str, draft: EventDraft) -> Result<bool, SyncWriteError> {
        let Some(user) = self.identity.current_user().await else {
            tracing::debug!(event_id = %event_id, "Ignoring update, no signed-in user");
            return Ok(false);
        };

        let result = self
            .update_record(&user.id, event_id, draft)
            .await
            .map_err(|source| SyncWriteError::Update {
                id: event_id.to_string(),
                source,
            });

        self.record_write(result)?;
        tracing::debug!(event_id = %event_id, "Event updated");
        Ok(true)
    }

    /// Delete one of the signed-in user's events.
    ///
    /// Returns `false` without touching the store when nobody is signed in.
    /// Deleting an id that no longer exists succeeds.
    pub async fn delete(&self, event_id: &str) -> Result<bool, SyncWriteError> {
        let Some(user) = self.identity.current_user().await else {
            tracing::debug!(event_id = %event_id, "Ignoring delete, no signed-in user");
            return Ok(false);
        };

        let result = self
            .delete_record(&user.id, event_id)
            .await
            .map_err(|source| SyncWriteError::Delete {
                id: event_id.to_string(),
                source,
            });

        self.record_write(result)?;
        tracing::debug!(event_id = %event_id, "Event deleted");
        Ok(true)
    }

    async fn insert_record(&self, owner_id: &str, draft: EventDraft) -> Result<String, StoreError> {
        let data = EventRecord::new(owner_id, draft).to_value()?;
        self.store.insert(&self.collection, data).await
    }

    async fn update_record(
        &self,
        owner_id: &str,
        event_id: &str,
        draft: EventDraft,
    ) -> Result<(), StoreError> {
        self.owned_document(owner_id, event_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("{}/{event_id}", self.collection)))?;
        let data = EventRecord::new(owner_id, draft).to_value()?;
        self.store.update(&self.collection, event_id, data).await
    }

    async fn delete_record(&self, owner_id: &str, event_id: &str) -> Result<(), StoreError> {
        if self.owned_document(owner_id, event_id).await?.is_some() {
            self.store.delete(&self.collection, event_id).await?;
        }
        Ok(())
    }

    /// Fetch `event_id`, rejecting it when it belongs to someone other than `owner_id`.
    async fn owned_document(
        &self,
        owner_id: &str,
        event_id: &str,
    ) -> Result<Option<Document>, StoreError> {
        let Some(document) = self.store.get(&self.collection, event_id).await? else {
            return Ok(None);
        };
        if !FieldFilter::eq(EventRecord::OWNER_FIELD, owner_id).matches(&document.data) {
            tracing::warn!(event_id = %event_id, owner_id = %owner_id, "Refusing to write another user's event");
            return Err(StoreError::Rejected(format!(
                "event {event_id} belongs to another user"
            )));
        }
        Ok(Some(document))
    }

    fn record_write<T>(&self, result: Result<T, SyncWriteError>) -> Result<T, SyncWriteError> {
        match result {
            Ok(value) => {
                self.write_error.send_if_modified(|current| current.take().is_some());
                Ok(value)
            }
            Err(e) => {
                tracing::error!(error = %e, collection = %self.collection, "Event write failed");
                self.write_error.send_replace(Some(e.clone()));
                Err(e)
            }
        }
    }

    fn lock_subscription(&self) -> std::sync::MutexGuard<'_, Option<Subscription>> {
        self.subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for EventListSync {
    fn drop(&mut self) {
        if let Some(sub) = self.lock_subscription().take() {
            sub.task.abort();
        }
    }
}

fn remap(documents: &[Document]) -> Vec<Event> {
    documents
        .iter()
        .filter_map(|doc| match Event::from_document(doc) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!(document_id = %doc.id, error = %e, "Skipping malformed event document");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::{Value, json};
    use tokio::sync::mpsc;

    use crate::domain::User;
    use crate::ports::{IdentityError, SnapshotStream};

    struct FakeIdentity {
        user: tokio::sync::Mutex<Option<User>>,
    }

    impl FakeIdentity {
        fn signed_in(id: &str) -> Self {
            Self {
                user: tokio::sync::Mutex::new(Some(User::new(id, format!("{id}@example.com")))),
            }
        }

        fn signed_out() -> Self {
            Self {
                user: tokio::sync::Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for FakeIdentity {
        async fn sign_in(&self, _: &str, _: &str) -> Result<User, IdentityError> {
            Err(IdentityError::InvalidCredentials)
        }

        async fn sign_up(&self, _: &str, _: &str) -> Result<User, IdentityError> {
            Err(IdentityError::InvalidCredentials)
        }

        async fn sign_out(&self) -> Result<(), IdentityError> {
            *self.user.lock().await = None;
            Ok(())
        }

        async fn current_user(&self) -> Option<User> {
            self.user.lock().await.clone()
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Subscribe(String, FieldFilter),
        Insert(Value),
        Update(String, Value),
        Delete(String),
    }

    /// Records calls; pushes are driven by the test through `push`.
    #[derive(Default)]
    struct FakeStore {
        calls: std::sync::Mutex<Vec<Call>>,
        feed: std::sync::Mutex<Option<mpsc::UnboundedSender<Result<Vec<Document>, StoreError>>>>,
        stored: std::sync::Mutex<Vec<Document>>,
        fail_writes: bool,
    }

    impl FakeStore {
        fn failing() -> Self {
            Self {
                fail_writes: true,
                ..Self::default()
            }
        }

        /// Documents answered by `get`. Subscriptions still only see `push`.
        fn seed(self, documents: Vec<Document>) -> Self {
            *self.stored.lock().unwrap() = documents;
            self
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn push(&self, documents: Vec<Document>) {
            let feed = self.feed.lock().unwrap();
            feed.as_ref().unwrap().send(Ok(documents)).unwrap();
        }

        fn feed(&self) -> mpsc::UnboundedSender<Result<Vec<Document>, StoreError>> {
            self.feed.lock().unwrap().clone().unwrap()
        }

        fn write(&self, call: Call) -> Result<(), StoreError> {
            self.calls.lock().unwrap().push(call);
            if self.fail_writes {
                Err(StoreError::Rejected("permission denied".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl DocumentStore for FakeStore {
        async fn subscribe(
            &self,
            collection: &str,
            filter: FieldFilter,
        ) -> Result<SnapshotStream, StoreError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Subscribe(collection.to_string(), filter));
            let (tx, rx) = mpsc::unbounded_channel();
            *self.feed.lock().unwrap() = Some(tx);
            let stream = futures::stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|item| (item, rx))
            });
            Ok(stream.boxed())
        }

        async fn get(&self, _collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
            Ok(self.stored.lock().unwrap().iter().find(|d| d.id == id).cloned())
        }

        async fn insert(&self, _collection: &str, data: Value) -> Result<String, StoreError> {
            self.write(Call::Insert(data))?;
            Ok("new-id".to_string())
        }

        async fn update(&self, _collection: &str, id: &str, data: Value) -> Result<(), StoreError> {
            self.write(Call::Update(id.to_string(), data))
        }

        async fn delete(&self, _collection: &str, id: &str) -> Result<(), StoreError> {
            self.write(Call::Delete(id.to_string()))
        }
    }

    fn doc(id: &str, owner: &str, title: &str, date: &str) -> Document {
        Document::new(
            id,
            json!({"userId": owner, "title": title, "date": date, "description": ""}),
        )
    }

    fn setup(identity: FakeIdentity, store: FakeStore) -> (Arc<FakeStore>, EventListSync) {
        let store = Arc::new(store);
        let sync = EventListSync::new(Arc::new(identity), store.clone());
        (store, sync)
    }

    async fn wait_len(rx: &mut watch::Receiver<Vec<Event>>, len: usize) -> Vec<Event> {
        tokio::time::timeout(Duration::from_secs(1), rx.wait_for(|events| events.len() == len))
            .await
            .unwrap()
            .unwrap()
            .clone()
    }

    #[tokio::test]
    async fn test_start_subscribes_with_owner_filter() {
        let (store, sync) = setup(FakeIdentity::signed_in("u1"), FakeStore::default());

        sync.start("u1").await.unwrap();

        assert_eq!(sync.owner().as_deref(), Some("u1"));
        assert_eq!(
            store.calls(),
            vec![Call::Subscribe(
                "events".to_string(),
                FieldFilter::eq("userId", "u1")
            )]
        );
    }

    #[tokio::test]
    async fn test_push_replaces_snapshot_with_document_ids() {
        let (store, sync) = setup(FakeIdentity::signed_in("u1"), FakeStore::default());
        let mut rx = sync.subscribe();
        sync.start("u1").await.unwrap();

        store.push(vec![doc("e1", "u1", "X", "02/02/2025")]);
        let events = wait_len(&mut rx, 1).await;

        assert_eq!(events[0].id, "e1");
        assert_eq!(events[0].owner_id, "u1");
        assert_eq!(events[0].title, "X");
        assert_eq!(events[0].date, "02/02/2025");
    }

    #[tokio::test]
    async fn test_each_push_is_a_full_replacement() {
        let (store, sync) = setup(FakeIdentity::signed_in("u1"), FakeStore::default());
        let mut rx = sync.subscribe();
        sync.start("u1").await.unwrap();

        store.push(vec![
            doc("e1", "u1", "A", "01/01/2025"),
            doc("e2", "u1", "B", "02/01/2025"),
            doc("e3", "u1", "C", "03/01/2025"),
        ]);
        let first = wait_len(&mut rx, 3).await;
        assert!(first.iter().all(|e| e.owner_id == "u1"));
        assert_eq!(
            first.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
            vec!["e1", "e2", "e3"]
        );

        store.push(vec![doc("e3", "u1", "C", "03/01/2025")]);
        let second = wait_len(&mut rx, 1).await;
        assert_eq!(second[0].id, "e3");
    }

    #[tokio::test]
    async fn test_malformed_documents_are_skipped() {
        let (store, sync) = setup(FakeIdentity::signed_in("u1"), FakeStore::default());
        let mut rx = sync.subscribe();
        sync.start("u1").await.unwrap();

        store.push(vec![
            doc("e1", "u1", "A", "01/01/2025"),
            Document::new("bad", json!({"userId": "u1", "title": ["not", "text"]})),
        ]);
        let events = wait_len(&mut rx, 1).await;

        assert_eq!(events[0].id, "e1");
    }

    #[tokio::test]
    async fn test_subscription_errors_keep_last_snapshot() {
        let (store, sync) = setup(FakeIdentity::signed_in("u1"), FakeStore::default());
        let mut rx = sync.subscribe();
        sync.start("u1").await.unwrap();

        store.push(vec![doc("e1", "u1", "A", "01/01/2025")]);
        wait_len(&mut rx, 1).await;

        let feed = store.feed();
        feed.send(Err(StoreError::Connection("offline".to_string())))
            .unwrap();
        store.push(vec![
            doc("e1", "u1", "A", "01/01/2025"),
            doc("e2", "u1", "B", "01/01/2025"),
        ]);
        wait_len(&mut rx, 2).await;
    }

    #[tokio::test]
    async fn test_add_unauthenticated_makes_no_backend_call() {
        let (store, sync) = setup(FakeIdentity::signed_out(), FakeStore::default());

        let id = sync
            .add(EventDraft::new("Meeting", "01/01/2025", ""))
            .await
            .unwrap();

        assert_eq!(id, None);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_add_writes_owner_and_does_not_touch_snapshot() {
        let (store, sync) = setup(FakeIdentity::signed_in("u1"), FakeStore::default());
        sync.start("u1").await.unwrap();

        let id = sync
            .add(EventDraft::new("Meeting", "01/01/2025", "Room 4"))
            .await
            .unwrap();

        assert_eq!(id.as_deref(), Some("new-id"));
        assert_eq!(
            store.calls().last(),
            Some(&Call::Insert(json!({
                "userId": "u1",
                "title": "Meeting",
                "date": "01/01/2025",
                "description": "Room 4"
            })))
        );
        assert!(sync.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_update_uses_update_by_id() {
        let (store, sync) = setup(
            FakeIdentity::signed_in("u1"),
            FakeStore::default().seed(vec![doc("e1", "u1", "Old", "01/01/2025")]),
        );

        let updated = sync
            .update("e1", EventDraft::new("Renamed", "05/05/2025", ""))
            .await
            .unwrap();

        assert!(updated);
        let calls = store.calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(&calls[0], Call::Update(id, data) if id == "e1" && data["title"] == "Renamed"));
        assert!(!calls.iter().any(|c| matches!(c, Call::Insert(_))));
    }

    #[tokio::test]
    async fn test_update_of_missing_event_is_not_found() {
        let (store, sync) = setup(FakeIdentity::signed_in("u1"), FakeStore::default());

        let err = sync
            .update("gone", EventDraft::new("Renamed", "05/05/2025", ""))
            .await
            .unwrap_err();

        assert!(matches!(err.source_error(), StoreError::NotFound(_)));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_writes_to_another_users_event_are_rejected() {
        let (store, sync) = setup(
            FakeIdentity::signed_in("u1"),
            FakeStore::default().seed(vec![doc("e2", "u2", "Theirs", "01/01/2025")]),
        );

        let update = sync
            .update("e2", EventDraft::new("Mine now", "05/05/2025", ""))
            .await
            .unwrap_err();
        assert!(matches!(&update, SyncWriteError::Update { id, .. } if id == "e2"));
        assert!(matches!(update.source_error(), StoreError::Rejected(_)));

        let delete = sync.delete("e2").await.unwrap_err();
        assert!(matches!(delete.source_error(), StoreError::Rejected(_)));

        assert!(store.calls().is_empty());
        assert_eq!(sync.last_write_error(), Some(delete));
    }

    #[tokio::test]
    async fn test_update_unauthenticated_is_noop() {
        let (store, sync) = setup(FakeIdentity::signed_out(), FakeStore::default());

        let updated = sync
            .update("e1", EventDraft::new("Renamed", "05/05/2025", ""))
            .await
            .unwrap();

        assert!(!updated);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_by_id() {
        let (store, sync) = setup(
            FakeIdentity::signed_in("u1"),
            FakeStore::default().seed(vec![doc("e9", "u1", "A", "01/01/2025")]),
        );

        assert!(sync.delete("e9").await.unwrap());

        assert_eq!(store.calls(), vec![Call::Delete("e9".to_string())]);
    }

    #[tokio::test]
    async fn test_delete_missing_or_unauthenticated_skips_store() {
        let (store, sync) = setup(FakeIdentity::signed_in("u1"), FakeStore::default());
        assert!(sync.delete("gone").await.unwrap());
        assert!(store.calls().is_empty());

        let (store, sync) = setup(FakeIdentity::signed_out(), FakeStore::default());
        assert!(!sync.delete("e1").await.unwrap());
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_write_errors_are_returned_and_published() {
        let (_store, sync) = setup(
            FakeIdentity::signed_in("u1"),
            FakeStore::failing().seed(vec![doc("e1", "u1", "A", "01/01/2025")]),
        );
        let mut errors = sync.subscribe_write_errors();

        let err = sync.delete("e1").await.unwrap_err();

        assert!(matches!(&err, SyncWriteError::Delete { id, .. } if id == "e1"));
        assert_eq!(
            err.source_error(),
            &StoreError::Rejected("permission denied".to_string())
        );
        assert!(errors.has_changed().unwrap());
        assert_eq!(*errors.borrow_and_update(), Some(err));

        let add_err = sync
            .add(EventDraft::new("Meeting", "01/01/2025", ""))
            .await
            .unwrap_err();
        assert!(matches!(add_err, SyncWriteError::Create { .. }));
        assert_eq!(sync.last_write_error(), Some(add_err));
    }

    #[tokio::test]
    async fn test_successful_write_clears_error() {
        let (_store, sync) = setup(FakeIdentity::signed_in("u1"), FakeStore::default());
        sync.write_error
            .send_replace(Some(SyncWriteError::Create {
                source: StoreError::Connection("offline".to_string()),
            }));

        sync.delete("e1").await.unwrap();

        assert_eq!(sync.last_write_error(), None);
    }

    #[tokio::test]
    async fn test_stop_releases_subscription_and_clears_snapshot() {
        let (store, sync) = setup(FakeIdentity::signed_in("u1"), FakeStore::default());
        let mut rx = sync.subscribe();
        sync.start("u1").await.unwrap();
        store.push(vec![doc("e1", "u1", "A", "01/01/2025")]);
        wait_len(&mut rx, 1).await;

        let feed = store.feed();
        sync.stop();

        tokio::time::timeout(Duration::from_secs(1), feed.closed())
            .await
            .unwrap();
        assert!(sync.snapshot().is_empty());
        assert_eq!(sync.owner(), None);
    }

    #[tokio::test]
    async fn test_drop_releases_subscription() {
        let (store, sync) = setup(FakeIdentity::signed_in("u1"), FakeStore::default());
        sync.start("u1").await.unwrap();
        let feed = store.feed();

        drop(sync);

        tokio::time::timeout(Duration::from_secs(1), feed.closed())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_start_for_current_user() {
        let (store, sync) = setup(FakeIdentity::signed_out(), FakeStore::default());
        assert!(!sync.start_for_current_user().await.unwrap());
        assert!(store.calls().is_empty());

        let (_, sync) = setup(FakeIdentity::signed_in("u7"), FakeStore::default());
        assert!(sync.start_for_current_user().await.unwrap());
        assert_eq!(sync.owner().as_deref(), Some("u7"));
    }

    #[tokio::test]
    async fn test_restart_replaces_previous_subscription() {
        let (store, sync) = setup(FakeIdentity::signed_in("u1"), FakeStore::default());
        sync.start("u1").await.unwrap();
        let first_feed = store.feed();

        sync.start("u2").await.unwrap();

        tokio::time::timeout(Duration::from_secs(1), first_feed.closed())
            .await
            .unwrap();
        assert_eq!(sync.owner().as_deref(), Some("u2"));
    }

    #[tokio::test]
    async fn test_switching_owner_clears_previous_owners_events() {
        let (store, sync) = setup(FakeIdentity::signed_in("u1"), FakeStore::default());
        let mut rx = sync.subscribe();
        sync.start("u1").await.unwrap();
        store.push(vec![doc("e1", "u1", "A", "01/01/2025")]);
        wait_len(&mut rx, 1).await;

        sync.start("u2").await.unwrap();

        assert_eq!(sync.owner().as_deref(), Some("u2"));
        assert!(sync.snapshot().is_empty());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(sync.snapshot().iter().all(|e| e.owner_id == "u2"));

        store.push(vec![doc("e2", "u2", "B", "01/01/2025")]);
        let events = wait_len(&mut rx, 1).await;
        assert_eq!(events[0].id, "e2");
    }

    #[tokio::test]
    async fn test_restart_for_same_owner_keeps_snapshot() {
        let (store, sync) = setup(FakeIdentity::signed_in("u1"), FakeStore::default());
        let mut rx = sync.subscribe();
        sync.start("u1").await.unwrap();
        store.push(vec![doc("e1", "u1", "A", "01/01/2025")]);
        wait_len(&mut rx, 1).await;

        sync.start("u1").await.unwrap();

        assert_eq!(sync.snapshot().len(), 1);
    }
}
