//! In-memory resource store.
//!
//! Writes are staged and only become visible to reads on `persist`, so it
//! behaves like a unit-of-work store at the commit boundary.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use crate::resource::{Document, Queryable, Resource};

use super::store::{ResourceStore, StoreError, StoreResult};

type KeyGenerator<K> = Box<dyn Fn() -> K + Send + Sync>;

enum PendingWrite<T: Resource> {
    Insert(T),
    Replace(T),
    Remove(T::Key),
}

/// In-memory store with a staged write buffer
pub struct InMemoryStore<T: Resource> {
    committed: RwLock<Vec<T>>,
    pending: Mutex<Vec<PendingWrite<T>>>,
    next_key: KeyGenerator<T::Key>,
    commits: AtomicUsize,
}

impl<T: Resource> InMemoryStore<T> {
    /// Create an empty store; `next_key` generates keys for new entities
    pub fn new(next_key: impl Fn() -> T::Key + Send + Sync + 'static) -> Self {
        Self {
            committed: RwLock::new(Vec::new()),
            pending: Mutex::new(Vec::new()),
            next_key: Box::new(next_key),
            commits: AtomicUsize::new(0),
        }
    }

    /// Seed committed entities (entities without a key get one)
    pub fn with_entities(self, entities: Vec<T>) -> Self {
        let seeded: Vec<T> = entities
            .into_iter()
            .map(|e| match e.key() {
                Some(_) => e,
                None => e.with_key((self.next_key)()),
            })
            .collect();
        Self {
            committed: RwLock::new(seeded),
            ..self
        }
    }

    /// Snapshot of committed entities in insertion order
    pub fn committed(&self) -> StoreResult<Vec<T>> {
        let rows = self.committed.read().map_err(|_| poisoned())?;
        Ok(rows.clone())
    }

    /// Number of staged, not yet persisted writes
    pub fn pending_writes(&self) -> StoreResult<usize> {
        let pending = self.pending.lock().map_err(|_| poisoned())?;
        Ok(pending.len())
    }

    /// Number of successful `persist` calls
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    /// Drop staged writes
    pub fn discard(&self) -> StoreResult<()> {
        self.pending.lock().map_err(|_| poisoned())?.clear();
        Ok(())
    }

    /// Remove a committed entity directly, as another writer would
    pub fn remove_committed(&self, key: &T::Key) -> StoreResult<bool> {
        let mut rows = self.committed.write().map_err(|_| poisoned())?;
        let before = rows.len();
        rows.retain(|e| e.key().as_ref() != Some(key));
        Ok(rows.len() != before)
    }

    /// Committed entities with staged writes applied
    fn working_view(&self) -> StoreResult<Vec<T>> {
        let mut rows = self.committed()?;
        let pending = self.pending.lock().map_err(|_| poisoned())?;
        for write in pending.iter() {
            apply_write(&mut rows, write);
        }
        Ok(rows)
    }

    fn contains(&self, key: &T::Key) -> StoreResult<bool> {
        Ok(self
            .working_view()?
            .iter()
            .any(|e| e.key().as_ref() == Some(key)))
    }

    fn stage(&self, write: PendingWrite<T>) -> StoreResult<()> {
        self.pending.lock().map_err(|_| poisoned())?.push(write);
        Ok(())
    }
}

impl InMemoryStore<Document> {
    /// Document store keyed by random UUIDs
    pub fn documents() -> Self {
        Self::new(|| Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl<T: Resource> ResourceStore<T> for InMemoryStore<T> {
    async fn queryable(&self) -> StoreResult<Queryable<T>> {
        Ok(Queryable::new(self.committed()?))
    }

    async fn create(&self, entity: T) -> StoreResult<T> {
        let key = entity.key().unwrap_or_else(|| (self.next_key)());
        if self.contains(&key)? {
            return Err(StoreError::conflict(format!("key {} already exists", key)));
        }

        let entity = entity.with_key(key);
        self.stage(PendingWrite::Insert(entity.clone()))?;
        Ok(entity)
    }

    async fn update(&self, entity: T) -> StoreResult<T> {
        let key = entity
            .key()
            .ok_or_else(|| StoreError::conflict("cannot update an entity without a key"))?;
        if !self.contains(&key)? {
            return Err(StoreError::conflict(format!("key {} no longer exists", key)));
        }

        self.stage(PendingWrite::Replace(entity.clone()))?;
        Ok(entity)
    }

    async fn delete(&self, entity: &T) -> StoreResult<usize> {
        let Some(key) = entity.key() else {
            return Ok(0);
        };
        if !self.contains(&key)? {
            return Ok(0);
        }

        self.stage(PendingWrite::Remove(key))?;
        Ok(1)
    }

    async fn persist(&self) -> StoreResult<()> {
        let writes: Vec<PendingWrite<T>> = {
            let mut pending = self.pending.lock().map_err(|_| poisoned())?;
            pending.drain(..).collect()
        };

        let mut rows = self.committed.write().map_err(|_| poisoned())?;
        for write in &writes {
            apply_write(&mut rows, write);
        }
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn apply_write<T: Resource>(rows: &mut Vec<T>, write: &PendingWrite<T>) {
    match write {
        PendingWrite::Insert(entity) => rows.push(entity.clone()),
        PendingWrite::Replace(entity) => {
            let key = entity.key();
            if let Some(slot) = rows.iter_mut().find(|e| e.key() == key) {
                *slot = entity.clone();
            }
        }
        PendingWrite::Remove(key) => rows.retain(|e| e.key().as_ref() != Some(key)),
    }
}

fn poisoned() -> StoreError {
    StoreError::backend("Lock poisoned")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_writes_invisible_until_persist() {
        let store = InMemoryStore::documents();
        let created = store.create(Document::new(json!({"title": "x"}))).await.unwrap();
        assert!(created.id.is_some());

        assert!(store.queryable().await.unwrap().documents().unwrap().is_empty());
        assert_eq!(store.pending_writes().unwrap(), 1);

        store.persist().await.unwrap();
        assert_eq!(store.committed().unwrap(), vec![created]);
        assert_eq!(store.commit_count(), 1);
    }

    #[tokio::test]
    async fn test_create_with_existing_key_conflicts() {
        let store = InMemoryStore::documents()
            .with_entities(vec![Document::with_id("a", json!({}))]);
        let result = store.create(Document::with_id("a", json!({}))).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_missing_conflicts() {
        let store = InMemoryStore::documents();
        let result = store.update(Document::with_id("ghost", json!({}))).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delete_counts() {
        let store = InMemoryStore::documents()
            .with_entities(vec![Document::with_id("a", json!({}))]);
        let doc = Document::with_id("a", json!({}));

        assert_eq!(store.delete(&doc).await.unwrap(), 1);
        // Already staged for removal
        assert_eq!(store.delete(&doc).await.unwrap(), 0);

        store.persist().await.unwrap();
        assert!(store.committed().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_discard_drops_staged_writes() {
        let store = InMemoryStore::documents();
        store.create(Document::new(json!({}))).await.unwrap();
        store.discard().unwrap();
        store.persist().await.unwrap();
        assert!(store.committed().unwrap().is_empty());
    }

    #[test]
    fn test_seeding_assigns_missing_keys() {
        let store = InMemoryStore::documents().with_entities(vec![Document::new(json!({"a": 1}))]);
        assert!(store.committed().unwrap()[0].id.is_some());
    }
}
