//! In-Memory Document Store
//!
//! Process-local implementation of `DocumentStore`, used by tests and
//! the offline mode.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::{broadcast, RwLock};

use super::traits::{BackendResult, ChangeEvent, DocumentStore, FieldFilter};

const CHANGE_CAPACITY: usize = 256;

pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
    changes: broadcast::Sender<ChangeEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            collections: RwLock::new(HashMap::new()),
            changes,
        }
    }

    /// Number of documents in a collection, regardless of team
    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    fn notify(&self, event: ChangeEvent) {
        // No receivers is fine: nothing is mirrored yet
        let _ = self.changes.send(event);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> BackendResult<Option<Value>> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|docs| docs.get(id)).cloned())
    }

    async fn set(&self, collection: &str, id: &str, doc: Value) -> BackendResult<()> {
        let event = {
            let mut collections = self.collections.write().await;
            let docs = collections.entry(collection.to_string()).or_default();
            let before = docs.insert(id.to_string(), doc.clone());
            ChangeEvent::new(collection, id, before.as_ref(), Some(&doc))
        };
        self.notify(event);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> BackendResult<()> {
        let removed = {
            let mut collections = self.collections.write().await;
            collections.get_mut(collection).and_then(|docs| docs.remove(id))
        };
        if let Some(before) = removed {
            self.notify(ChangeEvent::new(collection, id, Some(&before), None));
        }
        Ok(())
    }

    async fn query(&self, collection: &str, filter: &FieldFilter) -> BackendResult<Vec<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.values().filter(|doc| filter.matches(doc)).cloned().collect())
            .unwrap_or_default())
    }

    fn changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }
}
