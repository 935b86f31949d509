//! Collection Mirror
//!
//! Keeps one team-scoped collection in memory. A background task reloads
//! the whole collection on every relevant change notification and
//! publishes the decoded list through a `watch` channel.

use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::backend::{DocumentStore, FieldFilter};
use crate::domain::Entity;
use super::diff::diff_snapshots;

/// Live, wholesale-replaced copy of one collection for one team.
/// Dropping the mirror cancels its subscription task.
pub struct CollectionMirror<T: Entity> {
    rx: watch::Receiver<Vec<T>>,
    task: JoinHandle<()>,
}

impl<T: Entity> CollectionMirror<T> {
    /// Start mirroring. Must be called inside a tokio runtime.
    pub fn start(store: Arc<dyn DocumentStore>, team_code: &str) -> Self {
        let (tx, rx) = watch::channel(Vec::new());
        let task = tokio::spawn(run_mirror(store, team_code.to_string(), tx));
        Self { rx, task }
    }

    /// Current snapshot
    pub fn current(&self) -> Vec<T> {
        self.rx.borrow().clone()
    }

    pub fn find(&self, id: &str) -> Option<T> {
        self.rx.borrow().iter().find(|e| e.id() == id).cloned()
    }

    /// Receiver notified on every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<Vec<T>> {
        self.rx.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl<T: Entity> Drop for CollectionMirror<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Decode every document, skipping the ones that do not fit the schema
async fn load<T: Entity>(store: &dyn DocumentStore, team_code: &str) -> Result<Vec<T>, String> {
    let docs = store
        .query(T::COLLECTION, &FieldFilter::team(team_code))
        .await
        .map_err(|e| e.to_string())?;

    let mut entities = Vec::with_capacity(docs.len());
    for doc in docs {
        match serde_json::from_value::<T>(doc) {
            Ok(entity) => entities.push(entity),
            Err(e) => log::warn!("Skipping undecodable {} document: {}", T::COLLECTION, e),
        }
    }
    Ok(entities)
}

async fn run_mirror<T: Entity>(
    store: Arc<dyn DocumentStore>,
    team_code: String,
    tx: watch::Sender<Vec<T>>,
) {
    // Subscribe before the first read so no change slips between them
    let mut changes = store.changes();
    let mut first_load = true;

    loop {
        match load::<T>(store.as_ref(), &team_code).await {
            Ok(next) => {
                let diff = diff_snapshots(&tx.borrow(), &next);
                if first_load || !diff.is_empty() {
                    log::debug!(
                        "{} mirror for {}: +{} ~{} -{}",
                        T::COLLECTION,
                        team_code,
                        diff.added.len(),
                        diff.changed.len(),
                        diff.removed.len()
                    );
                    tx.send_replace(next);
                }
                first_load = false;
            }
            Err(e) => log::warn!("{} mirror failed to load: {}", T::COLLECTION, e),
        }

        loop {
            match changes.recv().await {
                Ok(event) if event.touches(T::COLLECTION, &team_code) => break,
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("{} mirror lagged by {} events, reloading", T::COLLECTION, skipped);
                    break;
                }
                Err(RecvError::Closed) => return,
            }
        }
    }
}
