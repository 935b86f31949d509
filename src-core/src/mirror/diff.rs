//! Snapshot Diffing
//!
//! Compares two snapshots of one collection by document id so unchanged
//! snapshots are not republished.

use std::collections::HashMap;
use crate::domain::Entity;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    pub added: Vec<String>,
    pub changed: Vec<String>,
    pub removed: Vec<String>,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.removed.is_empty()
    }
}

pub fn diff_snapshots<T: Entity>(previous: &[T], next: &[T]) -> SnapshotDiff {
    let before: HashMap<&str, &T> = previous.iter().map(|e| (e.id(), e)).collect();
    let after: HashMap<&str, &T> = next.iter().map(|e| (e.id(), e)).collect();

    let mut diff = SnapshotDiff::default();
    for entity in next {
        match before.get(entity.id()) {
            None => diff.added.push(entity.id().to_string()),
            Some(old) if *old != entity => diff.changed.push(entity.id().to_string()),
            Some(_) => {}
        }
    }
    for entity in previous {
        if !after.contains_key(entity.id()) {
            diff.removed.push(entity.id().to_string());
        }
    }
    diff
}
