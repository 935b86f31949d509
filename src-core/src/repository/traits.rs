//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces for data access.
//! Each call maps to a single backend operation except the bulk
//! `replace_*` helpers, which are a delete pass followed by inserts.

use async_trait::async_trait;
use crate::domain::{DomainResult, Entity};

/// Core repository trait for CRUD operations
///
/// Generic over any Entity type.
/// All operations are async to support various backends.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Create a new entity, generating its id
    async fn create(&self, entity: &T) -> DomainResult<T>;

    /// Find entity by ID
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<T>>;

    /// List all entities in scope
    async fn list(&self) -> DomainResult<Vec<T>>;

    /// Overwrite an existing entity
    async fn update(&self, entity: &T) -> DomainResult<T>;

    /// Delete entity by ID
    async fn delete(&self, id: &str) -> DomainResult<()>;
}

/// Extension for repositories bound to one team
#[async_trait]
pub trait TeamRepository<T: Entity>: Repository<T> {
    /// Upsert: create when the id is empty, overwrite otherwise
    async fn save(&self, entity: T) -> DomainResult<T>;

    /// Delete every entity of the team matching the predicate, then insert
    /// the replacements one by one. Not atomic: an insert failure leaves
    /// the earlier deletes and inserts in place.
    async fn replace_where<F>(&self, matches: F, entities: Vec<T>) -> DomainResult<Vec<T>>
    where
        F: Fn(&T) -> bool + Send + Sync;

    /// Delete the whole team collection, then insert the replacements
    async fn replace_all(&self, entities: Vec<T>) -> DomainResult<Vec<T>> {
        self.replace_where(|_| true, entities).await
    }
}
