//! Document Repository
//!
//! `DocumentStore`-backed implementation of the repository traits.
//! One generic type serves every entity kind: documents are JSON objects
//! encoded with serde and keyed by the entity id.

use async_trait::async_trait;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::backend::{BackendError, DocumentStore, FieldFilter, TEAM_CODE_FIELD};
use crate::domain::{DomainError, DomainResult, Entity};
use super::traits::{Repository, TeamRepository};

impl From<BackendError> for DomainError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::Auth(msg) => DomainError::PermissionDenied(msg),
            other => DomainError::Internal(other.to_string()),
        }
    }
}

/// Fresh document id
pub fn new_document_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn encode<T: Entity>(entity: &T) -> DomainResult<Value> {
    serde_json::to_value(entity).map_err(|e| DomainError::Internal(e.to_string()))
}

pub fn decode<T: Entity>(doc: Value) -> DomainResult<T> {
    serde_json::from_value(doc)
        .map_err(|e| DomainError::Internal(format!("Undecodable {} document: {}", T::COLLECTION, e)))
}

/// Repository over one collection, optionally scoped to a team
pub struct DocumentRepository<T: Entity> {
    store: Arc<dyn DocumentStore>,
    team_code: Option<String>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> DocumentRepository<T> {
    /// Repository limited to one team's documents
    pub fn for_team(store: Arc<dyn DocumentStore>, team_code: &str) -> Self {
        Self {
            store,
            team_code: Some(team_code.to_string()),
            _entity: PhantomData,
        }
    }

    /// Repository over the whole collection (users, teams)
    pub fn unscoped(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            team_code: None,
            _entity: PhantomData,
        }
    }

    pub fn team_code(&self) -> Option<&str> {
        self.team_code.as_deref()
    }

    /// A team-scoped repository never touches a stored document that
    /// belongs to another team
    async fn check_owner(&self, id: &str) -> DomainResult<()> {
        let Some(code) = &self.team_code else {
            return Ok(());
        };
        if id.is_empty() {
            return Ok(());
        }
        let Some(doc) = self.store.get(T::COLLECTION, id).await? else {
            return Ok(());
        };
        let owner = doc.get(TEAM_CODE_FIELD).and_then(Value::as_str);
        if owner != Some(code.as_str()) {
            log::warn!("Refused write to {} {} outside team {}", T::COLLECTION, id, code);
            return Err(DomainError::NotFound(format!("{} {}", T::COLLECTION, id)));
        }
        Ok(())
    }

    /// Write one entity as-is, stamping the team scope
    async fn write(&self, mut entity: T) -> DomainResult<T> {
        self.check_owner(entity.id()).await?;
        if let Some(code) = &self.team_code {
            entity.set_team_code(code.clone());
        }
        let doc = encode(&entity)?;
        self.store.set(T::COLLECTION, entity.id(), doc).await?;
        Ok(entity)
    }

    /// All documents matching an arbitrary field, within the team scope
    pub async fn find_where(&self, filter: &FieldFilter) -> DomainResult<Vec<T>> {
        let docs = self.store.query(T::COLLECTION, filter).await?;
        let mut entities = Vec::with_capacity(docs.len());
        for doc in docs {
            let entity: T = match serde_json::from_value(doc) {
                Ok(entity) => entity,
                Err(e) => {
                    log::warn!("Skipping undecodable {} document: {}", T::COLLECTION, e);
                    continue;
                }
            };
            let in_scope = match &self.team_code {
                Some(code) => entity.team_code() == Some(code.as_str()),
                None => true,
            };
            if in_scope {
                entities.push(entity);
            }
        }
        Ok(entities)
    }
}

impl<T: Entity> std::fmt::Debug for DocumentRepository<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentRepository")
            .field("collection", &T::COLLECTION)
            .field("team_code", &self.team_code)
            .finish()
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for DocumentRepository<T> {
    async fn create(&self, entity: &T) -> DomainResult<T> {
        let mut entity = entity.clone();
        entity.set_id(new_document_id());
        self.write(entity).await
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<T>> {
        let Some(doc) = self.store.get(T::COLLECTION, id).await? else {
            return Ok(None);
        };
        let entity: T = decode(doc)?;
        match &self.team_code {
            Some(code) if entity.team_code() != Some(code.as_str()) => Ok(None),
            _ => Ok(Some(entity)),
        }
    }

    async fn list(&self) -> DomainResult<Vec<T>> {
        match &self.team_code {
            Some(code) => self.find_where(&FieldFilter::team(code)).await,
            None => Err(DomainError::InvalidInput(format!(
                "Listing {} requires a team scope",
                T::COLLECTION
            ))),
        }
    }

    async fn update(&self, entity: &T) -> DomainResult<T> {
        if entity.id().is_empty() {
            return Err(DomainError::InvalidInput(format!(
                "Cannot update unsaved {} record",
                T::COLLECTION
            )));
        }
        self.write(entity.clone()).await
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        self.check_owner(id).await?;
        self.store.delete(T::COLLECTION, id).await?;
        Ok(())
    }
}

#[async_trait]
impl<T: Entity> TeamRepository<T> for DocumentRepository<T> {
    async fn save(&self, entity: T) -> DomainResult<T> {
        if entity.id().is_empty() {
            self.create(&entity).await
        } else {
            self.write(entity).await
        }
    }

    async fn replace_where<F>(&self, matches: F, entities: Vec<T>) -> DomainResult<Vec<T>>
    where
        F: Fn(&T) -> bool + Send + Sync,
    {
        let existing = self.list().await?;
        let stale: Vec<String> = existing
            .iter()
            .filter(|e| matches(*e))
            .map(|e| e.id().to_string())
            .collect();

        for id in &stale {
            self.store.delete(T::COLLECTION, id).await?;
        }
        log::info!("Cleared {} {} records before import", stale.len(), T::COLLECTION);

        let mut saved = Vec::with_capacity(entities.len());
        for entity in entities {
            saved.push(self.create(&entity).await?);
        }
        Ok(saved)
    }
}
