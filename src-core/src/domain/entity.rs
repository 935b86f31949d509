//! Domain Layer - Core Entity Trait
//!
//! Every record mirrored from the backend is an Entity: it lives in one
//! named collection, is keyed by a string document id and is scoped by
//! the team code.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Core trait for all domain entities
pub trait Entity:
    Sized + Send + Sync + Clone + PartialEq + Serialize + DeserializeOwned + 'static
{
    /// Backend collection holding this entity kind
    const COLLECTION: &'static str;

    /// Returns the document id (empty when not yet saved)
    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Team code the record belongs to
    fn team_code(&self) -> Option<&str>;

    fn set_team_code(&mut self, code: String);
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    PermissionDenied(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
}
