//! Backend Layer - Service Traits
//!
//! Abstract interfaces for the hosted backend: document store with live
//! change notifications, authentication and blob storage.
//! Implementations can be a cloud SDK, SQLite, in-memory, etc.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

pub type BackendResult<T> = Result<T, BackendError>;

/// Errors raised by backend adapters. Display strings are shown to the
/// user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Malformed document: {0}")]
    Malformed(String),
    #[error("{0}")]
    Auth(String),
    #[error("Network error: {0}")]
    Network(String),
}

/// Notification that one document changed.
///
/// `team_codes` holds the team code before and after the change so a
/// document moving between teams wakes both mirrors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub collection: String,
    pub id: String,
    pub team_codes: Vec<String>,
}

impl ChangeEvent {
    pub fn new(collection: &str, id: &str, before: Option<&Value>, after: Option<&Value>) -> Self {
        let mut team_codes: Vec<String> = [before, after]
            .into_iter()
            .flatten()
            .filter_map(|doc| doc.get(TEAM_CODE_FIELD).and_then(Value::as_str))
            .map(str::to_string)
            .collect();
        team_codes.dedup();

        Self {
            collection: collection.to_string(),
            id: id.to_string(),
            team_codes,
        }
    }

    pub fn touches(&self, collection: &str, team_code: &str) -> bool {
        self.collection == collection && self.team_codes.iter().any(|c| c == team_code)
    }
}

/// Document field carrying the tenant scope
pub const TEAM_CODE_FIELD: &str = "teamCode";

/// Equality filter on one top-level field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: Value,
}

impl FieldFilter {
    pub fn field_eq(field: &str, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub fn team(code: &str) -> Self {
        Self::field_eq(TEAM_CODE_FIELD, code)
    }

    pub fn matches(&self, doc: &Value) -> bool {
        doc.get(&self.field) == Some(&self.value)
    }
}

/// Document database with live change notifications
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document
    async fn get(&self, collection: &str, id: &str) -> BackendResult<Option<Value>>;

    /// Create or fully overwrite a document
    async fn set(&self, collection: &str, id: &str, doc: Value) -> BackendResult<()>;

    /// Delete a document; deleting a missing id is not an error
    async fn delete(&self, collection: &str, id: &str) -> BackendResult<()>;

    /// All documents of a collection matching the filter
    async fn query(&self, collection: &str, filter: &FieldFilter) -> BackendResult<Vec<Value>>;

    /// Subscribe to change notifications for every collection
    fn changes(&self) -> broadcast::Receiver<ChangeEvent>;
}

/// Signed-in identity as returned by the auth service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthAccount {
    pub uid: String,
    pub email: String,
}

/// Email/password authentication service
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> BackendResult<AuthAccount>;

    async fn sign_up(&self, email: &str, password: &str) -> BackendResult<AuthAccount>;

    async fn sign_out(&self) -> BackendResult<()>;

    async fn current_account(&self) -> Option<AuthAccount>;

    /// Confirms the password of the signed-in account before a
    /// sensitive change
    async fn reauthenticate(&self, password: &str) -> BackendResult<()>;

    async fn update_email(&self, new_email: &str) -> BackendResult<()>;

    async fn update_password(&self, new_password: &str) -> BackendResult<()>;

    /// Removes the signed-in account and signs out
    async fn delete_account(&self) -> BackendResult<()>;
}

/// File storage returning long-lived download URLs
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes at `path`, returning the download URL
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> BackendResult<String>;

    async fn delete(&self, path: &str) -> BackendResult<()>;
}
