//! Backend Layer
//!
//! Service traits for the hosted backend and the local implementations
//! used offline and in tests.

mod traits;
mod memory;
mod sqlite;
mod auth;
mod blob;

pub use traits::{
    AuthAccount, AuthProvider, BackendError, BackendResult, BlobStore, ChangeEvent, DocumentStore,
    FieldFilter, TEAM_CODE_FIELD,
};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use auth::LocalAuth;
pub use blob::FsBlobStore;
