//! Repository Layer
//!
//! Data access abstractions and implementations.

mod traits;
mod document_repo;


pub use traits::{Repository, TeamRepository};
pub use document_repo::{decode, encode, new_document_id, DocumentRepository};
