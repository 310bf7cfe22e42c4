//! Repository layer for data access.

mod document_repository;

pub use document_repository::{write_atomic, DocumentRepository, JsonFileStore};

#[cfg(any(test, feature = "test-utils"))]
pub use document_repository::MockDocumentRepository;
