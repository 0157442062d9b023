mod document_repository;

pub use document_repository::{DocumentFilter, DocumentRepository, PgDocumentRepository};
