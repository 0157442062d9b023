mod ingest_dto;

pub use ingest_dto::{IngestDocumentRequest, IngestDocumentResponse, IngestErrorResponse, IngestSyncResponse};
