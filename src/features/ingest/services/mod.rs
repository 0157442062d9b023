mod ingest_service;

pub use ingest_service::{parse_ingest_payload, IngestDocument, IngestError, IngestService};
