use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::core::error::AppError;
use crate::features::documents::models::{DocumentCategory, DocumentSource, DocumentType};
use crate::features::documents::services::{CreateDocumentInput, DocumentService};
use crate::features::ingest::dtos::IngestErrorResponse;
use crate::features::sync::dtos::SyncReport;
use crate::features::sync::SyncService;
use crate::shared::validation::is_http_url;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Invalid or missing API key")]
    Unauthorized,

    #[error("Invalid JSON body: {0}")]
    Malformed(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid document_type: {0}")]
    InvalidDocumentType(String),

    #[error("Invalid category for {document_type}: {category}")]
    InvalidCategory {
        document_type: DocumentType,
        category: String,
    },

    #[error("Invalid file_url: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    Rejected(String),

    #[error("Record store unavailable")]
    Upstream,

    #[error("Internal server error")]
    Internal,
}

impl IngestError {
    fn status(&self) -> StatusCode {
        match self {
            IngestError::Unauthorized => StatusCode::UNAUTHORIZED,
            IngestError::Upstream => StatusCode::BAD_GATEWAY,
            IngestError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let body = IngestErrorResponse {
            status: "error".to_string(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// A validated ingest request
#[derive(Debug, Clone, PartialEq)]
pub struct IngestDocument {
    pub document_type: DocumentType,
    pub title: String,
    pub description: String,
    pub category: DocumentCategory,
    pub file_url: String,
}

fn string_field(body: &Map<String, Value>, name: &'static str) -> Result<String, IngestError> {
    match body.get(name) {
        None | Some(Value::Null) => Err(IngestError::MissingField(name)),
        Some(Value::String(s)) if s.trim().is_empty() => Err(IngestError::MissingField(name)),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(other) => Ok(other.to_string()),
    }
}

/// Validate a raw ingest body.
///
/// Order: JSON syntax, required fields (first missing one is reported),
/// document type, category within that type, then the URL.
pub fn parse_ingest_payload(body: &[u8]) -> Result<IngestDocument, IngestError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| IngestError::Malformed(e.to_string()))?;
    let Value::Object(body) = value else {
        return Err(IngestError::Malformed("expected a JSON object".to_string()));
    };

    let title = string_field(&body, "title")?;
    let category = string_field(&body, "category")?;
    let file_url = string_field(&body, "file_url")?;
    let document_type = string_field(&body, "document_type")?;

    let document_type: DocumentType = document_type
        .parse()
        .map_err(|_| IngestError::InvalidDocumentType(document_type))?;

    let category = document_type
        .parse_category(&category)
        .ok_or(IngestError::InvalidCategory {
            document_type,
            category,
        })?;

    if !is_http_url(&file_url) {
        return Err(IngestError::InvalidUrl(file_url));
    }

    let description = body
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(IngestDocument {
        document_type,
        title,
        description,
        category,
        file_url,
    })
}

pub struct IngestService {
    documents: Arc<DocumentService>,
    sync: Arc<SyncService>,
    key_digest: Option<[u8; 32]>,
}

impl IngestService {
    /// An empty `api_key` rejects every request
    pub fn new(documents: Arc<DocumentService>, sync: Arc<SyncService>, api_key: &str) -> Self {
        let key_digest = (!api_key.is_empty()).then(|| Sha256::digest(api_key.as_bytes()).into());
        Self {
            documents,
            sync,
            key_digest,
        }
    }

    /// Compare digests so the check does not depend on where the keys differ
    pub fn authorize(&self, provided: Option<&str>) -> Result<(), IngestError> {
        let (Some(expected), Some(provided)) = (self.key_digest, provided) else {
            return Err(IngestError::Unauthorized);
        };
        let provided: [u8; 32] = Sha256::digest(provided.as_bytes()).into();
        if provided == expected {
            Ok(())
        } else {
            Err(IngestError::Unauthorized)
        }
    }

    /// Create a linked document from the automation tool; returns (id, title)
    pub async fn ingest(&self, body: &[u8]) -> Result<(i64, String), IngestError> {
        let doc = parse_ingest_payload(body)?;

        let input = CreateDocumentInput {
            title: doc.title,
            description: doc.description,
            category: doc.category,
            source: DocumentSource::N8n,
            external_url: Some(doc.file_url),
            tags: Vec::new(),
            file: None,
        };

        let created = self
            .documents
            .create(doc.document_type, input, None)
            .await
            .map_err(|e| match e {
                AppError::Validation(msg) | AppError::BadRequest(msg) => IngestError::Rejected(msg),
                other => {
                    tracing::error!("Ingest failed to persist document: {}", other);
                    IngestError::Internal
                }
            })?;

        tracing::info!(
            "Ingested {} document {} ('{}')",
            doc.document_type,
            created.id,
            created.title
        );
        Ok((created.id, created.title))
    }

    pub async fn sync(&self) -> Result<SyncReport, IngestError> {
        self.sync.run().await.map_err(|e| match e {
            AppError::BadRequest(msg) => IngestError::Rejected(msg),
            AppError::ExternalServiceError(_) => IngestError::Upstream,
            other => {
                tracing::error!("Sync run failed: {}", other);
                IngestError::Internal
            }
        })
    }
}
