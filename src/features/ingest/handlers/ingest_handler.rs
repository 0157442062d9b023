use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};

use crate::features::ingest::dtos::{
    IngestDocumentRequest, IngestDocumentResponse, IngestErrorResponse, IngestSyncResponse,
};
use crate::features::ingest::services::{IngestError, IngestService};
use crate::shared::constants::API_KEY_HEADER;

fn api_key(headers: &HeaderMap) -> Option<&str> {
    headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok())
}

/// Create a linked document from the automation tool
///
/// Authenticated with the shared key in `X-API-Key`. The document is stored
/// with source `n8n` and `file_url` as its external URL.
#[utoipa::path(
    post,
    path = "/api/ingest/documents",
    request_body = IngestDocumentRequest,
    responses(
        (status = 200, description = "Document created", body = IngestDocumentResponse),
        (status = 400, description = "Malformed body, missing field or invalid value", body = IngestErrorResponse),
        (status = 401, description = "Invalid or missing API key", body = IngestErrorResponse),
        (status = 500, description = "Document could not be stored", body = IngestErrorResponse)
    ),
    tag = "ingest",
    security(("api_key" = []))
)]
pub async fn ingest_document(
    State(service): State<Arc<IngestService>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<IngestDocumentResponse>, IngestError> {
    service.authorize(api_key(&headers))?;

    let (document_id, title) = service.ingest(&body).await?;
    Ok(Json(IngestDocumentResponse {
        status: "success".to_string(),
        message: "Document ingested successfully".to_string(),
        document_id,
        title,
    }))
}

/// Run one record-store sync pass
#[utoipa::path(
    post,
    path = "/api/ingest/sync",
    responses(
        (status = 200, description = "Sync finished", body = IngestSyncResponse),
        (status = 400, description = "Sync is not configured", body = IngestErrorResponse),
        (status = 401, description = "Invalid or missing API key", body = IngestErrorResponse),
        (status = 502, description = "Record store unavailable", body = IngestErrorResponse)
    ),
    tag = "ingest",
    security(("api_key" = []))
)]
pub async fn run_sync(
    State(service): State<Arc<IngestService>>,
    headers: HeaderMap,
) -> Result<Json<IngestSyncResponse>, IngestError> {
    service.authorize(api_key(&headers))?;

    let report = service.sync().await?;
    Ok(Json(IngestSyncResponse {
        status: "success".to_string(),
        message: "Sync completed".to_string(),
        report,
    }))
}
