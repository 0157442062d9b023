use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::sync::dtos::SyncReport;

/// Body sent by the automation tool.
///
/// Documented shape only; the handler reads the raw body so it can report
/// the first missing field by name.
#[derive(Debug, Deserialize, ToSchema)]
#[allow(dead_code)]
pub struct IngestDocumentRequest {
    pub title: String,
    pub category: String,
    pub file_url: String,
    /// `insurance` or `investment`
    pub document_type: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IngestDocumentResponse {
    pub status: String,
    pub message: String,
    pub document_id: i64,
    pub title: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IngestSyncResponse {
    pub status: String,
    pub message: String,
    #[serde(flatten)]
    pub report: SyncReport,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IngestErrorResponse {
    pub status: String,
    pub message: String,
}
