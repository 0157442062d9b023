use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::sync::models::SyncedRecord;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SyncedRecordResponseDto {
    pub record_id: String,
    pub title: String,
    pub category: String,
    pub file_url: Option<String>,
    /// Proxy download endpoint; absent when the record has no file
    pub download_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub synced_at: DateTime<Utc>,
}

impl From<SyncedRecord> for SyncedRecordResponseDto {
    fn from(record: SyncedRecord) -> Self {
        let has_file = !record.file_url.is_empty();
        Self {
            download_url: has_file.then(|| {
                format!(
                    "/api/synced-documents/{}/download",
                    urlencoding::encode(&record.record_id)
                )
            }),
            file_url: has_file.then_some(record.file_url),
            record_id: record.record_id,
            title: record.title,
            category: record.category,
            created_at: record.created_at,
            updated_at: record.updated_at,
            synced_at: record.synced_at,
        }
    }
}

/// Outcome of one sync pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SyncReport {
    pub fetched: usize,
    pub upserted: usize,
    pub skipped: usize,
}
