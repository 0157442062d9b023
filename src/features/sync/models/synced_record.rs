use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::modules::record_store::ExternalRecord;

/// Local copy of a record-store row
#[derive(Debug, Clone, FromRow)]
pub struct SyncedRecord {
    pub id: i64,
    pub record_id: String,
    pub title: String,
    pub category: String,
    /// Empty when the record has no attachment
    pub file_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub synced_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncedRecordUpsert {
    pub record_id: String,
    pub title: String,
    pub category: String,
    pub file_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SyncedRecordUpsert {
    /// Map a record-store row; `None` when it has no usable title.
    ///
    /// `updated_at` comes from the record's own field and falls back to its
    /// creation time when absent or unparsable.
    pub fn from_external(record: &ExternalRecord) -> Option<Self> {
        let title = record.text_field("title")?.to_string();

        let updated_at = record
            .text_field("updated_at")
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(record.created_time);

        Some(Self {
            record_id: record.id.clone(),
            title,
            category: record.text_field("category").unwrap_or_default().to_string(),
            file_url: record.first_attachment_url().unwrap_or_default().to_string(),
            created_at: record.created_time,
            updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(fields: serde_json::Value) -> ExternalRecord {
        serde_json::from_value(json!({
            "id": "recA1",
            "createdTime": "2024-03-01T08:00:00.000Z",
            "fields": fields
        }))
        .unwrap()
    }

    #[test]
    fn test_from_external_maps_fields() {
        let upsert = SyncedRecordUpsert::from_external(&record(json!({
            "title": "美股週報",
            "category": "us_stock",
            "updated_at": "2024-03-02T09:30:00Z",
            "attachments": [{"url": "https://dl.example.com/weekly.pdf"}]
        })))
        .unwrap();

        assert_eq!(upsert.record_id, "recA1");
        assert_eq!(upsert.category, "us_stock");
        assert_eq!(upsert.file_url, "https://dl.example.com/weekly.pdf");
        assert_eq!(upsert.updated_at.to_rfc3339(), "2024-03-02T09:30:00+00:00");
    }

    #[test]
    fn test_missing_updated_at_falls_back_to_created_time() {
        let upsert =
            SyncedRecordUpsert::from_external(&record(json!({"title": "月報"}))).unwrap();

        assert_eq!(upsert.updated_at, upsert.created_at);
        assert_eq!(upsert.file_url, "");
        assert_eq!(upsert.category, "");
    }

    #[test]
    fn test_record_without_title_is_unusable() {
        assert!(SyncedRecordUpsert::from_external(&record(json!({"title": "  "}))).is_none());
        assert!(SyncedRecordUpsert::from_external(&record(json!({}))).is_none());
    }
}
