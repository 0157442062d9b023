//! External record store (Airtable) integration
//!
//! The sync feature reads every record through [`RecordStore`]; only the
//! Airtable REST API is implemented.

mod airtable_client;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

pub use airtable_client::AirtableClient;

/// One row as returned by the record store
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalRecord {
    pub id: String,
    #[serde(rename = "createdTime")]
    pub created_time: DateTime<Utc>,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl ExternalRecord {
    /// Non-empty string field, trimmed
    pub fn text_field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// URL of the first attachment, if any
    pub fn first_attachment_url(&self) -> Option<&str> {
        self.fields
            .get("attachments")
            .and_then(Value::as_array)
            .and_then(|items| items.first())
            .and_then(|item| item.get("url"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecordStoreError {
    #[error("Record store request failed: {0}")]
    Request(String),

    #[error("Record store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse record store response: {0}")]
    Parse(String),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch every record, following pagination to the end
    async fn list_records(&self) -> Result<Vec<ExternalRecord>, RecordStoreError>;
}
