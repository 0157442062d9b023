use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{ExternalRecord, RecordStore, RecordStoreError};
use crate::core::config::AirtableConfig;

#[derive(Debug, Deserialize)]
struct ListRecordsPage {
    records: Vec<ExternalRecord>,
    #[serde(default)]
    offset: Option<String>,
}

/// Airtable REST client listing a single table
pub struct AirtableClient {
    client: Client,
    table_url: String,
    api_key: String,
}

impl AirtableClient {
    pub fn new(config: &AirtableConfig) -> Self {
        Self {
            client: Client::new(),
            table_url: format!(
                "{}/{}/{}",
                config.api_url.trim_end_matches('/'),
                config.base_id,
                config.table_id
            ),
            api_key: config.api_key.clone(),
        }
    }

    async fn fetch_page(&self, offset: Option<&str>) -> Result<ListRecordsPage, RecordStoreError> {
        let mut request = self.client.get(&self.table_url).bearer_auth(&self.api_key);
        if let Some(offset) = offset {
            request = request.query(&[("offset", offset)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RecordStoreError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RecordStoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<ListRecordsPage>()
            .await
            .map_err(|e| RecordStoreError::Parse(e.to_string()))
    }
}

#[async_trait]
impl RecordStore for AirtableClient {
    async fn list_records(&self) -> Result<Vec<ExternalRecord>, RecordStoreError> {
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let page = self.fetch_page(offset.as_deref()).await?;
            debug!(
                "Fetched {} records from {} (has more: {})",
                page.records.len(),
                self.table_url,
                page.offset.is_some()
            );
            records.extend(page.records);

            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(records)
    }
}
