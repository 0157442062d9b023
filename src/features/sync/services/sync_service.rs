use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::sync::dtos::{SyncReport, SyncedRecordResponseDto};
use crate::features::sync::models::SyncedRecordUpsert;
use crate::features::sync::repositories::SyncedRecordRepository;
use crate::features::sync::services::FileFetcher;
use crate::modules::record_store::RecordStore;
use crate::shared::types::PaginationQuery;

/// A proxied synced file ready to be served
#[derive(Debug)]
pub struct SyncedDownload {
    pub data: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

pub struct SyncService {
    store: Option<Arc<dyn RecordStore>>,
    repo: Arc<dyn SyncedRecordRepository>,
    fetcher: Arc<dyn FileFetcher>,
}

impl SyncService {
    /// `store` is `None` when no record store is configured; `run` then refuses
    pub fn new(
        store: Option<Arc<dyn RecordStore>>,
        repo: Arc<dyn SyncedRecordRepository>,
        fetcher: Arc<dyn FileFetcher>,
    ) -> Self {
        Self {
            store,
            repo,
            fetcher,
        }
    }

    /// One full upsert pass over the record store.
    ///
    /// Records without a usable title are skipped and logged; a failed
    /// upsert is counted as skipped as well. Re-running converges on the
    /// same rows.
    pub async fn run(&self) -> Result<SyncReport> {
        let store = self.store.as_ref().ok_or_else(|| {
            AppError::BadRequest("Record store sync is not configured".to_string())
        })?;

        let records = store.list_records().await.map_err(|e| {
            tracing::error!("Record store sync failed: {}", e);
            AppError::ExternalServiceError(e.to_string())
        })?;

        let mut report = SyncReport {
            fetched: records.len(),
            ..Default::default()
        };

        for record in &records {
            let Some(upsert) = SyncedRecordUpsert::from_external(record) else {
                tracing::warn!("Skipping record {}: missing title", record.id);
                report.skipped += 1;
                continue;
            };

            match self.repo.upsert(&upsert).await {
                Ok(_) => report.upserted += 1,
                Err(e) => {
                    tracing::warn!("Skipping record {}: {}", record.id, e);
                    report.skipped += 1;
                }
            }
        }

        tracing::info!(
            "Record store sync finished: fetched={} upserted={} skipped={}",
            report.fetched,
            report.upserted,
            report.skipped
        );
        Ok(report)
    }

    pub async fn list(
        &self,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<SyncedRecordResponseDto>, i64)> {
        let (items, total) = self
            .repo
            .list(pagination.limit(), pagination.offset())
            .await?;
        Ok((items.into_iter().map(Into::into).collect(), total))
    }

    /// Fetch the record's file from its upstream URL
    pub async fn download(&self, record_id: &str) -> Result<SyncedDownload> {
        let record = self
            .repo
            .find_by_record_id(record_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Synced document {} not found", record_id)))?;

        if record.file_url.trim().is_empty() {
            return Err(AppError::NotFound(format!(
                "Synced document {} has no file",
                record_id
            )));
        }

        let fetched = self.fetcher.fetch(&record.file_url).await?;

        Ok(SyncedDownload {
            data: fetched.data,
            file_name: download_file_name(&record.title, &record.file_url),
            content_type: fetched
                .content_type
                .unwrap_or_else(|| "application/octet-stream".to_string()),
        })
    }
}

/// Record title, with the URL's file extension appended when the title has none
fn download_file_name(title: &str, url: &str) -> String {
    let has_extension = title
        .rsplit_once('.')
        .is_some_and(|(_, ext)| !ext.is_empty() && ext.len() <= 5);
    if has_extension {
        return title.to_string();
    }

    let extension = reqwest::Url::parse(url).ok().and_then(|u| {
        u.path_segments()
            .and_then(|mut segments| segments.next_back().map(str::to_string))
            .and_then(|last| {
                last.rsplit_once('.')
                    .map(|(_, ext)| ext.to_ascii_lowercase())
                    .filter(|ext| {
                        !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric())
                    })
            })
    });

    match extension {
        Some(ext) => format!("{}.{}", title, ext),
        None => title.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::record_store::ExternalRecord;
    use crate::shared::test_helpers::{
        InMemoryRecordStore, InMemorySyncedRecordRepository, StaticFileFetcher,
    };
    use serde_json::json;

    fn record(id: &str, fields: serde_json::Value) -> ExternalRecord {
        serde_json::from_value(json!({
            "id": id,
            "createdTime": "2024-03-01T08:00:00.000Z",
            "fields": fields
        }))
        .unwrap()
    }

    fn service(
        records: Vec<ExternalRecord>,
        fetcher: StaticFileFetcher,
    ) -> (SyncService, Arc<InMemoryRecordStore>, Arc<InMemorySyncedRecordRepository>) {
        let store = Arc::new(InMemoryRecordStore::new(records));
        let repo = Arc::new(InMemorySyncedRecordRepository::default());
        let service = SyncService::new(Some(store.clone()), repo.clone(), Arc::new(fetcher));
        (service, store, repo)
    }

    #[tokio::test]
    async fn test_run_upserts_and_skips_unusable_records() {
        let (service, _, repo) = service(
            vec![
                record("rec1", json!({"title": "美股週報", "attachments": [{"url": "https://dl.example.com/a.pdf"}]})),
                record("rec2", json!({"category": "monthly"})),
                record("rec3", json!({"title": "投資月報"})),
            ],
            StaticFileFetcher::failing(),
        );

        let report = service.run().await.unwrap();

        assert_eq!(
            report,
            SyncReport {
                fetched: 3,
                upserted: 2,
                skipped: 1
            }
        );
        assert_eq!(repo.count().await, 2);
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent_and_last_write_wins() {
        let (service, store, repo) = service(
            vec![record("rec1", json!({"title": "舊標題"}))],
            StaticFileFetcher::failing(),
        );
        service.run().await.unwrap();

        store
            .replace(vec![record("rec1", json!({"title": "新標題"}))])
            .await;
        service.run().await.unwrap();
        service.run().await.unwrap();

        assert_eq!(repo.count().await, 1);
        let stored = repo.find_by_record_id("rec1").await.unwrap().unwrap();
        assert_eq!(stored.title, "新標題");
    }

    #[tokio::test]
    async fn test_run_without_store_is_rejected() {
        let service = SyncService::new(
            None,
            Arc::new(InMemorySyncedRecordRepository::default()),
            Arc::new(StaticFileFetcher::failing()),
        );

        assert!(matches!(service.run().await, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_download_paths() {
        let (service, _, _) = service(
            vec![
                record("rec1", json!({"title": "美股週報", "attachments": [{"url": "https://dl.example.com/files/weekly.PDF"}]})),
                record("rec2", json!({"title": "無附件"})),
            ],
            StaticFileFetcher::serving(b"pdf-bytes", "application/pdf"),
        );
        service.run().await.unwrap();

        let download = service.download("rec1").await.unwrap();
        assert_eq!(download.data, b"pdf-bytes".to_vec());
        assert_eq!(download.file_name, "美股週報.pdf");
        assert_eq!(download.content_type, "application/pdf");

        assert!(matches!(service.download("rec2").await, Err(AppError::NotFound(_))));
        assert!(matches!(service.download("nope").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_failed_upstream_fetch_is_download_failed() {
        let (service, _, _) = service(
            vec![record("rec1", json!({"title": "a", "attachments": [{"url": "https://dl.example.com/a.pdf"}]}))],
            StaticFileFetcher::failing(),
        );
        service.run().await.unwrap();

        assert!(matches!(
            service.download("rec1").await,
            Err(AppError::DownloadFailed(_))
        ));
    }

    #[test]
    fn test_download_file_name() {
        assert_eq!(download_file_name("報告.xlsx", "https://x/y.pdf"), "報告.xlsx");
        assert_eq!(download_file_name("報告", "https://x/y.pdf?sig=1"), "報告.pdf");
        assert_eq!(download_file_name("報告", "https://x/download"), "報告");
    }
}
