use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::sync::models::{SyncedRecord, SyncedRecordUpsert};

#[async_trait]
pub trait SyncedRecordRepository: Send + Sync {
    /// Insert or overwrite by `record_id`; the last write wins
    async fn upsert(&self, record: &SyncedRecordUpsert) -> Result<SyncedRecord>;

    /// Newest first, with the total count
    async fn list(&self, limit: i64, offset: i64) -> Result<(Vec<SyncedRecord>, i64)>;

    async fn find_by_record_id(&self, record_id: &str) -> Result<Option<SyncedRecord>>;
}

pub struct PgSyncedRecordRepository {
    pool: PgPool,
}

impl PgSyncedRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str =
    "id, record_id, title, category, file_url, created_at, updated_at, synced_at";

#[async_trait]
impl SyncedRecordRepository for PgSyncedRecordRepository {
    async fn upsert(&self, record: &SyncedRecordUpsert) -> Result<SyncedRecord> {
        let sql = format!(
            r#"
            INSERT INTO synced_records
                (record_id, title, category, file_url, created_at, updated_at, synced_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            ON CONFLICT (record_id) DO UPDATE SET
                title = EXCLUDED.title,
                category = EXCLUDED.category,
                file_url = EXCLUDED.file_url,
                created_at = EXCLUDED.created_at,
                updated_at = EXCLUDED.updated_at,
                synced_at = NOW()
            RETURNING {COLUMNS}
            "#
        );
        sqlx::query_as::<_, SyncedRecord>(&sql)
            .bind(&record.record_id)
            .bind(&record.title)
            .bind(&record.category)
            .bind(&record.file_url)
            .bind(record.created_at)
            .bind(record.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to upsert synced record {}: {:?}", record.record_id, e);
                AppError::Database(e)
            })
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<(Vec<SyncedRecord>, i64)> {
        let sql = format!(
            "SELECT {COLUMNS} FROM synced_records ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        );
        let items = sqlx::query_as::<_, SyncedRecord>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM synced_records")
            .fetch_one(&self.pool)
            .await?;

        Ok((items, total))
    }

    async fn find_by_record_id(&self, record_id: &str) -> Result<Option<SyncedRecord>> {
        let sql = format!("SELECT {COLUMNS} FROM synced_records WHERE record_id = $1");
        sqlx::query_as::<_, SyncedRecord>(&sql)
            .bind(record_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
