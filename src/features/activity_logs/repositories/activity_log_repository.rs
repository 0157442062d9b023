use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, PgPool};

use crate::core::error::{AppError, Result};
use crate::features::activity_logs::models::{
    ActivityAction, ActivityLog, ActivityStats, DocumentActivityCount, NewActivityLog,
};
use crate::features::documents::models::DocumentType;

#[derive(Debug, Clone, Default)]
pub struct ActivityLogFilter {
    pub user_id: Option<String>,
    pub action: Option<ActivityAction>,
    pub document_type: Option<DocumentType>,
    pub limit: i64,
    pub offset: i64,
}

/// Append and read only; log rows are never updated or deleted
#[async_trait]
pub trait ActivityLogRepository: Send + Sync {
    async fn append(&self, entry: NewActivityLog) -> Result<ActivityLog>;

    /// Newest first, with the total count ignoring limit/offset
    async fn list(&self, filter: &ActivityLogFilter) -> Result<(Vec<ActivityLog>, i64)>;

    /// Aggregates for the admin dashboard
    async fn stats(&self, window: &StatsWindow) -> Result<ActivityStats>;
}

/// Period boundaries and list sizes for [`ActivityLogRepository::stats`]
#[derive(Debug, Clone)]
pub struct StatsWindow {
    pub week_start: DateTime<Utc>,
    pub month_start: DateTime<Utc>,
    pub recent_limit: i64,
    pub top_limit: i64,
}

pub struct PgActivityLogRepository {
    pool: PgPool,
}

impl PgActivityLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const FILTER: &str = r#"
    WHERE ($1::TEXT IS NULL OR user_id = $1)
      AND ($2::activity_action IS NULL OR action = $2)
      AND ($3::document_type IS NULL OR document_type = $3)
"#;

#[async_trait]
impl ActivityLogRepository for PgActivityLogRepository {
    async fn append(&self, entry: NewActivityLog) -> Result<ActivityLog> {
        sqlx::query_as::<_, ActivityLog>(
            r#"
            INSERT INTO activity_logs
                (user_id, action, document_type, document_id, document_title,
                 ip_address, user_agent, details)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, action, document_type, document_id, document_title,
                      ip_address, user_agent, details, created_at
            "#,
        )
        .bind(&entry.user_id)
        .bind(entry.action)
        .bind(entry.document_type)
        .bind(entry.document_id)
        .bind(&entry.document_title)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .bind(entry.details.map(Json))
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn list(&self, filter: &ActivityLogFilter) -> Result<(Vec<ActivityLog>, i64)> {
        let list_sql = format!(
            r#"
            SELECT id, user_id, action, document_type, document_id, document_title,
                   ip_address, user_agent, details, created_at
            FROM activity_logs
            {}
            ORDER BY created_at DESC, id DESC
            LIMIT $4 OFFSET $5
            "#,
            FILTER
        );

        let logs = sqlx::query_as::<_, ActivityLog>(&list_sql)
            .bind(&filter.user_id)
            .bind(filter.action)
            .bind(filter.document_type)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list activity logs: {:?}", e);
                AppError::Database(e)
            })?;

        let count_sql = format!("SELECT COUNT(*) FROM activity_logs {}", FILTER);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(&filter.user_id)
            .bind(filter.action)
            .bind(filter.document_type)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok((logs, total))
    }

    async fn stats(&self, window: &StatsWindow) -> Result<ActivityStats> {
        let (recent, _) = self
            .list(&ActivityLogFilter {
                limit: window.recent_limit,
                ..Default::default()
            })
            .await?;

        let top_documents = sqlx::query_as::<_, DocumentActivityCount>(
            r#"
            SELECT document_type, document_id,
                   (ARRAY_AGG(document_title ORDER BY created_at DESC, id DESC)
                        FILTER (WHERE document_title IS NOT NULL))[1] AS document_title,
                   COUNT(*) FILTER (WHERE action = 'view') AS views,
                   COUNT(*) FILTER (WHERE action = 'download') AS downloads
            FROM activity_logs
            WHERE document_id IS NOT NULL AND action IN ('view', 'download')
            GROUP BY document_type, document_id
            ORDER BY views DESC, downloads DESC, document_id DESC
            LIMIT $1
            "#,
        )
        .bind(window.top_limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to aggregate document activity: {:?}", e);
            AppError::Database(e)
        })?;

        let weekly_active_users: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT user_id) FROM activity_logs WHERE created_at >= $1",
        )
        .bind(window.week_start)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        let monthly_downloads: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM activity_logs WHERE action = 'download' AND created_at >= $1",
        )
        .bind(window.month_start)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(ActivityStats {
            recent,
            top_documents,
            weekly_active_users,
            monthly_downloads,
        })
    }
}
