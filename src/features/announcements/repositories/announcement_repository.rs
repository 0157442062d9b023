use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::announcements::models::{Announcement, NewAnnouncement};

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    /// Active announcements, important first then newest, with the total count
    async fn list_active(&self, limit: i64, offset: i64) -> Result<(Vec<Announcement>, i64)>;

    /// Active announcements whose window contains `now`, important first then newest
    async fn list_current(&self, now: DateTime<Utc>) -> Result<Vec<Announcement>>;

    /// Newest active announcements regardless of importance
    async fn latest(&self, limit: i64) -> Result<Vec<Announcement>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Announcement>>;

    async fn insert(&self, announcement: NewAnnouncement) -> Result<Announcement>;

    async fn update(&self, announcement: &Announcement) -> Result<Announcement>;
}

pub struct PgAnnouncementRepository {
    pool: PgPool,
}

impl PgAnnouncementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = r#"
    id, title, content, author_id, start_date, end_date,
    is_active, is_important, created_at, updated_at
"#;

#[async_trait]
impl AnnouncementRepository for PgAnnouncementRepository {
    async fn list_active(&self, limit: i64, offset: i64) -> Result<(Vec<Announcement>, i64)> {
        let sql = format!(
            r#"
            SELECT {COLUMNS}
            FROM announcements
            WHERE is_active = TRUE
            ORDER BY is_important DESC, created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#
        );
        let items = sqlx::query_as::<_, Announcement>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list announcements: {:?}", e);
                AppError::Database(e)
            })?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM announcements WHERE is_active = TRUE")
                .fetch_one(&self.pool)
                .await?;

        Ok((items, total))
    }

    async fn list_current(&self, now: DateTime<Utc>) -> Result<Vec<Announcement>> {
        let sql = format!(
            r#"
            SELECT {COLUMNS}
            FROM announcements
            WHERE is_active = TRUE
              AND start_date <= $1
              AND (end_date IS NULL OR end_date >= $1)
            ORDER BY is_important DESC, created_at DESC, id DESC
            "#
        );
        sqlx::query_as::<_, Announcement>(&sql)
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn latest(&self, limit: i64) -> Result<Vec<Announcement>> {
        let sql = format!(
            r#"
            SELECT {COLUMNS}
            FROM announcements
            WHERE is_active = TRUE
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "#
        );
        sqlx::query_as::<_, Announcement>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Announcement>> {
        let sql = format!("SELECT {COLUMNS} FROM announcements WHERE id = $1");
        sqlx::query_as::<_, Announcement>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn insert(&self, a: NewAnnouncement) -> Result<Announcement> {
        let sql = format!(
            r#"
            INSERT INTO announcements
                (title, content, author_id, start_date, end_date, is_active, is_important)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COLUMNS}
            "#
        );
        sqlx::query_as::<_, Announcement>(&sql)
            .bind(&a.title)
            .bind(&a.content)
            .bind(&a.author_id)
            .bind(a.start_date)
            .bind(a.end_date)
            .bind(a.is_active)
            .bind(a.is_important)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert announcement: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn update(&self, a: &Announcement) -> Result<Announcement> {
        let sql = format!(
            r#"
            UPDATE announcements
            SET title = $2, content = $3, start_date = $4, end_date = $5,
                is_active = $6, is_important = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );
        sqlx::query_as::<_, Announcement>(&sql)
            .bind(a.id)
            .bind(&a.title)
            .bind(&a.content)
            .bind(a.start_date)
            .bind(a.end_date)
            .bind(a.is_active)
            .bind(a.is_important)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Announcement {} not found", a.id)))
    }
}
