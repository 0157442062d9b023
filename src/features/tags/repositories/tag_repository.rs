use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::tags::models::Tag;

#[async_trait]
pub trait TagRepository: Send + Sync {
    /// All tags ordered by name
    async fn list(&self) -> Result<Vec<Tag>>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>>;

    /// Fails with `Conflict` when the name or slug is taken
    async fn create(&self, name: &str, slug: &str) -> Result<Tag>;
}

pub struct PgTagRepository {
    pool: PgPool,
}

impl PgTagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TagRepository for PgTagRepository {
    async fn list(&self) -> Result<Vec<Tag>> {
        sqlx::query_as::<_, Tag>("SELECT id, name, slug, created_at FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list tags: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>> {
        sqlx::query_as::<_, Tag>("SELECT id, name, slug, created_at FROM tags WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn create(&self, name: &str, slug: &str) -> Result<Tag> {
        sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (name, slug)
            VALUES ($1, $2)
            RETURNING id, name, slug, created_at
            "#,
        )
        .bind(name)
        .bind(slug)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::from_unique_violation(e, format!("Tag '{}' or slug '{}' already exists", name, slug))
        })
    }
}
