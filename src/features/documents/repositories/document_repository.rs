use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::documents::models::{Document, DocumentCategory, DocumentType, NewDocument};

/// Listing criteria; only active documents are ever listed
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub category: Option<DocumentCategory>,
    /// Case-insensitive substring of title or description
    pub query: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn insert(&self, kind: DocumentType, doc: NewDocument) -> Result<Document>;

    /// Persist the mutable columns of `doc` and return the stored row
    async fn update(&self, doc: &Document) -> Result<Document>;

    /// Active or not; callers decide what an inactive row means
    async fn find_by_id(&self, kind: DocumentType, id: i64) -> Result<Option<Document>>;

    /// Newest first, with the total count ignoring limit/offset
    async fn list(&self, kind: DocumentType, filter: &DocumentFilter) -> Result<(Vec<Document>, i64)>;

    /// Atomic `+1`; returns the new count
    async fn increment_download_count(&self, kind: DocumentType, id: i64) -> Result<i64>;

    async fn replace_tags(&self, kind: DocumentType, id: i64, tag_ids: &[i64]) -> Result<()>;
}

pub struct PgDocumentRepository {
    pool: PgPool,
}

impl PgDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn select_sql(kind: DocumentType) -> String {
        format!(
            r#"
            SELECT d.id, '{kind}'::document_type AS document_type, d.title, d.description,
                   d.file_key, d.file_name, d.content_type, d.external_url, d.source, d.category,
                   d.uploaded_by, d.download_count, d.is_active, d.auto_category, d.preview_url,
                   COALESCE(
                       (SELECT ARRAY_AGG(t.name ORDER BY t.name)
                        FROM document_tags dt
                        JOIN tags t ON t.id = dt.tag_id
                        WHERE dt.document_type = '{kind}'::document_type AND dt.document_id = d.id),
                       '{{}}'::TEXT[]
                   ) AS tags,
                   d.created_at, d.updated_at
            FROM {table} d
            "#,
            kind = kind.as_str(),
            table = kind.table(),
        )
    }
}

/// Escape LIKE metacharacters so user input matches literally
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

const LIST_FILTER: &str = r#"
    WHERE d.is_active = TRUE
      AND ($1::document_category IS NULL OR d.category = $1)
      AND ($2::TEXT IS NULL OR d.title ILIKE $2 OR d.description ILIKE $2)
"#;

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn insert(&self, kind: DocumentType, doc: NewDocument) -> Result<Document> {
        let (file_key, file_name, content_type) = match doc.file {
            Some(file) => (Some(file.key), Some(file.name), Some(file.content_type)),
            None => (None, None, None),
        };

        let sql = format!(
            r#"
            INSERT INTO {table}
                (title, description, file_key, file_name, content_type, external_url,
                 source, category, uploaded_by, auto_category, preview_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
            table = kind.table()
        );

        let id: i64 = sqlx::query_scalar(&sql)
            .bind(&doc.title)
            .bind(&doc.description)
            .bind(file_key)
            .bind(file_name)
            .bind(content_type)
            .bind(&doc.external_url)
            .bind(doc.source)
            .bind(doc.category)
            .bind(&doc.uploaded_by)
            .bind(&doc.auto_category)
            .bind(&doc.preview_url)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert {} document: {:?}", kind, e);
                AppError::Database(e)
            })?;

        self.find_by_id(kind, id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Inserted {} document {} vanished", kind, id)))
    }

    async fn update(&self, doc: &Document) -> Result<Document> {
        let kind = doc.document_type;
        let sql = format!(
            r#"
            UPDATE {table}
            SET title = $2, description = $3, external_url = $4, source = $5, category = $6,
                is_active = $7, auto_category = $8, preview_url = $9, updated_at = NOW()
            WHERE id = $1
            "#,
            table = kind.table()
        );

        let result = sqlx::query(&sql)
            .bind(doc.id)
            .bind(&doc.title)
            .bind(&doc.description)
            .bind(&doc.external_url)
            .bind(doc.source)
            .bind(doc.category)
            .bind(doc.is_active)
            .bind(&doc.auto_category)
            .bind(&doc.preview_url)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update {} document {}: {:?}", kind, doc.id, e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Document {} not found", doc.id)));
        }

        self.find_by_id(kind, doc.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Document {} not found", doc.id)))
    }

    async fn find_by_id(&self, kind: DocumentType, id: i64) -> Result<Option<Document>> {
        let sql = format!("{} WHERE d.id = $1", Self::select_sql(kind));

        sqlx::query_as::<_, Document>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch {} document {}: {:?}", kind, id, e);
                AppError::Database(e)
            })
    }

    async fn list(&self, kind: DocumentType, filter: &DocumentFilter) -> Result<(Vec<Document>, i64)> {
        let pattern = filter.query.as_deref().map(like_pattern);

        let list_sql = format!(
            "{} {} ORDER BY d.created_at DESC, d.id DESC LIMIT $3 OFFSET $4",
            Self::select_sql(kind),
            LIST_FILTER
        );
        let documents = sqlx::query_as::<_, Document>(&list_sql)
            .bind(filter.category)
            .bind(&pattern)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list {} documents: {:?}", kind, e);
                AppError::Database(e)
            })?;

        let count_sql = format!("SELECT COUNT(*) FROM {} d {}", kind.table(), LIST_FILTER);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(filter.category)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count {} documents: {:?}", kind, e);
                AppError::Database(e)
            })?;

        Ok((documents, total))
    }

    async fn increment_download_count(&self, kind: DocumentType, id: i64) -> Result<i64> {
        let sql = format!(
            "UPDATE {} SET download_count = download_count + 1 WHERE id = $1 RETURNING download_count",
            kind.table()
        );

        let count: Option<i64> = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to increment download count for {} {}: {:?}", kind, id, e);
                AppError::Database(e)
            })?;

        count.ok_or_else(|| AppError::NotFound(format!("Document {} not found", id)))
    }

    async fn replace_tags(&self, kind: DocumentType, id: i64, tag_ids: &[i64]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM document_tags WHERE document_type = $1 AND document_id = $2")
            .bind(kind)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if !tag_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO document_tags (document_type, document_id, tag_id)
                SELECT $1, $2, UNNEST($3::BIGINT[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(kind)
            .bind(id)
            .bind(tag_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
