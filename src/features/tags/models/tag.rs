use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for tag
#[derive(Debug, Clone, FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}
