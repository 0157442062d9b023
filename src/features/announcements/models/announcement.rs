use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for announcement
#[derive(Debug, Clone, FromRow)]
pub struct Announcement {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_important: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Announcement {
    /// Active and inside its validity window at `now` (both ends inclusive)
    pub fn is_current_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.start_date <= now && self.end_date.is_none_or(|end| now <= end)
    }

    pub fn is_current(&self) -> bool {
        self.is_current_at(Utc::now())
    }
}

#[derive(Debug, Clone)]
pub struct NewAnnouncement {
    pub title: String,
    pub content: String,
    pub author_id: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_important: bool,
}
