use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::features::announcements::models::Announcement;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnnouncementResponseDto {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_important: bool,
    /// Active and inside the validity window right now
    pub is_current: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Announcement> for AnnouncementResponseDto {
    fn from(a: Announcement) -> Self {
        let is_current = a.is_current();
        Self {
            id: a.id,
            title: a.title,
            content: a.content,
            author_id: a.author_id,
            start_date: a.start_date,
            end_date: a.end_date,
            is_active: a.is_active,
            is_important: a.is_important,
            is_current,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

/// End of the window may not precede its start
pub(crate) fn check_window(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<(), ValidationError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => {
            let mut err = ValidationError::new("window");
            err.message = Some("end_date must not be before start_date".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

fn validate_create_window(dto: &CreateAnnouncementDto) -> Result<(), ValidationError> {
    check_window(Some(dto.start_date.unwrap_or_else(Utc::now)), dto.end_date)
}

fn validate_update_window(dto: &UpdateAnnouncementDto) -> Result<(), ValidationError> {
    check_window(dto.start_date, dto.end_date)
}

/// Request DTO for publishing an announcement
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_create_window"))]
pub struct CreateAnnouncementDto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,

    /// Defaults to now
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub is_important: bool,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Partial update; the merged window is re-checked by the service
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_update_window"))]
pub struct UpdateAnnouncementDto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: Option<String>,

    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_important: Option<bool>,
    pub is_active: Option<bool>,
}
