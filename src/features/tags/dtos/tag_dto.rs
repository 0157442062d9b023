use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::tags::models::Tag;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TagResponseDto {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

impl From<Tag> for TagResponseDto {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            slug: tag.slug,
            created_at: tag.created_at,
        }
    }
}

/// Request DTO for creating a tag
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTagDto {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: String,

    /// Derived from the name when omitted
    #[validate(
        length(min = 1, max = 60, message = "Slug must be 1-60 characters"),
        regex(
            path = "*crate::shared::validation::SLUG_REGEX",
            message = "Slug must be lowercase alphanumeric with single hyphens"
        )
    )]
    #[serde(default)]
    pub slug: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tag_validation() {
        let ok = CreateTagDto {
            name: "美股".to_string(),
            slug: None,
        };
        assert!(ok.validate().is_ok());

        let long_name = CreateTagDto {
            name: "x".repeat(51),
            slug: None,
        };
        assert!(long_name.validate().is_err());

        let bad_slug = CreateTagDto {
            name: "US Stock".to_string(),
            slug: Some("US_Stock".to_string()),
        };
        assert!(bad_slug.validate().is_err());
    }
}
