use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::content::catalog::{ContentItem, ContentSection, Subcategory};
use crate::features::documents::models::DocumentType;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContentItemDto {
    pub title: String,
    pub summary: String,
    pub date: String,
}

impl From<&ContentItem> for ContentItemDto {
    fn from(item: &ContentItem) -> Self {
        Self {
            title: item.title.to_string(),
            summary: item.summary.to_string(),
            date: item.date.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContentSectionDto {
    pub category: DocumentType,
    pub subcategory: Subcategory,
    pub heading: String,
    pub items: Vec<ContentItemDto>,
}

impl From<&ContentSection> for ContentSectionDto {
    fn from(section: &ContentSection) -> Self {
        Self {
            category: section.category,
            subcategory: section.subcategory,
            heading: section.heading.to_string(),
            items: section.items.iter().map(Into::into).collect(),
        }
    }
}
