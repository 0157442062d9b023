use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::documents::models::{
    Document, DocumentCategory, DocumentSource, DocumentType,
};
use crate::shared::constants::DEFAULT_PAGE_SIZE;
use crate::shared::types::PaginationQuery;

/// Maximum accepted upload size
pub const MAX_FILE_SIZE: usize = 20 * 1024 * 1024; // 20MB

/// Accepted upload extensions (lowercase, without the dot)
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "xls", "xlsx", "txt"];

pub fn is_extension_allowed(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentResponseDto {
    pub id: i64,
    pub document_type: DocumentType,
    pub title: String,
    pub description: String,
    pub category: DocumentCategory,
    /// Display label of the category
    pub category_label: String,
    pub source: DocumentSource,
    pub file_name: Option<String>,
    /// Direct storage URL of the uploaded file
    pub file_url: Option<String>,
    pub external_url: Option<String>,
    pub preview_url: Option<String>,
    pub auto_category: Option<String>,
    /// Portal endpoint that serves or redirects to the content
    pub download_url: String,
    pub download_count: i64,
    pub uploaded_by: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentResponseDto {
    pub fn from_document(doc: Document, file_url: Option<String>) -> Self {
        Self {
            download_url: format!("/api/documents/{}/{}/download", doc.document_type, doc.id),
            category_label: doc.category.label().to_string(),
            id: doc.id,
            document_type: doc.document_type,
            title: doc.title,
            description: doc.description,
            category: doc.category,
            source: doc.source,
            file_name: doc.file_name,
            file_url,
            external_url: doc.external_url,
            preview_url: doc.preview_url,
            auto_category: doc.auto_category,
            download_count: doc.download_count,
            uploaded_by: doc.uploaded_by,
            tags: doc.tags,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

/// One page of documents, the shape stored in the page cache
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DocumentPage {
    pub items: Vec<DocumentResponseDto>,
    pub total: i64,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct DocumentListQuery {
    /// Category value belonging to the requested document type
    pub category: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct DocumentSearchQuery {
    /// Matched case-insensitively against title and description
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl DocumentListQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::new(self.page, self.page_size)
    }
}

impl DocumentSearchQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::new(self.page, self.page_size)
    }
}

/// Upload form for OpenAPI documentation.
/// The handler reads the multipart stream directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct CreateDocumentForm {
    #[schema(example = "2024 年金險試算表")]
    pub title: String,
    pub description: Option<String>,
    #[schema(example = "calculator")]
    pub category: String,
    /// manual (default), google_drive or n8n
    #[schema(example = "manual")]
    pub source: Option<String>,
    /// Required unless source is manual
    pub external_url: Option<String>,
    /// Comma separated tag names
    #[schema(example = "年金,試算")]
    pub tags: Option<String>,
    /// Required when source is manual (pdf, doc, docx, xls, xlsx, txt; max 20MB)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: Option<String>,
}

/// Partial update; omitted fields keep their value
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateDocumentDto {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    pub description: Option<String>,

    pub category: Option<String>,

    pub source: Option<DocumentSource>,

    /// Empty string clears the link
    #[validate(
        custom(function = "crate::shared::validation::validate_link"),
        length(max = 500, message = "external_url must not exceed 500 characters")
    )]
    pub external_url: Option<String>,

    /// Replaces the tag set when present
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryOptionDto {
    pub value: DocumentCategory,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SourceOptionDto {
    pub value: DocumentSource,
    pub label: String,
}

/// Category taxonomy of one document hierarchy
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DocumentTaxonomyDto {
    pub document_type: DocumentType,
    pub label: String,
    pub categories: Vec<CategoryOptionDto>,
    pub sources: Vec<SourceOptionDto>,
}

impl DocumentTaxonomyDto {
    pub fn for_type(kind: DocumentType) -> Self {
        Self {
            document_type: kind,
            label: kind.label().to_string(),
            categories: kind
                .categories()
                .iter()
                .map(|c| CategoryOptionDto {
                    value: *c,
                    label: c.label().to_string(),
                })
                .collect(),
            sources: [
                DocumentSource::Manual,
                DocumentSource::GoogleDrive,
                DocumentSource::N8n,
            ]
            .into_iter()
            .map(|s| SourceOptionDto {
                value: s,
                label: s.label().to_string(),
            })
            .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extensions() {
        assert!(is_extension_allowed("report.PDF"));
        assert!(is_extension_allowed("試算表.xlsx"));
        assert!(!is_extension_allowed("script.exe"));
        assert!(!is_extension_allowed("no_extension"));
        assert!(!is_extension_allowed("archive.pdf.zip"));
    }

    #[test]
    fn test_update_dto_validation() {
        let dto = UpdateDocumentDto {
            external_url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(dto.validate().is_err());

        let dto = UpdateDocumentDto {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(dto.validate().is_err());

        let dto = UpdateDocumentDto {
            external_url: Some("javascript:alert(1)".to_string()),
            ..Default::default()
        };
        assert!(dto.validate().is_err());

        let dto = UpdateDocumentDto {
            external_url: Some(String::new()),
            ..Default::default()
        };
        assert!(dto.validate().is_ok());

        let dto = UpdateDocumentDto {
            title: Some("美股週報".to_string()),
            external_url: Some("https://drive.google.com/file/d/1".to_string()),
            ..Default::default()
        };
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_taxonomy_lists_type_categories() {
        let taxonomy = DocumentTaxonomyDto::for_type(DocumentType::Investment);
        let values: Vec<&str> = taxonomy.categories.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, vec!["us_stock", "monthly", "strategy"]);
        assert_eq!(taxonomy.categories[0].label, "美股報告");
    }
}
