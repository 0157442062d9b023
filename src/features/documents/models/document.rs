use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::core::error::AppError;

/// The two parallel document hierarchies, each stored in its own table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "document_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Insurance,
    Investment,
}

impl DocumentType {
    pub const ALL: [DocumentType; 2] = [DocumentType::Insurance, DocumentType::Investment];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Insurance => "insurance",
            DocumentType::Investment => "investment",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::Insurance => "保險文件",
            DocumentType::Investment => "投資文件",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            DocumentType::Insurance => "insurance_documents",
            DocumentType::Investment => "investment_documents",
        }
    }

    pub fn categories(&self) -> &'static [DocumentCategory] {
        match self {
            DocumentType::Insurance => &[
                DocumentCategory::Calculator,
                DocumentCategory::Promotion,
                DocumentCategory::Company,
            ],
            DocumentType::Investment => &[
                DocumentCategory::UsStock,
                DocumentCategory::Monthly,
                DocumentCategory::Strategy,
            ],
        }
    }

    /// Parse a category that must belong to this hierarchy
    pub fn parse_category(&self, value: &str) -> Option<DocumentCategory> {
        value
            .parse::<DocumentCategory>()
            .ok()
            .filter(|category| category.document_type() == *self)
    }

    /// Listing path whose cached pages must be dropped after a write
    pub fn list_path(&self) -> String {
        format!("/api/documents/{}", self.as_str())
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "insurance" => Ok(DocumentType::Insurance),
            "investment" => Ok(DocumentType::Investment),
            other => Err(format!("Invalid document_type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "document_category", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    Calculator,
    Promotion,
    Company,
    UsStock,
    Monthly,
    Strategy,
}

impl DocumentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentCategory::Calculator => "calculator",
            DocumentCategory::Promotion => "promotion",
            DocumentCategory::Company => "company",
            DocumentCategory::UsStock => "us_stock",
            DocumentCategory::Monthly => "monthly",
            DocumentCategory::Strategy => "strategy",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentCategory::Calculator => "保險試算表",
            DocumentCategory::Promotion => "保險優惠",
            DocumentCategory::Company => "保司介紹",
            DocumentCategory::UsStock => "美股報告",
            DocumentCategory::Monthly => "投資月報",
            DocumentCategory::Strategy => "策略報告",
        }
    }

    pub fn document_type(&self) -> DocumentType {
        match self {
            DocumentCategory::Calculator
            | DocumentCategory::Promotion
            | DocumentCategory::Company => DocumentType::Insurance,
            DocumentCategory::UsStock | DocumentCategory::Monthly | DocumentCategory::Strategy => {
                DocumentType::Investment
            }
        }
    }
}

impl std::fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "calculator" => Ok(DocumentCategory::Calculator),
            "promotion" => Ok(DocumentCategory::Promotion),
            "company" => Ok(DocumentCategory::Company),
            "us_stock" => Ok(DocumentCategory::UsStock),
            "monthly" => Ok(DocumentCategory::Monthly),
            "strategy" => Ok(DocumentCategory::Strategy),
            other => Err(format!("Invalid category: {}", other)),
        }
    }
}

/// Where the document's content comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "document_source", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DocumentSource {
    /// Uploaded file stored in object storage
    Manual,
    /// Shared Google Drive link
    GoogleDrive,
    /// Pushed by the n8n automation through the ingestion API
    N8n,
}

impl DocumentSource {
    pub fn label(&self) -> &'static str {
        match self {
            DocumentSource::Manual => "手動上傳",
            DocumentSource::GoogleDrive => "Google Drive",
            DocumentSource::N8n => "n8n 自動化",
        }
    }
}

impl std::fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentSource::Manual => write!(f, "manual"),
            DocumentSource::GoogleDrive => write!(f, "google_drive"),
            DocumentSource::N8n => write!(f, "n8n"),
        }
    }
}

impl FromStr for DocumentSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(DocumentSource::Manual),
            "google_drive" => Ok(DocumentSource::GoogleDrive),
            "n8n" => Ok(DocumentSource::N8n),
            other => Err(format!("Invalid source: {}", other)),
        }
    }
}

/// Database model shared by both document tables
#[derive(Debug, Clone, FromRow)]
pub struct Document {
    pub id: i64,
    pub document_type: DocumentType,
    pub title: String,
    pub description: String,
    pub file_key: Option<String>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub external_url: Option<String>,
    pub source: DocumentSource,
    pub category: DocumentCategory,
    pub uploaded_by: Option<String>,
    pub download_count: i64,
    pub is_active: bool,
    pub auto_category: Option<String>,
    pub preview_url: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn has_file(&self) -> bool {
        self.file_key.is_some()
    }
}

/// File already written to object storage
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub key: String,
    pub name: String,
    pub content_type: String,
}

/// Insert payload; derived fields are filled in by the service before persisting
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    pub description: String,
    pub category: DocumentCategory,
    pub source: DocumentSource,
    pub file: Option<StoredFile>,
    pub external_url: Option<String>,
    pub uploaded_by: Option<String>,
    pub auto_category: Option<String>,
    pub preview_url: Option<String>,
}

/// Manual documents need a file, linked ones a non-empty URL
pub fn validate_source(
    source: DocumentSource,
    has_file: bool,
    external_url: Option<&str>,
) -> Result<(), AppError> {
    match source {
        DocumentSource::Manual if !has_file => Err(AppError::Validation(
            "A file is required when source is manual".to_string(),
        )),
        DocumentSource::GoogleDrive | DocumentSource::N8n
            if external_url.is_none_or(|url| url.trim().is_empty()) =>
        {
            Err(AppError::Validation(format!(
                "external_url is required when source is {}",
                source
            )))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_belong_to_their_hierarchy() {
        for kind in DocumentType::ALL {
            for category in kind.categories() {
                assert_eq!(category.document_type(), kind);
                assert_eq!(kind.parse_category(category.as_str()), Some(*category));
            }
        }

        assert_eq!(DocumentType::Insurance.parse_category("us_stock"), None);
        assert_eq!(DocumentType::Investment.parse_category("calculator"), None);
        assert_eq!(DocumentType::Investment.parse_category("bogus"), None);
    }

    #[test]
    fn test_document_type_parsing() {
        assert_eq!("insurance".parse::<DocumentType>(), Ok(DocumentType::Insurance));
        assert_eq!(
            "pension".parse::<DocumentType>(),
            Err("Invalid document_type: pension".to_string())
        );
    }

    #[test]
    fn test_validate_source() {
        assert!(validate_source(DocumentSource::Manual, true, None).is_ok());
        assert!(matches!(
            validate_source(DocumentSource::Manual, false, Some("https://x.io/a.pdf")),
            Err(AppError::Validation(_))
        ));

        assert!(validate_source(DocumentSource::GoogleDrive, false, Some("https://drive.google.com/f")).is_ok());
        assert!(validate_source(DocumentSource::N8n, false, None).is_err());
        assert!(validate_source(DocumentSource::N8n, true, Some("   ")).is_err());
    }
}
