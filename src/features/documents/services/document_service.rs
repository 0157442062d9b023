use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::documents::categorizer;
use crate::features::documents::dtos::{
    is_extension_allowed, DocumentPage, DocumentResponseDto, UpdateDocumentDto, ALLOWED_EXTENSIONS,
    MAX_FILE_SIZE,
};
use crate::features::documents::models::{
    validate_source, Document, DocumentCategory, DocumentSource, DocumentType, NewDocument,
    StoredFile,
};
use crate::features::documents::preview::PreviewRenderer;
use crate::features::documents::repositories::{DocumentFilter, DocumentRepository};
use crate::features::tags::models::Tag;
use crate::features::tags::TagService;
use crate::modules::storage::FileStorage;
use crate::shared::cache::{page_cache_prefix, TtlCache};
use crate::shared::types::PaginationQuery;
use crate::shared::validation::is_http_url;

/// Path prefix of the cached home overview
pub const HOME_PATH: &str = "/api/home";

const MAX_TITLE_CHARS: usize = 200;
const MAX_URL_CHARS: usize = 500;

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct CreateDocumentInput {
    pub title: String,
    pub description: String,
    pub category: DocumentCategory,
    pub source: DocumentSource,
    pub external_url: Option<String>,
    pub tags: Vec<String>,
    pub file: Option<UploadedFile>,
}

/// How a download request is answered
#[derive(Debug)]
pub enum DownloadOutcome {
    File {
        data: Vec<u8>,
        file_name: String,
        content_type: String,
    },
    Redirect(String),
}

pub struct DocumentService {
    repo: Arc<dyn DocumentRepository>,
    tags: Arc<TagService>,
    storage: Arc<dyn FileStorage>,
    cache: Arc<TtlCache>,
    previewer: PreviewRenderer,
    page_ttl: Duration,
}

impl DocumentService {
    pub fn new(
        repo: Arc<dyn DocumentRepository>,
        tags: Arc<TagService>,
        storage: Arc<dyn FileStorage>,
        cache: Arc<TtlCache>,
        previewer: PreviewRenderer,
        page_ttl: Duration,
    ) -> Self {
        Self {
            repo,
            tags,
            storage,
            cache,
            previewer,
            page_ttl,
        }
    }

    fn to_dto(&self, doc: Document) -> DocumentResponseDto {
        let file_url = doc.file_key.as_deref().map(|key| self.storage.file_url(key));
        DocumentResponseDto::from_document(doc, file_url)
    }

    /// Fill auto-category and preview URL when they are still empty
    fn derive_fields(
        &self,
        title: &str,
        description: &str,
        file_key: Option<&str>,
        auto_category: &mut Option<String>,
        preview_url: &mut Option<String>,
    ) -> Result<()> {
        if auto_category.as_deref().is_none_or(str::is_empty) {
            *auto_category = Some(categorizer::categorize(title, description).to_string());
        }

        if preview_url.as_deref().is_none_or(str::is_empty) {
            let file_url = file_key.map(|key| self.storage.file_url(key));
            *preview_url = self
                .previewer
                .render(file_url.as_deref())
                .map_err(|e| AppError::Internal(e.to_string()))?;
        }

        Ok(())
    }

    async fn find_active(&self, kind: DocumentType, id: i64) -> Result<Document> {
        self.repo
            .find_by_id(kind, id)
            .await?
            .filter(|doc| doc.is_active)
            .ok_or_else(|| AppError::NotFound(format!("Document {} not found", id)))
    }

    /// Drop cached listing pages of `kind` and the home overview
    async fn invalidate_pages(&self, kind: DocumentType) {
        self.cache
            .invalidate_prefix(&page_cache_prefix(&kind.list_path()))
            .await;
        self.cache.invalidate_prefix(&page_cache_prefix(HOME_PATH)).await;
    }

    /// One listing page, served from the page cache under `cache_key`
    pub async fn list_page(
        &self,
        kind: DocumentType,
        category: Option<DocumentCategory>,
        pagination: &PaginationQuery,
        cache_key: &str,
    ) -> Result<DocumentPage> {
        let filter = DocumentFilter {
            category,
            query: None,
            limit: pagination.limit(),
            offset: pagination.offset(),
        };

        self.cache
            .get_or_compute(cache_key, self.page_ttl, || async {
                let (docs, total) = self.repo.list(kind, &filter).await?;
                Ok::<_, AppError>(DocumentPage {
                    items: docs.into_iter().map(|d| self.to_dto(d)).collect(),
                    total,
                })
            })
            .await
    }

    pub async fn search(
        &self,
        kind: DocumentType,
        query: &str,
        pagination: &PaginationQuery,
    ) -> Result<DocumentPage> {
        let query = query.trim();
        let filter = DocumentFilter {
            category: None,
            query: (!query.is_empty()).then(|| query.to_string()),
            limit: pagination.limit(),
            offset: pagination.offset(),
        };

        let (docs, total) = self.repo.list(kind, &filter).await?;
        Ok(DocumentPage {
            items: docs.into_iter().map(|d| self.to_dto(d)).collect(),
            total,
        })
    }

    /// Newest active documents of `kind`
    pub async fn latest(&self, kind: DocumentType, limit: i64) -> Result<Vec<DocumentResponseDto>> {
        let filter = DocumentFilter {
            limit,
            ..Default::default()
        };
        let (docs, _) = self.repo.list(kind, &filter).await?;
        Ok(docs.into_iter().map(|d| self.to_dto(d)).collect())
    }

    pub async fn get(&self, kind: DocumentType, id: i64) -> Result<DocumentResponseDto> {
        let doc = self.find_active(kind, id).await?;
        Ok(self.to_dto(doc))
    }

    pub async fn create(
        &self,
        kind: DocumentType,
        input: CreateDocumentInput,
        uploaded_by: Option<&str>,
    ) -> Result<DocumentResponseDto> {
        let title = input.title.trim().to_string();
        if title.is_empty() || title.chars().count() > MAX_TITLE_CHARS {
            return Err(AppError::Validation(format!(
                "Title must be 1-{} characters",
                MAX_TITLE_CHARS
            )));
        }

        if input.category.document_type() != kind {
            return Err(AppError::Validation(format!(
                "Invalid category for {}: {}",
                kind, input.category
            )));
        }

        let external_url = input
            .external_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        if let Some(url) = &external_url {
            if url.chars().count() > MAX_URL_CHARS || !is_http_url(url) {
                return Err(AppError::Validation(
                    "external_url must be a valid URL of at most 500 characters".to_string(),
                ));
            }
        }

        validate_source(input.source, input.file.is_some(), external_url.as_deref())?;

        if let Some(file) = &input.file {
            if file.data.len() > MAX_FILE_SIZE {
                return Err(AppError::BadRequest(format!(
                    "File too large. Maximum size is {} MB",
                    MAX_FILE_SIZE / 1024 / 1024
                )));
            }
            if !is_extension_allowed(&file.file_name) {
                return Err(AppError::BadRequest(format!(
                    "File type of '{}' is not allowed. Allowed extensions: {}",
                    file.file_name,
                    ALLOWED_EXTENSIONS.join(", ")
                )));
            }
        }

        // Tags resolve before any file or row is written
        let tags = TagService::normalize_names(&input.tags)?;
        let tags = if tags.is_empty() {
            Vec::new()
        } else {
            self.tags.ensure_tags(&tags).await?
        };

        let stored = match input.file {
            Some(file) => Some(self.store_file(kind, file).await?),
            None => None,
        };

        let mut new_doc = NewDocument {
            title,
            description: input.description.trim().to_string(),
            category: input.category,
            source: input.source,
            file: stored,
            external_url,
            uploaded_by: uploaded_by.map(str::to_string),
            auto_category: None,
            preview_url: None,
        };
        self.derive_fields(
            &new_doc.title,
            &new_doc.description,
            new_doc.file.as_ref().map(|f| f.key.as_str()),
            &mut new_doc.auto_category,
            &mut new_doc.preview_url,
        )?;

        let mut doc = self.repo.insert(kind, new_doc).await?;

        if !tags.is_empty() {
            doc.tags = self.link_tags(kind, doc.id, tags).await?;
        }

        self.invalidate_pages(kind).await;
        tracing::info!(
            "Created {} document {} ('{}', source={})",
            kind,
            doc.id,
            doc.title,
            doc.source
        );

        Ok(self.to_dto(doc))
    }

    async fn store_file(&self, kind: DocumentType, file: UploadedFile) -> Result<StoredFile> {
        let extension = file
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_else(|| "bin".to_string());
        let key = self
            .storage
            .object_key(&format!("{}/{}.{}", kind, Uuid::now_v7(), extension));

        let key = self.storage.upload(&key, file.data, &file.content_type).await?;
        tracing::debug!("Stored upload '{}' as {}", file.file_name, key);

        Ok(StoredFile {
            key,
            name: file.file_name,
            content_type: file.content_type,
        })
    }

    async fn link_tags(&self, kind: DocumentType, id: i64, tags: Vec<Tag>) -> Result<Vec<String>> {
        let ids: Vec<i64> = tags.iter().map(|t| t.id).collect();
        self.repo.replace_tags(kind, id, &ids).await?;

        let mut names: Vec<String> = tags.into_iter().map(|t| t.name).collect();
        names.sort();
        Ok(names)
    }

    pub async fn update(
        &self,
        kind: DocumentType,
        id: i64,
        dto: UpdateDocumentDto,
        user: &AuthenticatedUser,
    ) -> Result<DocumentResponseDto> {
        let mut doc = self.find_active(kind, id).await?;

        if !user.can_modify(doc.uploaded_by.as_deref()) {
            return Err(AppError::Forbidden(
                "Only the uploader or staff can edit this document".to_string(),
            ));
        }

        if let Some(title) = dto.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(AppError::Validation("Title must not be blank".to_string()));
            }
            doc.title = title;
        }
        if let Some(description) = dto.description {
            doc.description = description.trim().to_string();
        }
        if let Some(category) = dto.category {
            doc.category = kind.parse_category(&category).ok_or_else(|| {
                AppError::Validation(format!("Invalid category for {}: {}", kind, category))
            })?;
        }
        if let Some(source) = dto.source {
            doc.source = source;
        }
        if let Some(url) = dto.external_url {
            let url = url.trim().to_string();
            if !url.is_empty() && (url.chars().count() > MAX_URL_CHARS || !is_http_url(&url)) {
                return Err(AppError::Validation(
                    "external_url must be a valid URL of at most 500 characters".to_string(),
                ));
            }
            doc.external_url = (!url.is_empty()).then_some(url);
        }

        validate_source(doc.source, doc.has_file(), doc.external_url.as_deref())?;

        let tags = match dto.tags {
            Some(names) => {
                let names = TagService::normalize_names(&names)?;
                Some(self.tags.ensure_tags(&names).await?)
            }
            None => None,
        };

        let mut auto_category = doc.auto_category.take();
        let mut preview_url = doc.preview_url.take();
        self.derive_fields(
            &doc.title,
            &doc.description,
            doc.file_key.as_deref(),
            &mut auto_category,
            &mut preview_url,
        )?;
        doc.auto_category = auto_category;
        doc.preview_url = preview_url;

        let mut updated = self.repo.update(&doc).await?;

        if let Some(tags) = tags {
            updated.tags = self.link_tags(kind, id, tags).await?;
        }

        self.invalidate_pages(kind).await;
        tracing::info!("Updated {} document {} by {}", kind, id, user.sub);

        Ok(self.to_dto(updated))
    }

    /// Soft delete: the row stays, flagged inactive
    pub async fn delete(&self, kind: DocumentType, id: i64, user: &AuthenticatedUser) -> Result<()> {
        let mut doc = self.find_active(kind, id).await?;

        if !user.can_modify(doc.uploaded_by.as_deref()) {
            return Err(AppError::Forbidden(
                "Only the uploader or staff can delete this document".to_string(),
            ));
        }

        doc.is_active = false;
        self.repo.update(&doc).await?;

        self.invalidate_pages(kind).await;
        tracing::info!("Deactivated {} document {} by {}", kind, id, user.sub);
        Ok(())
    }

    /// Resolve how the document is delivered, then count the download.
    ///
    /// The counter only moves once delivery has been resolved; unavailable
    /// documents and failed storage reads leave it untouched.
    pub async fn download(&self, kind: DocumentType, id: i64) -> Result<DownloadOutcome> {
        let doc = self.find_active(kind, id).await?;

        let outcome = match (doc.source, doc.file_key.as_deref(), doc.external_url.as_deref()) {
            (DocumentSource::Manual, Some(key), _) => {
                let data = self.storage.download(key).await?;
                DownloadOutcome::File {
                    data,
                    file_name: doc
                        .file_name
                        .clone()
                        .unwrap_or_else(|| format!("document-{}", doc.id)),
                    content_type: doc
                        .content_type
                        .clone()
                        .unwrap_or_else(|| "application/octet-stream".to_string()),
                }
            }
            (DocumentSource::GoogleDrive | DocumentSource::N8n, _, Some(url))
                if !url.trim().is_empty() =>
            {
                DownloadOutcome::Redirect(url.to_string())
            }
            _ => {
                tracing::warn!("{} document {} has nothing to deliver", kind, id);
                return Err(AppError::NotFound("Document unavailable".to_string()));
            }
        };

        let count = self.repo.increment_download_count(kind, id).await?;
        tracing::debug!("{} document {} downloaded ({} total)", kind, id, count);

        Ok(outcome)
    }
}
