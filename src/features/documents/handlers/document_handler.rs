use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, Uri},
    response::Response,
    Json,
};
use serde_json::json;
use tracing::debug;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, RequestContext};
use crate::features::activity_logs::models::ActivityAction;
use crate::features::activity_logs::{Activity, ActivityLogService};
use crate::features::auth::guards::RequireStaff;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::documents::dtos::{
    CreateDocumentForm, DocumentListQuery, DocumentResponseDto, DocumentSearchQuery,
    DocumentTaxonomyDto, UpdateDocumentDto,
};
use crate::features::documents::models::{DocumentSource, DocumentType};
use crate::features::documents::services::{
    CreateDocumentInput, DocumentService, DownloadOutcome, UploadedFile,
};
use crate::shared::cache::page_cache_key;
use crate::shared::http::{attachment_response, found_redirect};
use crate::shared::types::{ApiResponse, Meta};

/// State for document handlers
#[derive(Clone)]
pub struct DocumentState {
    pub documents: Arc<DocumentService>,
    pub activity: Arc<ActivityLogService>,
}

fn parse_document_type(raw: &str) -> Result<DocumentType> {
    raw.parse::<DocumentType>()
        .map_err(|_| AppError::NotFound(format!("Unknown document type '{}'", raw)))
}

/// Category taxonomy of both document hierarchies
#[utoipa::path(
    get,
    path = "/api/documents/categories",
    responses(
        (status = 200, description = "Categories per document type", body = ApiResponse<Vec<DocumentTaxonomyDto>>)
    ),
    tag = "documents",
    security(("bearer_auth" = []))
)]
pub async fn list_categories() -> Json<ApiResponse<Vec<DocumentTaxonomyDto>>> {
    let taxonomy = DocumentType::ALL
        .into_iter()
        .map(DocumentTaxonomyDto::for_type)
        .collect();
    Json(ApiResponse::success(Some(taxonomy), None, None))
}

/// List active documents of one type, newest first
#[utoipa::path(
    get,
    path = "/api/documents/{document_type}",
    params(
        ("document_type" = DocumentType, Path, description = "insurance or investment"),
        DocumentListQuery
    ),
    responses(
        (status = 200, description = "One page of documents", body = ApiResponse<Vec<DocumentResponseDto>>),
        (status = 400, description = "Unknown category for this document type"),
        (status = 404, description = "Unknown document type")
    ),
    tag = "documents",
    security(("bearer_auth" = []))
)]
pub async fn list_documents(
    user: AuthenticatedUser,
    ctx: RequestContext,
    State(state): State<DocumentState>,
    Path(document_type): Path<String>,
    Query(query): Query<DocumentListQuery>,
    uri: Uri,
) -> Result<Json<ApiResponse<Vec<DocumentResponseDto>>>> {
    let kind = parse_document_type(&document_type)?;
    let category = match query.category.as_deref().filter(|c| !c.is_empty()) {
        Some(raw) => Some(kind.parse_category(raw).ok_or_else(|| {
            AppError::BadRequest(format!("Invalid category for {}: {}", kind, raw))
        })?),
        None => None,
    };
    let pagination = query.pagination();
    let cache_key = page_cache_key(uri.path(), uri.query());

    let page = state
        .activity
        .track(
            Some(&user),
            Some(&ctx),
            Activity::new(ActivityAction::View, kind),
            state
                .documents
                .list_page(kind, category, &pagination, &cache_key),
        )
        .await?;

    Ok(Json(ApiResponse::success(
        Some(page.items),
        None,
        Some(Meta::paginated(page.total, &pagination)),
    )))
}

/// Search active documents by title or description
#[utoipa::path(
    get,
    path = "/api/documents/{document_type}/search",
    params(
        ("document_type" = DocumentType, Path, description = "insurance or investment"),
        DocumentSearchQuery
    ),
    responses(
        (status = 200, description = "Matching documents", body = ApiResponse<Vec<DocumentResponseDto>>),
        (status = 404, description = "Unknown document type")
    ),
    tag = "documents",
    security(("bearer_auth" = []))
)]
pub async fn search_documents(
    user: AuthenticatedUser,
    ctx: RequestContext,
    State(state): State<DocumentState>,
    Path(document_type): Path<String>,
    Query(query): Query<DocumentSearchQuery>,
) -> Result<Json<ApiResponse<Vec<DocumentResponseDto>>>> {
    let kind = parse_document_type(&document_type)?;
    let pagination = query.pagination();

    let page = state
        .activity
        .track(
            Some(&user),
            Some(&ctx),
            Activity::new(ActivityAction::Search, kind).details(json!({ "query": query.q })),
            state.documents.search(kind, &query.q, &pagination),
        )
        .await?;

    Ok(Json(ApiResponse::success(
        Some(page.items),
        None,
        Some(Meta::paginated(page.total, &pagination)),
    )))
}

/// Get one active document
#[utoipa::path(
    get,
    path = "/api/documents/{document_type}/{id}",
    params(
        ("document_type" = DocumentType, Path, description = "insurance or investment"),
        ("id" = i64, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Document found", body = ApiResponse<DocumentResponseDto>),
        (status = 404, description = "Document not found")
    ),
    tag = "documents",
    security(("bearer_auth" = []))
)]
pub async fn get_document(
    user: AuthenticatedUser,
    ctx: RequestContext,
    State(state): State<DocumentState>,
    Path((document_type, id)): Path<(String, i64)>,
) -> Result<Json<ApiResponse<DocumentResponseDto>>> {
    let kind = parse_document_type(&document_type)?;

    let document = state
        .activity
        .track(
            Some(&user),
            Some(&ctx),
            Activity::new(ActivityAction::View, kind).document(id),
            state.documents.get(kind, id),
        )
        .await?;

    Ok(Json(ApiResponse::success(Some(document), None, None)))
}

/// Upload a document (staff only)
///
/// Accepts multipart/form-data with `title`, `category`, optional
/// `description`, `source`, `external_url`, comma separated `tags` and `file`.
#[utoipa::path(
    post,
    path = "/api/documents/{document_type}",
    params(
        ("document_type" = DocumentType, Path, description = "insurance or investment")
    ),
    request_body(
        content = CreateDocumentForm,
        content_type = "multipart/form-data",
        description = "Document metadata plus the file for manual uploads",
    ),
    responses(
        (status = 201, description = "Document created", body = ApiResponse<DocumentResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Staff access required"),
        (status = 404, description = "Unknown document type"),
        (status = 413, description = "File too large")
    ),
    tag = "documents",
    security(("bearer_auth" = []))
)]
pub async fn create_document(
    RequireStaff(user): RequireStaff,
    ctx: RequestContext,
    State(state): State<DocumentState>,
    Path(document_type): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<DocumentResponseDto>>)> {
    let kind = parse_document_type(&document_type)?;

    let mut title: Option<String> = None;
    let mut description = String::new();
    let mut category: Option<String> = None;
    let mut source = DocumentSource::Manual;
    let mut external_url: Option<String> = None;
    let mut tags: Vec<String> = Vec::new();
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name == "file" {
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let file_name = field.file_name().unwrap_or("").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read file data: {}", e)))?;

            // Browsers send an empty part when no file was chosen
            if !file_name.is_empty() || !data.is_empty() {
                file = Some(UploadedFile {
                    file_name,
                    content_type,
                    data: data.to_vec(),
                });
            }
            continue;
        }

        let text = field.text().await.map_err(|e| {
            AppError::BadRequest(format!("Failed to read field '{}': {}", field_name, e))
        })?;

        match field_name.as_str() {
            "title" => title = Some(text),
            "description" => description = text,
            "category" => category = Some(text),
            "source" if !text.trim().is_empty() => {
                source = text
                    .trim()
                    .parse()
                    .map_err(AppError::Validation)?;
            }
            "external_url" => external_url = Some(text),
            "tags" => {
                tags = text
                    .split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect();
            }
            _ => debug!("Ignoring unknown field: {}", field_name),
        }
    }

    let title = title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Validation("title is required".to_string()))?;
    let category = category
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::Validation("category is required".to_string()))?;
    let category = kind.parse_category(category.trim()).ok_or_else(|| {
        AppError::Validation(format!("Invalid category for {}: {}", kind, category))
    })?;

    let input = CreateDocumentInput {
        title,
        description,
        category,
        source,
        external_url,
        tags,
        file,
    };

    let document = state.documents.create(kind, input, Some(&user.sub)).await?;

    let activity = Activity::new(ActivityAction::Create, kind)
        .document(document.id)
        .titled(document.title.clone());
    if let Err(e) = state.activity.record(Some(&user), Some(&ctx), activity).await {
        tracing::warn!("Failed to write activity log: {}", e);
    }

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(document),
            Some("Document created successfully".to_string()),
            None,
        )),
    ))
}

/// Update a document (uploader or staff)
#[utoipa::path(
    put,
    path = "/api/documents/{document_type}/{id}",
    params(
        ("document_type" = DocumentType, Path, description = "insurance or investment"),
        ("id" = i64, Path, description = "Document ID")
    ),
    request_body = UpdateDocumentDto,
    responses(
        (status = 200, description = "Document updated", body = ApiResponse<DocumentResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Not the uploader or staff"),
        (status = 404, description = "Document not found")
    ),
    tag = "documents",
    security(("bearer_auth" = []))
)]
pub async fn update_document(
    user: AuthenticatedUser,
    ctx: RequestContext,
    State(state): State<DocumentState>,
    Path((document_type, id)): Path<(String, i64)>,
    AppJson(dto): AppJson<UpdateDocumentDto>,
) -> Result<Json<ApiResponse<DocumentResponseDto>>> {
    let kind = parse_document_type(&document_type)?;
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let document = state
        .activity
        .track(
            Some(&user),
            Some(&ctx),
            Activity::new(ActivityAction::Update, kind).document(id),
            state.documents.update(kind, id, dto, &user),
        )
        .await?;

    Ok(Json(ApiResponse::success(
        Some(document),
        Some("Document updated successfully".to_string()),
        None,
    )))
}

/// Deactivate a document (uploader or staff)
#[utoipa::path(
    delete,
    path = "/api/documents/{document_type}/{id}",
    params(
        ("document_type" = DocumentType, Path, description = "insurance or investment"),
        ("id" = i64, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Document deactivated"),
        (status = 403, description = "Not the uploader or staff"),
        (status = 404, description = "Document not found")
    ),
    tag = "documents",
    security(("bearer_auth" = []))
)]
pub async fn delete_document(
    user: AuthenticatedUser,
    ctx: RequestContext,
    State(state): State<DocumentState>,
    Path((document_type, id)): Path<(String, i64)>,
) -> Result<Json<ApiResponse<()>>> {
    let kind = parse_document_type(&document_type)?;

    state
        .activity
        .track(
            Some(&user),
            Some(&ctx),
            Activity::new(ActivityAction::Delete, kind).document(id),
            state.documents.delete(kind, id, &user),
        )
        .await?;

    Ok(Json(ApiResponse::success(
        None,
        Some("Document deleted successfully".to_string()),
        None,
    )))
}

/// Download a document
///
/// Uploaded files are streamed as attachments; linked documents redirect
/// to their external URL.
#[utoipa::path(
    get,
    path = "/api/documents/{document_type}/{id}/download",
    params(
        ("document_type" = DocumentType, Path, description = "insurance or investment"),
        ("id" = i64, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 302, description = "Redirect to the external URL"),
        (status = 404, description = "Document not found or unavailable"),
        (status = 500, description = "Stored file could not be read")
    ),
    tag = "documents",
    security(("bearer_auth" = []))
)]
pub async fn download_document(
    user: AuthenticatedUser,
    ctx: RequestContext,
    State(state): State<DocumentState>,
    Path((document_type, id)): Path<(String, i64)>,
) -> Result<Response> {
    let kind = parse_document_type(&document_type)?;

    let outcome = state
        .activity
        .track(
            Some(&user),
            Some(&ctx),
            Activity::new(ActivityAction::Download, kind).document(id),
            state.documents.download(kind, id),
        )
        .await?;

    match outcome {
        DownloadOutcome::File {
            data,
            file_name,
            content_type,
        } => attachment_response(data, &file_name, &content_type),
        DownloadOutcome::Redirect(url) => found_redirect(&url),
    }
}
