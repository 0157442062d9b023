use utoipa::openapi::security::{
    ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme,
};
use utoipa::{Modify, OpenApi};

use crate::features::activity_logs::{dtos as activity_dtos, handlers as activity_handlers};
use crate::features::announcements::{dtos as announcement_dtos, handlers as announcement_handlers};
use crate::features::auth;
use crate::features::content::{catalog, dtos as content_dtos, handlers as content_handlers};
use crate::features::documents::{
    dtos as document_dtos, handlers as document_handlers, models as document_models,
};
use crate::features::home::{dtos as home_dtos, handlers as home_handlers};
use crate::features::ingest::{dtos as ingest_dtos, handlers as ingest_handlers};
use crate::features::sync::{dtos as sync_dtos, handlers as sync_handlers};
use crate::features::tags::{dtos as tag_dtos, handlers as tag_handlers};
use crate::features::activity_logs::models as activity_models;
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Home
        home_handlers::get_home,
        // Documents
        document_handlers::list_categories,
        document_handlers::list_documents,
        document_handlers::search_documents,
        document_handlers::get_document,
        document_handlers::create_document,
        document_handlers::update_document,
        document_handlers::delete_document,
        document_handlers::download_document,
        // Tags
        tag_handlers::list_tags,
        tag_handlers::create_tag,
        // Announcements
        announcement_handlers::list_announcements,
        announcement_handlers::list_current_announcements,
        announcement_handlers::get_announcement,
        announcement_handlers::create_announcement,
        announcement_handlers::update_announcement,
        // Activity logs (admin)
        activity_handlers::list_activity_logs,
        activity_handlers::activity_log_stats,
        // Synced documents
        sync_handlers::list_synced_documents,
        sync_handlers::download_synced_document,
        // Sample content
        content_handlers::get_content,
        // Ingest (API key)
        ingest_handlers::ingest_document,
        ingest_handlers::run_sync,
    ),
    components(
        schemas(
            // Shared
            Meta,
            auth::model::AuthenticatedUser,
            // Documents
            document_models::DocumentType,
            document_models::DocumentCategory,
            document_models::DocumentSource,
            document_dtos::DocumentResponseDto,
            document_dtos::CreateDocumentForm,
            document_dtos::UpdateDocumentDto,
            document_dtos::CategoryOptionDto,
            document_dtos::SourceOptionDto,
            document_dtos::DocumentTaxonomyDto,
            ApiResponse<document_dtos::DocumentResponseDto>,
            ApiResponse<Vec<document_dtos::DocumentResponseDto>>,
            ApiResponse<Vec<document_dtos::DocumentTaxonomyDto>>,
            // Tags
            tag_dtos::TagResponseDto,
            tag_dtos::CreateTagDto,
            ApiResponse<tag_dtos::TagResponseDto>,
            ApiResponse<Vec<tag_dtos::TagResponseDto>>,
            // Announcements
            announcement_dtos::AnnouncementResponseDto,
            announcement_dtos::CreateAnnouncementDto,
            announcement_dtos::UpdateAnnouncementDto,
            ApiResponse<announcement_dtos::AnnouncementResponseDto>,
            ApiResponse<Vec<announcement_dtos::AnnouncementResponseDto>>,
            // Activity logs
            activity_models::ActivityAction,
            activity_dtos::ActivityLogResponseDto,
            ApiResponse<Vec<activity_dtos::ActivityLogResponseDto>>,
            activity_dtos::DocumentActivityDto,
            activity_dtos::ActivityStatsDto,
            ApiResponse<activity_dtos::ActivityStatsDto>,
            // Synced documents
            sync_dtos::SyncedRecordResponseDto,
            sync_dtos::SyncReport,
            ApiResponse<Vec<sync_dtos::SyncedRecordResponseDto>>,
            // Content
            catalog::Subcategory,
            content_dtos::ContentItemDto,
            content_dtos::ContentSectionDto,
            ApiResponse<content_dtos::ContentSectionDto>,
            // Home
            home_dtos::HomeOverviewDto,
            ApiResponse<home_dtos::HomeOverviewDto>,
            // Ingest
            ingest_dtos::IngestDocumentRequest,
            ingest_dtos::IngestDocumentResponse,
            ingest_dtos::IngestSyncResponse,
            ingest_dtos::IngestErrorResponse,
        )
    ),
    tags(
        (name = "home", description = "Landing page overview"),
        (name = "documents", description = "Insurance and investment document libraries"),
        (name = "tags", description = "Document tags"),
        (name = "announcements", description = "Announcements (reads are public)"),
        (name = "activity-logs", description = "Document activity audit trail (admin only)"),
        (name = "synced-documents", description = "Documents mirrored from the external record store"),
        (name = "content", description = "Static sample content of the section pages"),
        (name = "ingest", description = "Automation endpoints authenticated by X-API-Key"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Advisor Portal API",
        version = "0.1.0",
        description = "API documentation for the advisor intranet portal",
    )
)]
pub struct ApiDoc;

/// Adds the Bearer JWT and ingest API key security schemes
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-Key"))),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_document_routes_and_schemes() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/api/documents/{document_type}/{id}/download"));
        assert!(doc.paths.paths.contains_key("/api/ingest/documents"));

        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.security_schemes.contains_key("api_key"));
    }
}
