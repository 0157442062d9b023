use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::features::documents::dtos::MAX_FILE_SIZE;
use crate::features::documents::handlers::{self, DocumentState};

/// Create routes for the documents feature (authenticated)
pub fn routes(state: DocumentState) -> Router {
    Router::new()
        .route("/api/documents/categories", get(handlers::list_categories))
        .route(
            "/api/documents/{document_type}",
            // Allow body size up to MAX_FILE_SIZE + buffer for multipart overhead
            post(handlers::create_document)
                .layer(DefaultBodyLimit::max(MAX_FILE_SIZE + 1024 * 1024))
                .get(handlers::list_documents),
        )
        .route(
            "/api/documents/{document_type}/search",
            get(handlers::search_documents),
        )
        .route(
            "/api/documents/{document_type}/{id}",
            get(handlers::get_document)
                .put(handlers::update_document)
                .delete(handlers::delete_document),
        )
        .route(
            "/api/documents/{document_type}/{id}/download",
            get(handlers::download_document),
        )
        .with_state(state)
}
