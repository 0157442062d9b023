use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::sync::handlers;
use crate::features::sync::services::SyncService;

/// Create routes for synced documents (authenticated)
pub fn routes(service: Arc<SyncService>) -> Router {
    Router::new()
        .route("/api/synced-documents", get(handlers::list_synced_documents))
        .route(
            "/api/synced-documents/{record_id}/download",
            get(handlers::download_synced_document),
        )
        .with_state(service)
}
