use std::sync::Arc;

use axum::{routing::post, Router};

use crate::features::ingest::handlers;
use crate::features::ingest::services::IngestService;

/// Machine-to-machine routes, authenticated by API key instead of JWT
pub fn routes(service: Arc<IngestService>) -> Router {
    Router::new()
        .route("/api/ingest/documents", post(handlers::ingest_document))
        .route("/api/ingest/sync", post(handlers::run_sync))
        .with_state(service)
}
