use axum::{routing::get, Router};

use crate::features::content::handlers;

/// Create routes for the sample content (authenticated)
pub fn routes() -> Router {
    Router::new().route(
        "/api/content/{category}/{subcategory}",
        get(handlers::get_content),
    )
}
