use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::home::handlers;
use crate::features::home::services::HomeService;

/// Create routes for the home overview (authenticated)
pub fn routes(service: Arc<HomeService>) -> Router {
    Router::new()
        .route("/api/home", get(handlers::get_home))
        .with_state(service)
}
