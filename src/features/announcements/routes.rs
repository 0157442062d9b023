use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::features::announcements::handlers;
use crate::features::announcements::services::AnnouncementService;

/// Read-only announcement routes (public)
pub fn public_routes(service: Arc<AnnouncementService>) -> Router {
    Router::new()
        .route("/api/announcements", get(handlers::list_announcements))
        .route(
            "/api/announcements/current",
            get(handlers::list_current_announcements),
        )
        .route("/api/announcements/{id}", get(handlers::get_announcement))
        .with_state(service)
}

/// Announcement management routes (authenticated, admin only)
pub fn admin_routes(service: Arc<AnnouncementService>) -> Router {
    Router::new()
        .route(
            "/api/admin/announcements",
            post(handlers::create_announcement),
        )
        .route(
            "/api/admin/announcements/{id}",
            put(handlers::update_announcement),
        )
        .with_state(service)
}
