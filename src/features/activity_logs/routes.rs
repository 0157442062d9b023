use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::activity_logs::handlers;
use crate::features::activity_logs::services::ActivityLogService;

/// Admin-only audit trail routes
pub fn routes(service: Arc<ActivityLogService>) -> Router {
    Router::new()
        .route("/api/admin/activity-logs", get(handlers::list_activity_logs))
        .route("/api/admin/activity-logs/stats", get(handlers::activity_log_stats))
        .with_state(service)
}
