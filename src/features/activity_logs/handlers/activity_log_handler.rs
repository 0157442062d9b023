use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::core::error::Result;
use crate::features::activity_logs::dtos::{
    ActivityLogQuery, ActivityLogResponseDto, ActivityStatsDto,
};
use crate::features::activity_logs::services::ActivityLogService;
use crate::features::auth::guards::RequireAdmin;
use crate::shared::types::{ApiResponse, Meta};

/// List activity logs (admin only)
#[utoipa::path(
    get,
    path = "/api/admin/activity-logs",
    params(ActivityLogQuery),
    responses(
        (status = 200, description = "Activity logs, newest first", body = ApiResponse<Vec<ActivityLogResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required")
    ),
    tag = "activity-logs",
    security(("bearer_auth" = []))
)]
pub async fn list_activity_logs(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<ActivityLogService>>,
    Query(query): Query<ActivityLogQuery>,
) -> Result<Json<ApiResponse<Vec<ActivityLogResponseDto>>>> {
    let (logs, total) = service.list(&query).await?;
    Ok(Json(ApiResponse::success(
        Some(logs),
        None,
        Some(Meta::paginated(total, &query.pagination())),
    )))
}

/// Dashboard figures: recent activity, top documents, weekly users, monthly downloads
#[utoipa::path(
    get,
    path = "/api/admin/activity-logs/stats",
    responses(
        (status = 200, description = "Activity statistics", body = ApiResponse<ActivityStatsDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin access required")
    ),
    tag = "activity-logs",
    security(("bearer_auth" = []))
)]
pub async fn activity_log_stats(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<ActivityLogService>>,
) -> Result<Json<ApiResponse<ActivityStatsDto>>> {
    let stats = service.stats().await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}

#[cfg(test)]
mod tests {
    use crate::features::activity_logs::{routes, Activity, ActivityLogService};
    use crate::features::activity_logs::models::ActivityAction;
    use crate::features::documents::models::DocumentType;
    use crate::shared::test_helpers::{
        admin_user, staff_user, with_user, InMemoryActivityLogRepository, InMemoryDocumentRepository,
    };
    use axum_test::TestServer;
    use serde_json::Value;
    use std::sync::Arc;

    async fn seeded_service() -> Arc<ActivityLogService> {
        let service = Arc::new(ActivityLogService::new(
            Arc::new(InMemoryActivityLogRepository::default()),
            Arc::new(InMemoryDocumentRepository::default()),
        ));
        let staff = staff_user();
        let admin = admin_user();
        service
            .record(Some(&staff), None, Activity::new(ActivityAction::View, DocumentType::Insurance))
            .await
            .unwrap();
        service
            .record(
                Some(&staff),
                None,
                Activity::new(ActivityAction::Download, DocumentType::Investment).document(3),
            )
            .await
            .unwrap();
        service
            .record(Some(&admin), None, Activity::new(ActivityAction::View, DocumentType::Investment))
            .await
            .unwrap();
        service
    }

    #[tokio::test]
    async fn test_admin_lists_and_filters_logs() {
        let server =
            TestServer::new(with_user(routes::routes(seeded_service().await), admin_user())).unwrap();

        let response = server.get("/api/admin/activity-logs").await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["meta"]["total"], 3);
        // newest first
        assert_eq!(body["data"][0]["user_id"], admin_user().sub);

        let response = server
            .get("/api/admin/activity-logs")
            .add_query_param("action", "view")
            .add_query_param("document_type", "investment")
            .await;
        let body = response.json::<Value>();
        assert_eq!(body["meta"]["total"], 1);

        let response = server
            .get("/api/admin/activity-logs")
            .add_query_param("user_id", staff_user().sub)
            .add_query_param("page_size", "1")
            .await;
        let body = response.json::<Value>();
        assert_eq!(body["meta"]["total"], 2);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_staff_cannot_read_logs() {
        let server =
            TestServer::new(with_user(routes::routes(seeded_service().await), staff_user())).unwrap();

        server.get("/api/admin/activity-logs").await.assert_status_forbidden();
    }

    #[tokio::test]
    async fn test_admin_reads_activity_stats() {
        let server =
            TestServer::new(with_user(routes::routes(seeded_service().await), admin_user())).unwrap();

        let response = server.get("/api/admin/activity-logs/stats").await;
        response.assert_status_ok();
        let data = &response.json::<Value>()["data"];
        assert_eq!(data["weekly_active_users"], 2);
        assert_eq!(data["monthly_downloads"], 1);
        assert_eq!(data["recent_activity"].as_array().unwrap().len(), 3);
        let top = data["top_documents"].as_array().unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0]["document_type"], "investment");
        assert_eq!(top[0]["document_id"], 3);
        assert_eq!(top[0]["downloads"], 1);
    }

    #[tokio::test]
    async fn test_staff_cannot_read_activity_stats() {
        let server =
            TestServer::new(with_user(routes::routes(seeded_service().await), staff_user())).unwrap();

        server
            .get("/api/admin/activity-logs/stats")
            .await
            .assert_status_forbidden();
    }
}
