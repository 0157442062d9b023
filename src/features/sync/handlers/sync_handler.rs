use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};

use crate::core::error::Result;
use crate::features::sync::dtos::SyncedRecordResponseDto;
use crate::features::sync::services::SyncService;
use crate::shared::http::attachment_response;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// List documents synchronized from the record store
#[utoipa::path(
    get,
    path = "/api/synced-documents",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Synced documents, newest first", body = ApiResponse<Vec<SyncedRecordResponseDto>>)
    ),
    tag = "synced-documents",
    security(("bearer_auth" = []))
)]
pub async fn list_synced_documents(
    State(service): State<Arc<SyncService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<SyncedRecordResponseDto>>>> {
    let (items, total) = service.list(&pagination).await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta::paginated(total, &pagination)),
    )))
}

/// Download a synced document through the portal
#[utoipa::path(
    get,
    path = "/api/synced-documents/{record_id}/download",
    params(("record_id" = String, Path, description = "Record store ID")),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 404, description = "Unknown record or no file"),
        (status = 500, description = "Upstream fetch failed")
    ),
    tag = "synced-documents",
    security(("bearer_auth" = []))
)]
pub async fn download_synced_document(
    State(service): State<Arc<SyncService>>,
    Path(record_id): Path<String>,
) -> Result<Response> {
    let download = service.download(&record_id).await?;
    attachment_response(download.data, &download.file_name, &download.content_type)
}

#[cfg(test)]
mod tests {
    use crate::features::sync::{routes, SyncService};
    use crate::shared::test_helpers::{
        InMemoryRecordStore, InMemorySyncedRecordRepository, StaticFileFetcher,
    };
    use axum::http::{header, StatusCode};
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use std::sync::Arc;

    async fn server(fetcher: StaticFileFetcher) -> TestServer {
        let records = vec![serde_json::from_value(json!({
            "id": "recX",
            "createdTime": "2024-03-01T08:00:00.000Z",
            "fields": {"title": "策略報告", "attachments": [{"url": "https://dl.example.com/s.pdf"}]}
        }))
        .unwrap()];
        let service = Arc::new(SyncService::new(
            Some(Arc::new(InMemoryRecordStore::new(records))),
            Arc::new(InMemorySyncedRecordRepository::default()),
            Arc::new(fetcher),
        ));
        service.run().await.unwrap();
        TestServer::new(routes::routes(service)).unwrap()
    }

    #[tokio::test]
    async fn test_list_and_download() {
        let server = server(StaticFileFetcher::serving(b"%PDF", "application/pdf")).await;

        let response = server.get("/api/synced-documents").await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["data"][0]["download_url"], "/api/synced-documents/recX/download");

        let response = server.get("/api/synced-documents/recX/download").await;
        response.assert_status_ok();
        assert_eq!(response.as_bytes().to_vec(), b"%PDF".to_vec());
        assert!(response
            .header(header::CONTENT_DISPOSITION)
            .to_str()
            .unwrap()
            .contains(".pdf"));

        server
            .get("/api/synced-documents/unknown/download")
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_upstream_failure_is_500() {
        let server = server(StaticFileFetcher::failing()).await;

        server
            .get("/api/synced-documents/recX/download")
            .await
            .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }
}
