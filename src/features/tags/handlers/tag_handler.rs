use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireStaff;
use crate::features::tags::dtos::{CreateTagDto, TagResponseDto};
use crate::features::tags::services::TagService;
use crate::shared::types::{ApiResponse, Meta};

/// List all tags
#[utoipa::path(
    get,
    path = "/api/tags",
    responses(
        (status = 200, description = "List of tags", body = ApiResponse<Vec<TagResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "tags",
    security(("bearer_auth" = []))
)]
pub async fn list_tags(
    State(service): State<Arc<TagService>>,
) -> Result<Json<ApiResponse<Vec<TagResponseDto>>>> {
    let tags = service.list().await?;
    let total = tags.len() as i64;
    Ok(Json(ApiResponse::success(Some(tags), None, Some(Meta::total(total)))))
}

/// Create a tag (staff only)
#[utoipa::path(
    post,
    path = "/api/tags",
    request_body = CreateTagDto,
    responses(
        (status = 201, description = "Tag created", body = ApiResponse<TagResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Staff access required"),
        (status = 409, description = "Tag name or slug already exists")
    ),
    tag = "tags",
    security(("bearer_auth" = []))
)]
pub async fn create_tag(
    RequireStaff(_user): RequireStaff,
    State(service): State<Arc<TagService>>,
    AppJson(dto): AppJson<CreateTagDto>,
) -> Result<(StatusCode, Json<ApiResponse<TagResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let tag = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(tag),
            Some("Tag created successfully".to_string()),
            None,
        )),
    ))
}

#[cfg(test)]
mod tests {
    use crate::features::tags::{routes, TagService};
    use crate::shared::test_helpers::{with_user, InMemoryTagRepository, plain_user, staff_user};
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn service() -> Arc<TagService> {
        Arc::new(TagService::new(Arc::new(InMemoryTagRepository::default())))
    }

    #[tokio::test]
    async fn test_staff_can_create_and_list_tags() {
        let server = TestServer::new(with_user(routes::routes(service()), staff_user())).unwrap();

        let response = server
            .post("/api/tags")
            .json(&json!({"name": "Monthly Report"}))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let body = response.json::<Value>();
        assert_eq!(body["data"]["slug"], "monthly-report");

        let response = server
            .post("/api/tags")
            .json(&json!({"name": "Monthly Report"}))
            .await;
        response.assert_status(axum::http::StatusCode::CONFLICT);

        let response = server.get("/api/tags").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["meta"]["total"], 1);
    }

    #[tokio::test]
    async fn test_non_staff_cannot_create_tags() {
        let server = TestServer::new(with_user(routes::routes(service()), plain_user())).unwrap();

        let response = server.post("/api/tags").json(&json!({"name": "x"})).await;
        response.assert_status_forbidden();
    }
}
