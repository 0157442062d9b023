use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::announcements::dtos::{
    AnnouncementResponseDto, CreateAnnouncementDto, UpdateAnnouncementDto,
};
use crate::features::announcements::services::AnnouncementService;
use crate::features::auth::guards::RequireAdmin;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// List active announcements, important first then newest
#[utoipa::path(
    get,
    path = "/api/announcements",
    params(PaginationQuery),
    responses(
        (status = 200, description = "One page of announcements", body = ApiResponse<Vec<AnnouncementResponseDto>>)
    ),
    tag = "announcements"
)]
pub async fn list_announcements(
    State(service): State<Arc<AnnouncementService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<AnnouncementResponseDto>>>> {
    let (items, total) = service.list(&pagination).await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta::paginated(total, &pagination)),
    )))
}

/// Announcements inside their validity window right now
#[utoipa::path(
    get,
    path = "/api/announcements/current",
    responses(
        (status = 200, description = "Current announcements", body = ApiResponse<Vec<AnnouncementResponseDto>>)
    ),
    tag = "announcements"
)]
pub async fn list_current_announcements(
    State(service): State<Arc<AnnouncementService>>,
) -> Result<Json<ApiResponse<Vec<AnnouncementResponseDto>>>> {
    let items = service.current().await?;
    let total = items.len() as i64;
    Ok(Json(ApiResponse::success(Some(items), None, Some(Meta::total(total)))))
}

/// Get one active announcement
#[utoipa::path(
    get,
    path = "/api/announcements/{id}",
    params(("id" = i64, Path, description = "Announcement ID")),
    responses(
        (status = 200, description = "Announcement found", body = ApiResponse<AnnouncementResponseDto>),
        (status = 404, description = "Announcement not found")
    ),
    tag = "announcements"
)]
pub async fn get_announcement(
    State(service): State<Arc<AnnouncementService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<AnnouncementResponseDto>>> {
    let announcement = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(announcement), None, None)))
}

/// Publish an announcement (admin only)
#[utoipa::path(
    post,
    path = "/api/admin/announcements",
    request_body = CreateAnnouncementDto,
    responses(
        (status = 201, description = "Announcement created", body = ApiResponse<AnnouncementResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin access required")
    ),
    tag = "announcements",
    security(("bearer_auth" = []))
)]
pub async fn create_announcement(
    RequireAdmin(user): RequireAdmin,
    State(service): State<Arc<AnnouncementService>>,
    AppJson(dto): AppJson<CreateAnnouncementDto>,
) -> Result<(StatusCode, Json<ApiResponse<AnnouncementResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let announcement = service.create(dto, &user.sub).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(announcement),
            Some("Announcement created successfully".to_string()),
            None,
        )),
    ))
}

/// Update an announcement (admin only)
#[utoipa::path(
    put,
    path = "/api/admin/announcements/{id}",
    params(("id" = i64, Path, description = "Announcement ID")),
    request_body = UpdateAnnouncementDto,
    responses(
        (status = 200, description = "Announcement updated", body = ApiResponse<AnnouncementResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Announcement not found")
    ),
    tag = "announcements",
    security(("bearer_auth" = []))
)]
pub async fn update_announcement(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AnnouncementService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdateAnnouncementDto>,
) -> Result<Json<ApiResponse<AnnouncementResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let announcement = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(announcement),
        Some("Announcement updated successfully".to_string()),
        None,
    )))
}
