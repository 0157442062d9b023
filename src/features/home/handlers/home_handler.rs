use std::sync::Arc;

use axum::{extract::State, http::Uri, Json};

use crate::core::error::Result;
use crate::features::home::dtos::HomeOverviewDto;
use crate::features::home::services::HomeService;
use crate::shared::cache::page_cache_key;
use crate::shared::types::ApiResponse;

/// Newest announcements and documents for the landing page
#[utoipa::path(
    get,
    path = "/api/home",
    responses(
        (status = 200, description = "Home overview", body = ApiResponse<HomeOverviewDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "home",
    security(("bearer_auth" = []))
)]
pub async fn get_home(
    State(service): State<Arc<HomeService>>,
    uri: Uri,
) -> Result<Json<ApiResponse<HomeOverviewDto>>> {
    let overview = service
        .overview(&page_cache_key(uri.path(), uri.query()))
        .await?;
    Ok(Json(ApiResponse::success(Some(overview), None, None)))
}
