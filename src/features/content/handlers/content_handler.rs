use axum::{extract::Path, Json};

use crate::core::error::{AppError, Result};
use crate::features::content::catalog::{self, Subcategory};
use crate::features::content::dtos::ContentSectionDto;
use crate::features::documents::models::DocumentType;
use crate::shared::types::ApiResponse;

/// Sample content of one section page
#[utoipa::path(
    get,
    path = "/api/content/{category}/{subcategory}",
    params(
        ("category" = DocumentType, Path, description = "insurance or investment"),
        ("subcategory" = Subcategory, Path, description = "Section within the category")
    ),
    responses(
        (status = 200, description = "Section content", body = ApiResponse<ContentSectionDto>),
        (status = 404, description = "Unknown category pair")
    ),
    tag = "content",
    security(("bearer_auth" = []))
)]
pub async fn get_content(
    Path((category, subcategory)): Path<(String, String)>,
) -> Result<Json<ApiResponse<ContentSectionDto>>> {
    let not_found = || AppError::NotFound(format!("No content for {}/{}", category, subcategory));

    let kind = category.parse::<DocumentType>().map_err(|_| not_found())?;
    let sub = subcategory.parse::<Subcategory>().map_err(|_| not_found())?;
    let section = catalog::lookup(kind, sub).ok_or_else(not_found)?;

    Ok(Json(ApiResponse::success(Some(section.into()), None, None)))
}

#[cfg(test)]
mod tests {
    use crate::features::content::routes;
    use axum_test::TestServer;
    use serde_json::Value;

    #[tokio::test]
    async fn test_known_and_unknown_pairs() {
        let server = TestServer::new(routes::routes()).unwrap();

        let response = server.get("/api/content/insurance/products").await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["data"]["subcategory"], "products");
        assert_eq!(body["data"]["heading"], "保險商品");

        server.get("/api/content/insurance/quotes").await.assert_status_not_found();
        server.get("/api/content/pension/info").await.assert_status_not_found();
    }
}
