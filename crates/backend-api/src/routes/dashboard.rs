use axum::{extract::State, http::HeaderMap, Json};

use crate::{
    routes::models::DashboardOverview, services::dashboard as dashboard_service,
    util::require_bearer, ApiError, AppState,
};

#[utoipa::path(
    get,
    path = "/api/dashboard/overview",
    tag = "Dashboard",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Aggregated dashboard overview", body = DashboardOverview),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "Profile not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn overview(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DashboardOverview>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let overview = dashboard_service::overview(state.db_pool(), &user)
        .await
        .map_err(|e| {
            tracing::error!("Failed to build dashboard overview: {:?}", e);
            ApiError::from(e)
        })?;

    Ok(Json(overview))
}
