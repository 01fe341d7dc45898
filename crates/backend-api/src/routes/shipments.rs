use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    routes::models::Shipment,
    services::{self, shipment as shipment_service},
    util::require_bearer,
    ApiError, AppState,
};

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    50
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ShipmentListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Filter by delivery status (`pending`, `shipped`, `in_transit`,
    /// `delivered`, `cancelled`).
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShipmentsResponse {
    pub count: usize,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub pages: i64,
    pub shipments: Vec<Shipment>,
}

#[utoipa::path(
    get,
    path = "/api/shipments",
    tag = "Shipments",
    security(("bearerAuth" = [])),
    params(ShipmentListQuery),
    responses(
        (status = 200, description = "Shipments with derived delivery countdowns", body = ShipmentsResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_shipments(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ShipmentListQuery>,
) -> Result<Json<ShipmentsResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let filter = shipment_service::ShipmentFilter {
        page: query.page,
        limit: query.limit,
        status: query.status,
    };

    let page = shipment_service::list_shipments(state.db_pool(), user.id, &filter)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list shipments: {:?}", e);
            ApiError::from(e)
        })?;

    Ok(Json(ShipmentsResponse {
        count: page.shipments.len(),
        total: page.total,
        page: query.page,
        limit: query.limit,
        pages: services::page_count(page.total, query.limit),
        shipments: page.shipments,
    }))
}
