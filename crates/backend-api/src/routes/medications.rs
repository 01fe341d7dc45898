use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    routes::models::{CreateMedicationRequest, Medication, UpdateMedicationRequest},
    services::{self, medication as medication_service},
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
pub struct MedicationListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Filter by lifecycle status (`active`, `inactive`, `discontinued`).
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MedicationsResponse {
    pub count: usize,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub pages: i64,
    pub medications: Vec<Medication>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MedicationResponse {
    pub medication: Medication,
}

#[utoipa::path(
    get,
    path = "/api/medications",
    tag = "Medications",
    security(("bearerAuth" = [])),
    params(MedicationListQuery),
    responses(
        (status = 200, description = "Medications, newest prescribed first", body = MedicationsResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_medications(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<MedicationListQuery>,
) -> Result<Json<MedicationsResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let filter = medication_service::MedicationFilter {
        page: query.page,
        limit: query.limit,
        status: query.status,
    };

    let page = medication_service::list_medications(state.db_pool(), user.id, &filter)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list medications: {:?}", e);
            ApiError::from(e)
        })?;

    Ok(Json(MedicationsResponse {
        count: page.medications.len(),
        total: page.total,
        page: query.page,
        limit: query.limit,
        pages: services::page_count(page.total, query.limit),
        medications: page.medications,
    }))
}

#[utoipa::path(
    post,
    path = "/api/medications",
    tag = "Medications",
    security(("bearerAuth" = [])),
    request_body = CreateMedicationRequest,
    responses(
        (status = 200, description = "Medication created", body = MedicationResponse),
        (status = 400, description = "Invalid medication payload", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_medication(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateMedicationRequest>,
) -> Result<Json<MedicationResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let medication = medication_service::create_medication(state.db_pool(), user.id, req)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(MedicationResponse { medication }))
}

#[utoipa::path(
    put,
    path = "/api/medications/{medication_id}",
    tag = "Medications",
    security(("bearerAuth" = [])),
    params(
        ("medication_id" = String, Path, description = "Medication public identifier")
    ),
    request_body = UpdateMedicationRequest,
    responses(
        (status = 200, description = "Medication updated", body = MedicationResponse),
        (status = 400, description = "Invalid medication payload", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "Medication not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_medication(
    State(state): State<AppState>,
    Path(medication_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<UpdateMedicationRequest>,
) -> Result<Json<MedicationResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let medication =
        medication_service::update_medication(state.db_pool(), user.id, &medication_id, req)
            .await
            .map_err(ApiError::from)?;

    Ok(Json(MedicationResponse { medication }))
}

#[utoipa::path(
    delete,
    path = "/api/medications/{medication_id}",
    tag = "Medications",
    security(("bearerAuth" = [])),
    params(
        ("medication_id" = String, Path, description = "Medication public identifier")
    ),
    responses(
        (status = 200, description = "Medication deleted"),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "Medication not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_medication(
    State(state): State<AppState>,
    Path(medication_id): Path<String>,
    headers: HeaderMap,
) -> Result<(), ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    medication_service::delete_medication(state.db_pool(), user.id, &medication_id)
        .await
        .map_err(ApiError::from)?;

    Ok(())
}
