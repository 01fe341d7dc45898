use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    routes::models::{Patient, PatientRequest},
    services::{self, patient as patient_service},
    ApiError, AppState,
};

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PatientListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Case-insensitive name search.
    pub search: Option<String>,
    pub status: Option<String>,
    pub condition: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PatientsResponse {
    pub patients: Vec<Patient>,
    pub total_count: i64,
    pub current_page: u32,
    pub total_pages: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PatientResponse {
    pub patient: Patient,
}

#[utoipa::path(
    get,
    path = "/api/patients",
    tag = "Patients",
    params(PatientListQuery),
    responses(
        (status = 200, description = "Patient records with search and filters", body = PatientsResponse),
        (status = 500, description = "Failed to fetch patients", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_patients(
    State(state): State<AppState>,
    Query(query): Query<PatientListQuery>,
) -> Result<Json<PatientsResponse>, ApiError> {
    let filter = patient_service::PatientFilter {
        page: query.page,
        limit: query.limit,
        search: query.search,
        status: query.status,
        condition: query.condition,
    };

    let page = patient_service::list_patients(state.db_pool(), &filter)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch patients: {:?}", e);
            ApiError::from(e)
        })?;

    let total_pages = services::page_count(page.total, query.limit);

    Ok(Json(PatientsResponse {
        patients: page.patients,
        total_count: page.total,
        current_page: query.page,
        total_pages,
        has_next_page: i64::from(query.page) < total_pages,
        has_prev_page: query.page > 1,
    }))
}

#[utoipa::path(
    get,
    path = "/api/patients/{patient_id}",
    tag = "Patients",
    params(
        ("patient_id" = String, Path, description = "Patient public identifier")
    ),
    responses(
        (status = 200, description = "Patient record", body = PatientResponse),
        (status = 404, description = "Patient not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<PatientResponse>, ApiError> {
    let patient = patient_service::get_patient(state.db_pool(), &patient_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(PatientResponse { patient }))
}

#[utoipa::path(
    post,
    path = "/api/patients",
    tag = "Patients",
    request_body = PatientRequest,
    responses(
        (status = 200, description = "Patient created", body = PatientResponse),
        (status = 400, description = "Invalid patient payload or duplicate email", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_patient(
    State(state): State<AppState>,
    Json(req): Json<PatientRequest>,
) -> Result<Json<PatientResponse>, ApiError> {
    let patient = patient_service::create_patient(state.db_pool(), req)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create patient: {:?}", e);
            ApiError::from(e)
        })?;

    Ok(Json(PatientResponse { patient }))
}

#[utoipa::path(
    put,
    path = "/api/patients/{patient_id}",
    tag = "Patients",
    params(
        ("patient_id" = String, Path, description = "Patient public identifier")
    ),
    request_body = PatientRequest,
    responses(
        (status = 200, description = "Patient updated", body = PatientResponse),
        (status = 400, description = "Invalid patient payload or duplicate email", body = crate::error::ErrorResponse),
        (status = 404, description = "Patient not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
    Json(req): Json<PatientRequest>,
) -> Result<Json<PatientResponse>, ApiError> {
    let patient = patient_service::update_patient(state.db_pool(), &patient_id, req)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(PatientResponse { patient }))
}

#[utoipa::path(
    delete,
    path = "/api/patients/{patient_id}",
    tag = "Patients",
    params(
        ("patient_id" = String, Path, description = "Patient public identifier")
    ),
    responses(
        (status = 200, description = "Patient deleted", body = PatientResponse),
        (status = 404, description = "Patient not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_patient(
    State(state): State<AppState>,
    Path(patient_id): Path<String>,
) -> Result<Json<PatientResponse>, ApiError> {
    let patient = patient_service::delete_patient(state.db_pool(), &patient_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(PatientResponse { patient }))
}
