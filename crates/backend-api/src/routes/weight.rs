use adhere_progress::ProgressStats;
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    routes::models::{
        ChartPoint, CreateWeightEntryRequest, UpdateWeightEntryRequest, WeightEntry,
    },
    services::{self, weight as weight_service},
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
pub struct WeightListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Inclusive lower bound on the entry date.
    pub start_date: Option<String>,
    /// Inclusive upper bound on the entry date.
    pub end_date: Option<String>,
}

/// Reporting window for the progress chart, counted back from now.
#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
pub enum Period {
    #[serde(rename = "1month")]
    OneMonth,
    #[default]
    #[serde(rename = "3months")]
    ThreeMonths,
    #[serde(rename = "6months")]
    SixMonths,
    #[serde(rename = "1year")]
    OneYear,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneMonth => "1month",
            Period::ThreeMonths => "3months",
            Period::SixMonths => "6months",
            Period::OneYear => "1year",
        }
    }

    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let months = match self {
            Period::OneMonth => 1,
            Period::ThreeMonths => 3,
            Period::SixMonths => 6,
            Period::OneYear => 12,
        };
        now.checked_sub_months(Months::new(months)).unwrap_or(now)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ProgressQuery {
    #[serde(default)]
    pub period: Period,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WeightEntriesResponse {
    pub count: usize,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub pages: i64,
    pub entries: Vec<WeightEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WeightEntryResponse {
    pub entry: WeightEntry,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WeightProgressResponse {
    pub period: String,
    pub chart_data: Vec<ChartPoint>,
    /// Absent when the window holds no entries.
    pub stats: Option<ProgressStats>,
    pub target_weight_kg: f64,
}

#[utoipa::path(
    get,
    path = "/api/weight",
    tag = "Weight",
    security(("bearerAuth" = [])),
    params(WeightListQuery),
    responses(
        (status = 200, description = "Weight entries, newest first", body = WeightEntriesResponse),
        (status = 400, description = "Invalid date filter", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_entries(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<WeightListQuery>,
) -> Result<Json<WeightEntriesResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let start_date = match query.start_date.as_deref() {
        Some(value) => Some(services::parse_timestamp(value).map_err(ApiError::from)?),
        None => None,
    };
    let end_date = match query.end_date.as_deref() {
        Some(value) => Some(services::parse_timestamp(value).map_err(ApiError::from)?),
        None => None,
    };

    let filter = weight_service::EntryFilter {
        page: query.page,
        limit: query.limit,
        start_date,
        end_date,
    };

    let page = weight_service::list_entries(state.db_pool(), user.id, &filter)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list weight entries: {:?}", e);
            ApiError::from(e)
        })?;

    Ok(Json(WeightEntriesResponse {
        count: page.entries.len(),
        total: page.total,
        page: query.page,
        limit: query.limit,
        pages: services::page_count(page.total, query.limit),
        entries: page.entries,
    }))
}

#[utoipa::path(
    post,
    path = "/api/weight",
    tag = "Weight",
    security(("bearerAuth" = [])),
    request_body = CreateWeightEntryRequest,
    responses(
        (status = 200, description = "Weight entry recorded", body = WeightEntryResponse),
        (status = 400, description = "Invalid entry payload", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn add_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateWeightEntryRequest>,
) -> Result<Json<WeightEntryResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let entry = weight_service::add_entry(state.db_pool(), &user, req)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(WeightEntryResponse { entry }))
}

#[utoipa::path(
    get,
    path = "/api/weight/progress",
    tag = "Weight",
    security(("bearerAuth" = [])),
    params(ProgressQuery),
    responses(
        (status = 200, description = "Chart data and window statistics", body = WeightProgressResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn progress(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ProgressQuery>,
) -> Result<Json<WeightProgressResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let since = query.period.window_start(Utc::now());
    let (chart_data, stats) = weight_service::progress_report(state.db_pool(), &user, since)
        .await
        .map_err(|e| {
            tracing::error!("Failed to build weight progress: {:?}", e);
            ApiError::from(e)
        })?;

    Ok(Json(WeightProgressResponse {
        period: query.period.as_str().to_string(),
        chart_data,
        stats,
        target_weight_kg: user.target_weight_kg,
    }))
}

#[utoipa::path(
    put,
    path = "/api/weight/{entry_id}",
    tag = "Weight",
    security(("bearerAuth" = [])),
    params(
        ("entry_id" = String, Path, description = "Weight entry public identifier")
    ),
    request_body = UpdateWeightEntryRequest,
    responses(
        (status = 200, description = "Weight entry updated", body = WeightEntryResponse),
        (status = 400, description = "Invalid entry payload", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "Weight entry not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<UpdateWeightEntryRequest>,
) -> Result<Json<WeightEntryResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    let entry = weight_service::update_entry(state.db_pool(), &user, &entry_id, req)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(WeightEntryResponse { entry }))
}

#[utoipa::path(
    delete,
    path = "/api/weight/{entry_id}",
    tag = "Weight",
    security(("bearerAuth" = [])),
    params(
        ("entry_id" = String, Path, description = "Weight entry public identifier")
    ),
    responses(
        (status = 200, description = "Weight entry deleted"),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse),
        (status = 404, description = "Weight entry not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_entry(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
    headers: HeaderMap,
) -> Result<(), ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    weight_service::delete_entry(state.db_pool(), user.id, &entry_id)
        .await
        .map_err(ApiError::from)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn period_window_start_counts_back_in_months() {
        let now = Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap();

        assert_eq!(
            Period::OneMonth.window_start(now),
            Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
        );
        assert_eq!(
            Period::ThreeMonths.window_start(now),
            Utc.with_ymd_and_hms(2024, 4, 15, 12, 0, 0).unwrap()
        );
        assert_eq!(
            Period::OneYear.window_start(now),
            Utc.with_ymd_and_hms(2023, 7, 15, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn period_deserializes_from_query_values() {
        #[derive(Deserialize)]
        struct Wrapper {
            period: Period,
        }

        let wrapper: Wrapper = serde_json::from_str(r#"{"period":"6months"}"#).unwrap();
        assert_eq!(wrapper.period.as_str(), "6months");

        assert!(serde_json::from_str::<Wrapper>(r#"{"period":"2weeks"}"#).is_err());
    }
}
