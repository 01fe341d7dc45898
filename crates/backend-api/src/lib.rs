mod error;
mod state;
mod util;

pub mod docs;
pub mod routes;
pub mod services;

pub use error::{ApiError, ErrorResponse};
pub use state::AppState;

use axum::{
    http::header::{AUTHORIZATION, CONTENT_TYPE},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        // Auth routes
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/profile", get(routes::auth::get_profile))
        .route("/api/auth/profile", put(routes::auth::update_profile))
        // Weight tracking routes
        .route("/api/weight", get(routes::weight::list_entries))
        .route("/api/weight", post(routes::weight::add_entry))
        .route("/api/weight/progress", get(routes::weight::progress))
        .route("/api/weight/:entry_id", put(routes::weight::update_entry))
        .route(
            "/api/weight/:entry_id",
            delete(routes::weight::delete_entry),
        )
        // Medication routes
        .route(
            "/api/medications",
            get(routes::medications::list_medications),
        )
        .route(
            "/api/medications",
            post(routes::medications::create_medication),
        )
        .route(
            "/api/medications/:medication_id",
            put(routes::medications::update_medication),
        )
        .route(
            "/api/medications/:medication_id",
            delete(routes::medications::delete_medication),
        )
        // Shipment routes
        .route("/api/shipments", get(routes::shipments::list_shipments))
        // Dashboard route
        .route("/api/dashboard/overview", get(routes::dashboard::overview))
        // Legacy clinician-facing patient routes
        .route("/api/patients", get(routes::patients::list_patients))
        .route("/api/patients", post(routes::patients::create_patient))
        .route(
            "/api/patients/:patient_id",
            get(routes::patients::get_patient),
        )
        .route(
            "/api/patients/:patient_id",
            put(routes::patients::update_patient),
        )
        .route(
            "/api/patients/:patient_id",
            delete(routes::patients::delete_patient),
        )
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(state)
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}
