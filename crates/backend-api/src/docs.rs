use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::get_profile,
        crate::routes::auth::update_profile,
        crate::routes::weight::list_entries,
        crate::routes::weight::add_entry,
        crate::routes::weight::progress,
        crate::routes::weight::update_entry,
        crate::routes::weight::delete_entry,
        crate::routes::medications::list_medications,
        crate::routes::medications::create_medication,
        crate::routes::medications::update_medication,
        crate::routes::medications::delete_medication,
        crate::routes::shipments::list_shipments,
        crate::routes::dashboard::overview,
        crate::routes::patients::list_patients,
        crate::routes::patients::get_patient,
        crate::routes::patients::create_patient,
        crate::routes::patients::update_patient,
        crate::routes::patients::delete_patient
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::routes::health::HealthResponse,
            crate::routes::auth::RegisterRequest,
            crate::routes::auth::LoginRequest,
            crate::routes::auth::UpdateProfileRequest,
            crate::routes::auth::SessionResponse,
            crate::routes::auth::UserResponse,
            crate::routes::auth::ProfileResponse,
            crate::routes::models::WeightEntry,
            crate::routes::models::CreateWeightEntryRequest,
            crate::routes::models::UpdateWeightEntryRequest,
            crate::routes::models::ChartPoint,
            crate::routes::models::Medication,
            crate::routes::models::CreateMedicationRequest,
            crate::routes::models::UpdateMedicationRequest,
            crate::routes::models::Shipment,
            crate::routes::models::ShipmentMedication,
            crate::routes::models::ShippingAddress,
            crate::routes::models::ShipmentDates,
            crate::routes::models::ShipmentCost,
            crate::routes::models::Patient,
            crate::routes::models::PatientRequest,
            crate::routes::models::DashboardOverview,
            crate::routes::models::DashboardUser,
            crate::routes::models::UpcomingShipment,
            crate::routes::models::RecentShipment,
            crate::routes::models::DashboardStats,
            crate::routes::weight::WeightEntriesResponse,
            crate::routes::weight::WeightEntryResponse,
            crate::routes::weight::WeightProgressResponse,
            crate::routes::weight::Period,
            crate::routes::medications::MedicationsResponse,
            crate::routes::medications::MedicationResponse,
            crate::routes::shipments::ShipmentsResponse,
            crate::routes::patients::PatientsResponse,
            crate::routes::patients::PatientResponse,
            adhere_progress::ProgressStats,
            adhere_progress::WeightProgress,
            adhere_progress::ShipmentStatus
        )
    ),
    tags(
        (name = "Health", description = "Service health endpoints"),
        (name = "Auth", description = "Registration, login, and profile management"),
        (name = "Weight", description = "Weight entry tracking and progress reports"),
        (name = "Medications", description = "Prescribed medication management"),
        (name = "Shipments", description = "Medication shipment tracking"),
        (name = "Dashboard", description = "Aggregated patient overview"),
        (name = "Patients", description = "Legacy clinician-facing patient records")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        let schemes = &mut components.security_schemes;

        let mut scheme = SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer));
        if let SecurityScheme::Http(http) = &mut scheme {
            http.bearer_format = Some("Bearer".to_string());
        }

        schemes.insert("bearerAuth".to_string(), scheme);
    }
}
