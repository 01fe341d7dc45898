use adhere_progress::{ShipmentStatus, WeightProgress};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

pub const MEDICATION_KINDS: &[&str] = &["semaglutide", "liraglutide", "tirzepatide", "other"];
pub const MEDICATION_STATUSES: &[&str] = &["active", "inactive", "discontinued"];
pub const PATIENT_STATUSES: &[&str] = &["active", "inactive"];

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct WeightEntry {
    pub id: i64,
    pub public_id: String,
    pub user_id: i64,
    pub weight_kg: f64,
    pub bmi: Option<f64>,
    pub notes: Option<String>,
    pub entry_date: String,
    pub is_manual_entry: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateWeightEntryRequest {
    pub weight_kg: f64,
    pub notes: Option<String>,
    /// RFC3339 timestamp or `YYYY-MM-DD`; defaults to now.
    pub entry_date: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateWeightEntryRequest {
    pub weight_kg: Option<f64>,
    pub notes: Option<String>,
    pub entry_date: Option<String>,
}

/// One point of the progress chart; BMI falls back to a value computed from
/// the profile height as it is *today* when the entry has none cached.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChartPoint {
    pub date: String,
    pub weight: f64,
    pub bmi: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Medication {
    pub id: i64,
    pub public_id: String,
    pub user_id: i64,
    pub name: String,
    pub kind: String,
    pub dosage: String,
    pub frequency: String,
    pub instructions: Option<String>,
    pub prescribed_date: String,
    pub end_date: Option<String>,
    pub status: String,
    /// Client-supplied counter; never derived from dates.
    pub remaining_days: Option<i64>,
    pub prescriber_name: Option<String>,
    pub prescriber_contact: Option<String>,
    pub side_effects: Vec<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMedicationRequest {
    pub name: String,
    pub kind: String,
    pub dosage: String,
    pub frequency: String,
    pub instructions: Option<String>,
    pub prescribed_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
    pub remaining_days: Option<i64>,
    pub prescriber_name: Option<String>,
    pub prescriber_contact: Option<String>,
    #[serde(default)]
    pub side_effects: Vec<String>,
    pub notes: Option<String>,
}

impl CreateMedicationRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Medication name is required".to_string());
        }
        if !MEDICATION_KINDS.contains(&self.kind.as_str()) {
            return Err(format!("Unknown medication kind '{}'", self.kind));
        }
        if self.dosage.trim().is_empty() {
            return Err("Dosage is required".to_string());
        }
        if self.frequency.trim().is_empty() {
            return Err("Frequency is required".to_string());
        }
        if let Some(ref instructions) = self.instructions {
            if instructions.len() > 500 {
                return Err("Instructions cannot exceed 500 characters".to_string());
            }
        }
        if let Some(ref status) = self.status {
            if !MEDICATION_STATUSES.contains(&status.as_str()) {
                return Err(format!("Unknown medication status '{status}'"));
            }
        }
        if let Some(remaining_days) = self.remaining_days {
            if remaining_days < 0 {
                return Err("Remaining days cannot be negative".to_string());
            }
        }
        if let Some(ref notes) = self.notes {
            if notes.len() > 1000 {
                return Err("Notes cannot exceed 1000 characters".to_string());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMedicationRequest {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub instructions: Option<String>,
    pub prescribed_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
    pub remaining_days: Option<i64>,
    pub prescriber_name: Option<String>,
    pub prescriber_contact: Option<String>,
    pub side_effects: Option<Vec<String>>,
    pub notes: Option<String>,
}

impl UpdateMedicationRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref kind) = self.kind {
            if !MEDICATION_KINDS.contains(&kind.as_str()) {
                return Err(format!("Unknown medication kind '{kind}'"));
            }
        }
        if let Some(ref status) = self.status {
            if !MEDICATION_STATUSES.contains(&status.as_str()) {
                return Err(format!("Unknown medication status '{status}'"));
            }
        }
        if let Some(remaining_days) = self.remaining_days {
            if remaining_days < 0 {
                return Err("Remaining days cannot be negative".to_string());
            }
        }
        if let Some(ref notes) = self.notes {
            if notes.len() > 1000 {
                return Err("Notes cannot exceed 1000 characters".to_string());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Shipment {
    pub id: i64,
    pub public_id: String,
    pub user_id: i64,
    pub tracking_number: String,
    pub status: ShipmentStatus,
    pub medication: ShipmentMedication,
    pub shipping_address: ShippingAddress,
    pub dates: ShipmentDates,
    pub carrier: String,
    pub cost: ShipmentCost,
    pub notes: Option<String>,
    pub is_emergency: bool,
    /// Derived at read time; absent for delivered shipments.
    pub days_until_delivery: Option<i64>,
    /// Derived at read time; absent until both shipped and delivered.
    pub shipment_duration: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShipmentMedication {
    pub name: String,
    pub kind: String,
    pub dosage: String,
    pub quantity: i64,
    pub unit: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShipmentDates {
    pub order_date: String,
    pub shipped_date: Option<String>,
    pub expected_delivery_date: String,
    pub actual_delivery_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShipmentCost {
    pub medication: Option<f64>,
    pub shipping: Option<f64>,
    pub total: Option<f64>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Patient {
    pub id: i64,
    pub public_id: String,
    pub name: String,
    pub age: i64,
    pub email: String,
    pub phone: String,
    pub condition: String,
    pub status: String,
    pub medication_kind: String,
    pub medication_dosage: Option<String>,
    pub last_visit: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PatientRequest {
    pub name: String,
    pub age: i64,
    pub email: String,
    pub phone: String,
    pub condition: String,
    pub status: Option<String>,
    pub medication_kind: Option<String>,
    pub medication_dosage: Option<String>,
}

impl PatientRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().len() < 2 || self.name.len() > 100 {
            return Err("Name must be between 2 and 100 characters".to_string());
        }
        if !(0..=150).contains(&self.age) {
            return Err("Age must be between 0 and 150".to_string());
        }
        if !self.email.contains('@') || !self.email.contains('.') {
            return Err("Please enter a valid email".to_string());
        }
        if self.phone.trim().is_empty()
            || !self
                .phone
                .chars()
                .all(|c| c.is_ascii_digit() || "-+(). ".contains(c))
        {
            return Err("Please enter a valid phone number".to_string());
        }
        if self.condition.trim().len() < 2 || self.condition.len() > 200 {
            return Err("Condition must be between 2 and 200 characters".to_string());
        }
        if let Some(ref status) = self.status {
            if !PATIENT_STATUSES.contains(&status.as_str()) {
                return Err(format!("Unknown patient status '{status}'"));
            }
        }
        Ok(())
    }
}

// Dashboard payloads.

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardOverview {
    pub user: DashboardUser,
    pub current_weight: Option<f64>,
    pub current_bmi: Option<f64>,
    pub weight_progress: Option<WeightProgress>,
    pub upcoming_shipments: Vec<UpcomingShipment>,
    pub recent_shipments: Vec<RecentShipment>,
    pub stats: DashboardStats,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardUser {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub start_date: String,
    pub target_weight_kg: f64,
    pub height_cm: f64,
    pub days_since_start: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpcomingShipment {
    pub id: String,
    pub tracking_number: String,
    pub status: ShipmentStatus,
    pub expected_delivery: String,
    pub days_until_delivery: Option<i64>,
    pub medication: ShipmentMedication,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecentShipment {
    pub id: String,
    pub tracking_number: String,
    pub status: ShipmentStatus,
    pub delivery_date: Option<String>,
    pub medication: ShipmentMedication,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_weight_entries: i64,
    pub recent_entries_count: i64,
    pub total_shipments: i64,
    pub pending_shipments: i64,
}
