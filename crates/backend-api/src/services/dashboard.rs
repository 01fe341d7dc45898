use adhere_auth::User;
use adhere_progress::{calculate_bmi, days_since, WeightProgress};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use super::{shipment, weight, ServiceError};
use crate::routes::models::{
    DashboardOverview, DashboardStats, DashboardUser, RecentShipment, UpcomingShipment,
};

const OVERVIEW_WINDOW_DAYS: i64 = 30;
const OVERVIEW_SHIPMENT_LIMIT: u32 = 3;

/// Assemble the dashboard overview for one user.
///
/// The caller has already resolved the profile (authentication fails the
/// request outright when the user is missing, so there is never a partial
/// dashboard). Missing weight or shipment data shows up as nulls and empty
/// lists. Pure reads throughout: composing twice without intervening
/// writes yields the same payload.
pub async fn overview(pool: &SqlitePool, user: &User) -> Result<DashboardOverview, ServiceError> {
    let now = Utc::now();
    let window_start = now - Duration::days(OVERVIEW_WINDOW_DAYS);

    let latest_entry = weight::latest_entry(pool, user.id).await?;
    let recent_entries = weight::window_entries(pool, user.id, window_start).await?;

    // Current BMI reflects today's height, not whatever was cached on the
    // entry when it was written.
    let current_bmi = latest_entry
        .as_ref()
        .and_then(|entry| calculate_bmi(entry.weight_kg, user.height_cm));

    let weight_progress = latest_entry.as_ref().map(|entry| {
        let start_weight = recent_entries
            .first()
            .map(|first| first.weight_kg)
            .unwrap_or(entry.weight_kg);
        WeightProgress::toward_target(start_weight, entry.weight_kg, user.target_weight_kg)
    });

    // The shipment and count lookups are independent of each other.
    let (upcoming, recent_deliveries, total_shipments, total_weight_entries) = tokio::try_join!(
        shipment::upcoming_shipments(pool, user.id, OVERVIEW_SHIPMENT_LIMIT),
        shipment::recent_deliveries(pool, user.id, OVERVIEW_SHIPMENT_LIMIT),
        shipment::count_shipments(pool, user.id),
        weight::count_entries(pool, user.id),
    )?;

    let upcoming_shipments: Vec<UpcomingShipment> = upcoming
        .into_iter()
        .map(|shipment| UpcomingShipment {
            id: shipment.public_id,
            tracking_number: shipment.tracking_number,
            status: shipment.status,
            expected_delivery: shipment.dates.expected_delivery_date,
            days_until_delivery: shipment.days_until_delivery,
            medication: shipment.medication,
        })
        .collect();

    let recent_shipments = recent_deliveries
        .into_iter()
        .map(|shipment| RecentShipment {
            id: shipment.public_id,
            tracking_number: shipment.tracking_number,
            status: shipment.status,
            delivery_date: shipment.dates.actual_delivery_date,
            medication: shipment.medication,
        })
        .collect();

    let pending_shipments = upcoming_shipments.len() as i64;

    Ok(DashboardOverview {
        user: DashboardUser {
            id: user.public_id.clone(),
            full_name: user.full_name(),
            email: user.email.clone(),
            start_date: user.start_date.to_rfc3339(),
            target_weight_kg: user.target_weight_kg,
            height_cm: user.height_cm,
            days_since_start: days_since(user.start_date, now),
        },
        current_weight: latest_entry.as_ref().map(|entry| entry.weight_kg),
        current_bmi,
        weight_progress,
        upcoming_shipments,
        recent_shipments,
        stats: DashboardStats {
            total_weight_entries,
            recent_entries_count: recent_entries.len() as i64,
            total_shipments,
            pending_shipments,
        },
    })
}
