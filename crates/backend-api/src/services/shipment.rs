use adhere_progress::{days_until_delivery, shipment_duration, ShipmentStatus};
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::ServiceError;
use crate::routes::models::{
    Shipment, ShipmentCost, ShipmentDates, ShipmentMedication, ShippingAddress,
};

pub struct ShipmentFilter {
    pub page: u32,
    pub limit: u32,
    pub status: Option<String>,
}

pub struct ShipmentPage {
    pub shipments: Vec<Shipment>,
    pub total: i64,
}

const SHIPMENT_COLUMNS: &str = "id, public_id, user_id, tracking_number, status, medication_name, medication_kind, dosage, quantity, unit, street, city, state, zip_code, country, order_date, shipped_date, expected_delivery_date, actual_delivery_date, carrier, cost_medication, cost_shipping, cost_total, notes, is_emergency, created_at, updated_at";

/// Shipments by latest expected delivery first, optionally filtered by
/// status. Countdown fields are derived against the current clock.
pub async fn list_shipments(
    pool: &SqlitePool,
    user_id: i64,
    filter: &ShipmentFilter,
) -> Result<ShipmentPage, ServiceError> {
    let mut where_clause = String::from("WHERE user_id = ?");
    if filter.status.is_some() {
        where_clause.push_str(" AND status = ?");
    }

    let limit = filter.limit.max(1);
    let offset = i64::from(filter.page.saturating_sub(1)) * i64::from(limit);

    let select = format!(
        "SELECT {SHIPMENT_COLUMNS} FROM shipments {where_clause} ORDER BY expected_delivery_date DESC LIMIT ? OFFSET ?"
    );

    let mut query = sqlx::query(&select).bind(user_id);
    if let Some(ref status) = filter.status {
        query = query.bind(status);
    }
    let rows = query
        .bind(i64::from(limit))
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let now = Utc::now();
    let shipments = rows
        .into_iter()
        .map(|row| shipment_from_row(row, now))
        .collect::<Result<Vec<_>, _>>()?;

    let count_sql = format!("SELECT COUNT(*) FROM shipments {where_clause}");
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(user_id);
    if let Some(ref status) = filter.status {
        count_query = count_query.bind(status);
    }
    let total = count_query.fetch_one(pool).await?;

    Ok(ShipmentPage { shipments, total })
}

/// Up to `limit` undelivered shipments, soonest expected delivery first.
pub async fn upcoming_shipments(
    pool: &SqlitePool,
    user_id: i64,
    limit: u32,
) -> Result<Vec<Shipment>, ServiceError> {
    let select = format!(
        r#"
        SELECT {SHIPMENT_COLUMNS} FROM shipments
        WHERE user_id = ? AND status IN ('pending', 'shipped', 'in_transit')
        ORDER BY expected_delivery_date ASC
        LIMIT ?
        "#
    );
    let rows = sqlx::query(&select)
        .bind(user_id)
        .bind(i64::from(limit))
        .fetch_all(pool)
        .await?;

    let now = Utc::now();
    rows.into_iter().map(|row| shipment_from_row(row, now)).collect()
}

/// Up to `limit` delivered shipments, most recent delivery first.
pub async fn recent_deliveries(
    pool: &SqlitePool,
    user_id: i64,
    limit: u32,
) -> Result<Vec<Shipment>, ServiceError> {
    let select = format!(
        r#"
        SELECT {SHIPMENT_COLUMNS} FROM shipments
        WHERE user_id = ? AND status = 'delivered'
        ORDER BY actual_delivery_date DESC
        LIMIT ?
        "#
    );
    let rows = sqlx::query(&select)
        .bind(user_id)
        .bind(i64::from(limit))
        .fetch_all(pool)
        .await?;

    let now = Utc::now();
    rows.into_iter().map(|row| shipment_from_row(row, now)).collect()
}

pub async fn count_shipments(pool: &SqlitePool, user_id: i64) -> Result<i64, ServiceError> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM shipments WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

fn shipment_from_row(row: SqliteRow, now: DateTime<Utc>) -> Result<Shipment, ServiceError> {
    let status_str: String = row.try_get("status")?;
    let status = ShipmentStatus::from(status_str.as_str());

    let shipped_date: Option<String> = row.try_get("shipped_date")?;
    let expected_delivery_date: String = row.try_get("expected_delivery_date")?;
    let actual_delivery_date: Option<String> = row.try_get("actual_delivery_date")?;

    let expected = parse_date(Some(&expected_delivery_date));
    let shipped = parse_date(shipped_date.as_deref());
    let delivered = parse_date(actual_delivery_date.as_deref());

    Ok(Shipment {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        user_id: row.try_get("user_id")?,
        tracking_number: row.try_get("tracking_number")?,
        status,
        medication: ShipmentMedication {
            name: row.try_get("medication_name")?,
            kind: row.try_get("medication_kind")?,
            dosage: row.try_get("dosage")?,
            quantity: row.try_get("quantity")?,
            unit: row.try_get("unit")?,
        },
        shipping_address: ShippingAddress {
            street: row.try_get("street")?,
            city: row.try_get("city")?,
            state: row.try_get("state")?,
            zip_code: row.try_get("zip_code")?,
            country: row.try_get("country")?,
        },
        dates: ShipmentDates {
            order_date: row.try_get("order_date")?,
            shipped_date,
            expected_delivery_date,
            actual_delivery_date,
        },
        carrier: row.try_get("carrier")?,
        cost: ShipmentCost {
            medication: row.try_get("cost_medication")?,
            shipping: row.try_get("cost_shipping")?,
            total: row.try_get("cost_total")?,
        },
        notes: row.try_get("notes")?,
        is_emergency: row.try_get("is_emergency")?,
        days_until_delivery: days_until_delivery(status, expected, now),
        shipment_duration: shipment_duration(shipped, delivered),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn parse_date(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|parsed| parsed.with_timezone(&Utc))
}
