use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const MS_PER_DAY: i64 = 86_400_000;

/// Delivery lifecycle of a shipment. There is no enforced transition
/// graph; any status may be set directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    Pending,
    Shipped,
    InTransit,
    Delivered,
    Cancelled,
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Pending => "pending",
            ShipmentStatus::Shipped => "shipped",
            ShipmentStatus::InTransit => "in_transit",
            ShipmentStatus::Delivered => "delivered",
            ShipmentStatus::Cancelled => "cancelled",
        }
    }
}

impl From<&str> for ShipmentStatus {
    fn from(s: &str) -> Self {
        match s {
            "shipped" => ShipmentStatus::Shipped,
            "in_transit" => ShipmentStatus::InTransit,
            "delivered" => ShipmentStatus::Delivered,
            "cancelled" => ShipmentStatus::Cancelled,
            _ => ShipmentStatus::Pending,
        }
    }
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whole days elapsed since `start`, rounded down.
pub fn days_since(start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - start).num_milliseconds().div_euclid(MS_PER_DAY)
}

/// Whole days until the expected delivery, rounded up. Delivered shipments
/// and shipments without an expected date have no countdown.
///
/// Note the asymmetry with [`days_since`]: countdowns round up so a partial
/// day still reads as "1 day left", while elapsed-day counts round down.
pub fn days_until_delivery(
    status: ShipmentStatus,
    expected_delivery: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<i64> {
    if status == ShipmentStatus::Delivered {
        return None;
    }
    let expected = expected_delivery?;
    Some(div_ceil_ms((expected - now).num_milliseconds()))
}

/// Whole days between dispatch and delivery, rounded up; `None` unless both
/// dates are known.
pub fn shipment_duration(
    shipped: Option<DateTime<Utc>>,
    delivered: Option<DateTime<Utc>>,
) -> Option<i64> {
    let (shipped, delivered) = (shipped?, delivered?);
    Some(div_ceil_ms((delivered - shipped).num_milliseconds()))
}

fn div_ceil_ms(ms: i64) -> i64 {
    -((-ms).div_euclid(MS_PER_DAY))
}
