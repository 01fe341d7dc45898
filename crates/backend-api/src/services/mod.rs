pub mod dashboard;
pub mod error;
pub mod medication;
pub mod patient;
pub mod shipment;
pub mod weight;

pub use error::ServiceError;

use chrono::{DateTime, NaiveDate, Utc};

/// Parse a client-supplied timestamp: RFC3339, or a bare `YYYY-MM-DD`
/// interpreted as midnight UTC.
pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ServiceError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0).expect("midnight is valid");
        return Ok(DateTime::from_naive_utc_and_offset(midnight, Utc));
    }
    Err(ServiceError::bad_request(format!(
        "Invalid date '{value}'; expected RFC3339 or YYYY-MM-DD"
    )))
}

/// Pages needed to cover `total` rows at `limit` rows per page.
pub(crate) fn page_count(total: i64, limit: u32) -> i64 {
    let limit = i64::from(limit.max(1));
    (total + limit - 1) / limit
}
