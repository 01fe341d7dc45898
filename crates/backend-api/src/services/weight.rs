use adhere_auth::User;
use adhere_progress::{calculate_bmi, ProgressStats};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::{parse_timestamp, ServiceError};
use crate::routes::models::{
    ChartPoint, CreateWeightEntryRequest, UpdateWeightEntryRequest, WeightEntry,
};

const MIN_WEIGHT_KG: f64 = 30.0;
const MAX_WEIGHT_KG: f64 = 300.0;

pub struct EntryFilter {
    pub page: u32,
    pub limit: u32,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

pub struct EntryPage {
    pub entries: Vec<WeightEntry>,
    pub total: i64,
}

const ENTRY_COLUMNS: &str = "id, public_id, user_id, weight_kg, bmi, notes, entry_date, is_manual_entry, created_at, updated_at";

/// Entries newest-first with optional date-range filtering and pagination.
pub async fn list_entries(
    pool: &SqlitePool,
    user_id: i64,
    filter: &EntryFilter,
) -> Result<EntryPage, ServiceError> {
    let mut where_clause = String::from("WHERE user_id = ?");
    if filter.start_date.is_some() {
        where_clause.push_str(" AND entry_date >= ?");
    }
    if filter.end_date.is_some() {
        where_clause.push_str(" AND entry_date <= ?");
    }

    let limit = filter.limit.max(1);
    let offset = i64::from(filter.page.saturating_sub(1)) * i64::from(limit);

    let select = format!(
        "SELECT {ENTRY_COLUMNS} FROM weight_entries {where_clause} ORDER BY entry_date DESC LIMIT ? OFFSET ?"
    );

    let mut query = sqlx::query_as::<_, WeightEntry>(&select).bind(user_id);
    if let Some(start) = filter.start_date {
        query = query.bind(start.to_rfc3339());
    }
    if let Some(end) = filter.end_date {
        query = query.bind(end.to_rfc3339());
    }
    let entries = query
        .bind(i64::from(limit))
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let count_sql = format!("SELECT COUNT(*) FROM weight_entries {where_clause}");
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(user_id);
    if let Some(start) = filter.start_date {
        count_query = count_query.bind(start.to_rfc3339());
    }
    if let Some(end) = filter.end_date {
        count_query = count_query.bind(end.to_rfc3339());
    }
    let total = count_query.fetch_one(pool).await?;

    Ok(EntryPage { entries, total })
}

/// All entries on or after `since`, oldest first. Window selection happens
/// here, in the query; the aggregation itself never filters.
pub async fn window_entries(
    pool: &SqlitePool,
    user_id: i64,
    since: DateTime<Utc>,
) -> Result<Vec<WeightEntry>, ServiceError> {
    let select = format!(
        "SELECT {ENTRY_COLUMNS} FROM weight_entries WHERE user_id = ? AND entry_date >= ? ORDER BY entry_date ASC"
    );
    let entries = sqlx::query_as::<_, WeightEntry>(&select)
        .bind(user_id)
        .bind(since.to_rfc3339())
        .fetch_all(pool)
        .await?;
    Ok(entries)
}

pub async fn latest_entry(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Option<WeightEntry>, ServiceError> {
    let select = format!(
        "SELECT {ENTRY_COLUMNS} FROM weight_entries WHERE user_id = ? ORDER BY entry_date DESC LIMIT 1"
    );
    let entry = sqlx::query_as::<_, WeightEntry>(&select)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(entry)
}

pub async fn count_entries(pool: &SqlitePool, user_id: i64) -> Result<i64, ServiceError> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM weight_entries WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Chart data plus window statistics for entries since `since`.
pub async fn progress_report(
    pool: &SqlitePool,
    user: &User,
    since: DateTime<Utc>,
) -> Result<(Vec<ChartPoint>, Option<ProgressStats>), ServiceError> {
    let entries = window_entries(pool, user.id, since).await?;

    let chart_data = entries
        .iter()
        .map(|entry| ChartPoint {
            date: entry.entry_date.clone(),
            // Entries without a cached BMI get one computed from the height
            // as it is today, not as it was at entry time.
            bmi: entry
                .bmi
                .or_else(|| calculate_bmi(entry.weight_kg, user.height_cm)),
            weight: entry.weight_kg,
            notes: entry.notes.clone(),
        })
        .collect();

    let weights: Vec<f64> = entries.iter().map(|entry| entry.weight_kg).collect();
    let stats = ProgressStats::from_weights(&weights);

    Ok((chart_data, stats))
}

pub async fn add_entry(
    pool: &SqlitePool,
    user: &User,
    req: CreateWeightEntryRequest,
) -> Result<WeightEntry, ServiceError> {
    validate_weight(req.weight_kg)?;
    validate_notes(req.notes.as_deref())?;

    let now = Utc::now();
    let entry_date = match req.entry_date.as_deref() {
        Some(value) => parse_timestamp(value)?,
        None => now,
    };

    let public_id = cuid2::create_id();
    let bmi = calculate_bmi(req.weight_kg, user.height_cm);

    sqlx::query(
        r#"
        INSERT INTO weight_entries (public_id, user_id, weight_kg, bmi, notes, entry_date, is_manual_entry, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, true, ?, ?)
        "#,
    )
    .bind(&public_id)
    .bind(user.id)
    .bind(req.weight_kg)
    .bind(bmi)
    .bind(&req.notes)
    .bind(entry_date.to_rfc3339())
    .bind(now.to_rfc3339())
    .bind(now.to_rfc3339())
    .execute(pool)
    .await?;

    let entry_id = sqlx::query_scalar::<_, i64>("SELECT last_insert_rowid()")
        .fetch_one(pool)
        .await?;

    Ok(WeightEntry {
        id: entry_id,
        public_id,
        user_id: user.id,
        weight_kg: req.weight_kg,
        bmi,
        notes: req.notes,
        entry_date: entry_date.to_rfc3339(),
        is_manual_entry: true,
        created_at: now.to_rfc3339(),
        updated_at: now.to_rfc3339(),
    })
}

/// Owner-scoped update. The cached BMI is recomputed only when the weight
/// changes; a profile height change alone never rewrites it.
pub async fn update_entry(
    pool: &SqlitePool,
    user: &User,
    entry_public_id: &str,
    req: UpdateWeightEntryRequest,
) -> Result<WeightEntry, ServiceError> {
    let mut entry = get_entry(pool, user.id, entry_public_id).await?;

    if let Some(weight_kg) = req.weight_kg {
        validate_weight(weight_kg)?;
        entry.weight_kg = weight_kg;
        entry.bmi = calculate_bmi(weight_kg, user.height_cm);
    }
    if let Some(notes) = req.notes {
        validate_notes(Some(&notes))?;
        entry.notes = Some(notes);
    }
    if let Some(ref entry_date) = req.entry_date {
        entry.entry_date = parse_timestamp(entry_date)?.to_rfc3339();
    }
    entry.updated_at = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        UPDATE weight_entries
        SET weight_kg = ?, bmi = ?, notes = ?, entry_date = ?, updated_at = ?
        WHERE public_id = ? AND user_id = ?
        "#,
    )
    .bind(entry.weight_kg)
    .bind(entry.bmi)
    .bind(&entry.notes)
    .bind(&entry.entry_date)
    .bind(&entry.updated_at)
    .bind(entry_public_id)
    .bind(user.id)
    .execute(pool)
    .await?;

    Ok(entry)
}

pub async fn delete_entry(
    pool: &SqlitePool,
    user_id: i64,
    entry_public_id: &str,
) -> Result<(), ServiceError> {
    let result = sqlx::query("DELETE FROM weight_entries WHERE public_id = ? AND user_id = ?")
        .bind(entry_public_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ServiceError::not_found());
    }

    Ok(())
}

async fn get_entry(
    pool: &SqlitePool,
    user_id: i64,
    entry_public_id: &str,
) -> Result<WeightEntry, ServiceError> {
    let select = format!(
        "SELECT {ENTRY_COLUMNS} FROM weight_entries WHERE public_id = ? AND user_id = ?"
    );
    sqlx::query_as::<_, WeightEntry>(&select)
        .bind(entry_public_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(ServiceError::not_found)
}

fn validate_weight(weight_kg: f64) -> Result<(), ServiceError> {
    if !(MIN_WEIGHT_KG..=MAX_WEIGHT_KG).contains(&weight_kg) {
        return Err(ServiceError::bad_request(format!(
            "Weight must be between {MIN_WEIGHT_KG} and {MAX_WEIGHT_KG} kg"
        )));
    }
    Ok(())
}

fn validate_notes(notes: Option<&str>) -> Result<(), ServiceError> {
    if let Some(notes) = notes {
        if notes.len() > 500 {
            return Err(ServiceError::bad_request(
                "Notes cannot exceed 500 characters",
            ));
        }
    }
    Ok(())
}
