use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::{parse_timestamp, ServiceError};
use crate::routes::models::{CreateMedicationRequest, Medication, UpdateMedicationRequest};

pub struct MedicationFilter {
    pub page: u32,
    pub limit: u32,
    pub status: Option<String>,
}

pub struct MedicationPage {
    pub medications: Vec<Medication>,
    pub total: i64,
}

const MEDICATION_COLUMNS: &str = "id, public_id, user_id, name, kind, dosage, frequency, instructions, prescribed_date, end_date, status, remaining_days, prescriber_name, prescriber_contact, side_effects, notes, created_at, updated_at";

/// Medications newest-prescribed first, optionally filtered by status.
pub async fn list_medications(
    pool: &SqlitePool,
    user_id: i64,
    filter: &MedicationFilter,
) -> Result<MedicationPage, ServiceError> {
    let mut where_clause = String::from("WHERE user_id = ?");
    if filter.status.is_some() {
        where_clause.push_str(" AND status = ?");
    }

    let limit = filter.limit.max(1);
    let offset = i64::from(filter.page.saturating_sub(1)) * i64::from(limit);

    let select = format!(
        "SELECT {MEDICATION_COLUMNS} FROM medications {where_clause} ORDER BY prescribed_date DESC LIMIT ? OFFSET ?"
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

    let medications = rows
        .into_iter()
        .map(medication_from_row)
        .collect::<Result<Vec<_>, _>>()?;

    let count_sql = format!("SELECT COUNT(*) FROM medications {where_clause}");
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(user_id);
    if let Some(ref status) = filter.status {
        count_query = count_query.bind(status);
    }
    let total = count_query.fetch_one(pool).await?;

    Ok(MedicationPage { medications, total })
}

pub async fn create_medication(
    pool: &SqlitePool,
    user_id: i64,
    req: CreateMedicationRequest,
) -> Result<Medication, ServiceError> {
    req.validate().map_err(ServiceError::bad_request)?;

    let now = Utc::now();
    let public_id = cuid2::create_id();
    let prescribed_date = match req.prescribed_date.as_deref() {
        Some(value) => parse_timestamp(value)?.to_rfc3339(),
        None => now.to_rfc3339(),
    };
    let end_date = match req.end_date.as_deref() {
        Some(value) => Some(parse_timestamp(value)?.to_rfc3339()),
        None => None,
    };
    let status = req.status.unwrap_or_else(|| "active".to_string());
    let side_effects_json = serde_json::to_string(&req.side_effects)
        .map_err(|e| ServiceError::internal(e.to_string()))?;

    sqlx::query(
        r#"
        INSERT INTO medications (
            public_id, user_id, name, kind, dosage, frequency, instructions,
            prescribed_date, end_date, status, remaining_days,
            prescriber_name, prescriber_contact, side_effects, notes,
            created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&public_id)
    .bind(user_id)
    .bind(&req.name)
    .bind(&req.kind)
    .bind(&req.dosage)
    .bind(&req.frequency)
    .bind(&req.instructions)
    .bind(&prescribed_date)
    .bind(&end_date)
    .bind(&status)
    .bind(req.remaining_days)
    .bind(&req.prescriber_name)
    .bind(&req.prescriber_contact)
    .bind(&side_effects_json)
    .bind(&req.notes)
    .bind(now.to_rfc3339())
    .bind(now.to_rfc3339())
    .execute(pool)
    .await?;

    let medication_id = sqlx::query_scalar::<_, i64>("SELECT last_insert_rowid()")
        .fetch_one(pool)
        .await?;

    Ok(Medication {
        id: medication_id,
        public_id,
        user_id,
        name: req.name,
        kind: req.kind,
        dosage: req.dosage,
        frequency: req.frequency,
        instructions: req.instructions,
        prescribed_date,
        end_date,
        status,
        remaining_days: req.remaining_days,
        prescriber_name: req.prescriber_name,
        prescriber_contact: req.prescriber_contact,
        side_effects: req.side_effects,
        notes: req.notes,
        created_at: now.to_rfc3339(),
        updated_at: now.to_rfc3339(),
    })
}

pub async fn update_medication(
    pool: &SqlitePool,
    user_id: i64,
    medication_public_id: &str,
    req: UpdateMedicationRequest,
) -> Result<Medication, ServiceError> {
    req.validate().map_err(ServiceError::bad_request)?;

    let mut medication = get_medication(pool, user_id, medication_public_id).await?;

    if let Some(name) = req.name {
        medication.name = name;
    }
    if let Some(kind) = req.kind {
        medication.kind = kind;
    }
    if let Some(dosage) = req.dosage {
        medication.dosage = dosage;
    }
    if let Some(frequency) = req.frequency {
        medication.frequency = frequency;
    }
    if let Some(instructions) = req.instructions {
        medication.instructions = Some(instructions);
    }
    if let Some(ref prescribed_date) = req.prescribed_date {
        medication.prescribed_date = parse_timestamp(prescribed_date)?.to_rfc3339();
    }
    if let Some(ref end_date) = req.end_date {
        medication.end_date = Some(parse_timestamp(end_date)?.to_rfc3339());
    }
    if let Some(status) = req.status {
        medication.status = status;
    }
    if let Some(remaining_days) = req.remaining_days {
        medication.remaining_days = Some(remaining_days);
    }
    if let Some(prescriber_name) = req.prescriber_name {
        medication.prescriber_name = Some(prescriber_name);
    }
    if let Some(prescriber_contact) = req.prescriber_contact {
        medication.prescriber_contact = Some(prescriber_contact);
    }
    if let Some(side_effects) = req.side_effects {
        medication.side_effects = side_effects;
    }
    if let Some(notes) = req.notes {
        medication.notes = Some(notes);
    }
    medication.updated_at = Utc::now().to_rfc3339();

    let side_effects_json = serde_json::to_string(&medication.side_effects)
        .map_err(|e| ServiceError::internal(e.to_string()))?;

    sqlx::query(
        r#"
        UPDATE medications
        SET name = ?, kind = ?, dosage = ?, frequency = ?, instructions = ?,
            prescribed_date = ?, end_date = ?, status = ?, remaining_days = ?,
            prescriber_name = ?, prescriber_contact = ?, side_effects = ?,
            notes = ?, updated_at = ?
        WHERE public_id = ? AND user_id = ?
        "#,
    )
    .bind(&medication.name)
    .bind(&medication.kind)
    .bind(&medication.dosage)
    .bind(&medication.frequency)
    .bind(&medication.instructions)
    .bind(&medication.prescribed_date)
    .bind(&medication.end_date)
    .bind(&medication.status)
    .bind(medication.remaining_days)
    .bind(&medication.prescriber_name)
    .bind(&medication.prescriber_contact)
    .bind(&side_effects_json)
    .bind(&medication.notes)
    .bind(&medication.updated_at)
    .bind(medication_public_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(medication)
}

pub async fn delete_medication(
    pool: &SqlitePool,
    user_id: i64,
    medication_public_id: &str,
) -> Result<(), ServiceError> {
    let result = sqlx::query("DELETE FROM medications WHERE public_id = ? AND user_id = ?")
        .bind(medication_public_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ServiceError::not_found());
    }

    Ok(())
}

async fn get_medication(
    pool: &SqlitePool,
    user_id: i64,
    medication_public_id: &str,
) -> Result<Medication, ServiceError> {
    let select = format!(
        "SELECT {MEDICATION_COLUMNS} FROM medications WHERE public_id = ? AND user_id = ?"
    );
    let row = sqlx::query(&select)
        .bind(medication_public_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(ServiceError::not_found)?;

    medication_from_row(row)
}

fn medication_from_row(row: SqliteRow) -> Result<Medication, ServiceError> {
    let side_effects_json: String = row.try_get("side_effects").map_err(ServiceError::from)?;
    let side_effects = serde_json::from_str(&side_effects_json).unwrap_or_default();

    Ok(Medication {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        kind: row.try_get("kind")?,
        dosage: row.try_get("dosage")?,
        frequency: row.try_get("frequency")?,
        instructions: row.try_get("instructions")?,
        prescribed_date: row.try_get("prescribed_date")?,
        end_date: row.try_get("end_date")?,
        status: row.try_get("status")?,
        remaining_days: row.try_get("remaining_days")?,
        prescriber_name: row.try_get("prescriber_name")?,
        prescriber_contact: row.try_get("prescriber_contact")?,
        side_effects,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
