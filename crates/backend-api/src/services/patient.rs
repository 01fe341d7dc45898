use chrono::Utc;
use sqlx::SqlitePool;

use super::ServiceError;
use crate::routes::models::{Patient, PatientRequest};

pub struct PatientFilter {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub status: Option<String>,
    pub condition: Option<String>,
}

pub struct PatientPage {
    pub patients: Vec<Patient>,
    pub total: i64,
}

const PATIENT_COLUMNS: &str = "id, public_id, name, age, email, phone, condition, status, medication_kind, medication_dosage, last_visit, created_at, updated_at";

/// Clinician-facing listing with name search and status/condition filters.
pub async fn list_patients(
    pool: &SqlitePool,
    filter: &PatientFilter,
) -> Result<PatientPage, ServiceError> {
    let mut where_parts = Vec::new();
    let mut patterns = Vec::new();

    if let Some(ref search) = filter.search {
        where_parts.push("name LIKE ?");
        patterns.push(format!("%{search}%"));
    }
    if let Some(ref status) = filter.status {
        where_parts.push("status = ?");
        patterns.push(status.clone());
    }
    if let Some(ref condition) = filter.condition {
        where_parts.push("condition LIKE ?");
        patterns.push(format!("%{condition}%"));
    }

    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", where_parts.join(" AND "))
    };

    let limit = filter.limit.max(1);
    let offset = i64::from(filter.page.saturating_sub(1)) * i64::from(limit);

    let select = format!(
        "SELECT {PATIENT_COLUMNS} FROM patients {where_clause} ORDER BY created_at DESC LIMIT ? OFFSET ?"
    );

    let mut query = sqlx::query_as::<_, Patient>(&select);
    for pattern in &patterns {
        query = query.bind(pattern);
    }
    let patients = query
        .bind(i64::from(limit))
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let count_sql = format!("SELECT COUNT(*) FROM patients {where_clause}");
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for pattern in &patterns {
        count_query = count_query.bind(pattern);
    }
    let total = count_query.fetch_one(pool).await?;

    Ok(PatientPage { patients, total })
}

pub async fn get_patient(
    pool: &SqlitePool,
    patient_public_id: &str,
) -> Result<Patient, ServiceError> {
    let select = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE public_id = ?");
    sqlx::query_as::<_, Patient>(&select)
        .bind(patient_public_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(ServiceError::not_found)
}

pub async fn create_patient(
    pool: &SqlitePool,
    req: PatientRequest,
) -> Result<Patient, ServiceError> {
    req.validate().map_err(ServiceError::bad_request)?;

    let now = Utc::now().to_rfc3339();
    let public_id = cuid2::create_id();
    let status = req.status.unwrap_or_else(|| "active".to_string());
    let medication_kind = req
        .medication_kind
        .unwrap_or_else(|| "semaglutide".to_string());
    let medication_dosage = req
        .medication_dosage
        .or_else(|| Some("0.25mg".to_string()));

    sqlx::query(
        r#"
        INSERT INTO patients (public_id, name, age, email, phone, condition, status, medication_kind, medication_dosage, last_visit, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&public_id)
    .bind(&req.name)
    .bind(req.age)
    .bind(&req.email)
    .bind(&req.phone)
    .bind(&req.condition)
    .bind(&status)
    .bind(&medication_kind)
    .bind(&medication_dosage)
    .bind(&now)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .map_err(duplicate_email_error)?;

    let patient_id = sqlx::query_scalar::<_, i64>("SELECT last_insert_rowid()")
        .fetch_one(pool)
        .await?;

    Ok(Patient {
        id: patient_id,
        public_id,
        name: req.name,
        age: req.age,
        email: req.email,
        phone: req.phone,
        condition: req.condition,
        status,
        medication_kind,
        medication_dosage,
        last_visit: now.clone(),
        created_at: now.clone(),
        updated_at: now,
    })
}

pub async fn update_patient(
    pool: &SqlitePool,
    patient_public_id: &str,
    req: PatientRequest,
) -> Result<Patient, ServiceError> {
    req.validate().map_err(ServiceError::bad_request)?;

    let now = Utc::now().to_rfc3339();

    let result = sqlx::query(
        r#"
        UPDATE patients
        SET name = ?, age = ?, email = ?, phone = ?, condition = ?,
            status = COALESCE(?, status), updated_at = ?
        WHERE public_id = ?
        "#,
    )
    .bind(&req.name)
    .bind(req.age)
    .bind(&req.email)
    .bind(&req.phone)
    .bind(&req.condition)
    .bind(&req.status)
    .bind(&now)
    .bind(patient_public_id)
    .execute(pool)
    .await
    .map_err(duplicate_email_error)?;

    if result.rows_affected() == 0 {
        return Err(ServiceError::not_found());
    }

    get_patient(pool, patient_public_id).await
}

pub async fn delete_patient(
    pool: &SqlitePool,
    patient_public_id: &str,
) -> Result<Patient, ServiceError> {
    let patient = get_patient(pool, patient_public_id).await?;

    sqlx::query("DELETE FROM patients WHERE public_id = ?")
        .bind(patient_public_id)
        .execute(pool)
        .await?;

    Ok(patient)
}

fn duplicate_email_error(err: sqlx::Error) -> ServiceError {
    if err.to_string().contains("UNIQUE constraint failed") {
        ServiceError::bad_request("Patient with this email already exists")
    } else {
        ServiceError::Database(err)
    }
}
