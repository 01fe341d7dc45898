use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use cuid2::CuidConstructor;
use once_cell::sync::Lazy;
use rand::RngCore;
use serde::Serialize;
use sqlx::{Row, SqlitePool, Transaction};
use thiserror::Error;
use tracing::info;

use adhere_config::AuthConfig;

static CUID: Lazy<CuidConstructor> = Lazy::new(CuidConstructor::new);

#[derive(Clone)]
pub struct Authenticator {
    pool: SqlitePool,
    session_ttl: Duration,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user already exists")]
    UserExists,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user not found")]
    UserNotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),
    #[error("invalid stored timestamp: {0}")]
    InvalidTimestamp(#[from] chrono::ParseError),
    #[error("session not found")]
    SessionNotFound,
    #[error("session expired")]
    SessionExpired,
}

/// A registered account together with its health-program profile.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    #[serde(skip_serializing)]
    pub id: i64,
    pub public_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub date_of_birth: DateTime<Utc>,
    pub gender: String,
    pub height_cm: f64,
    pub target_weight_kg: f64,
    pub activity_level: String,
    pub start_date: DateTime<Utc>,
    pub role: String,
    pub is_active: bool,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whole years elapsed since the date of birth.
    pub fn age(&self, now: DateTime<Utc>) -> i64 {
        let millis = (now - self.date_of_birth).num_milliseconds() as f64;
        (millis / (365.25 * 24.0 * 60.0 * 60.0 * 1000.0)).floor() as i64
    }
}

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

/// Registration payload. Field validation happens at the API boundary;
/// this layer only enforces email uniqueness.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub date_of_birth: DateTime<Utc>,
    pub gender: String,
    pub height_cm: f64,
    pub target_weight_kg: f64,
    pub activity_level: Option<String>,
}

/// Partial profile update; `None` fields are left untouched. Changing the
/// height never rewrites BMI values cached on existing weight entries.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub height_cm: Option<f64>,
    pub target_weight_kg: Option<f64>,
}

impl Authenticator {
    pub fn new(pool: SqlitePool, config: AuthConfig) -> Self {
        let session_ttl = Duration::seconds(config.session_ttl_seconds as i64);
        Self { pool, session_ttl }
    }

    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    /// Create an account and immediately issue a session for it.
    pub async fn register(&self, new_user: NewUser) -> Result<(User, AuthSession), AuthError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query("SELECT id FROM users WHERE email = ?")
            .bind(&new_user.email)
            .fetch_optional(&mut *tx)
            .await?;

        if existing.is_some() {
            return Err(AuthError::UserExists);
        }

        let now = Utc::now();
        let password_hash = self.hash_password(&new_user.password)?;

        let user = self.insert_user(&mut tx, &new_user, now).await?;

        sqlx::query(
            "INSERT INTO user_identities (user_id, provider, provider_uid, secret, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id)
        .bind("password")
        .bind(&new_user.email)
        .bind(password_hash)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(user = %user.public_id, "registered new account");
        let session = self.issue_session(user.id).await?;
        Ok((user, session))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let identity = sqlx::query(
            "SELECT user_id, secret FROM user_identities WHERE provider = 'password' AND provider_uid = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = identity else {
            return Err(AuthError::InvalidCredentials);
        };

        let secret: String = row.try_get("secret")?;
        let stored_hash = PasswordHash::new(&secret)?;
        Argon2::default()
            .verify_password(password.as_bytes(), &stored_hash)
            .map_err(|_| AuthError::InvalidCredentials)?;

        let user_id: i64 = row.try_get("user_id")?;
        self.fetch_user(user_id).await?;

        self.issue_session(user_id).await
    }

    pub async fn authenticate_token(&self, token: &str) -> Result<(User, AuthSession), AuthError> {
        let row = sqlx::query("SELECT user_id, expires_at FROM sessions WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Err(AuthError::SessionNotFound);
        };

        let user_id: i64 = row.try_get("user_id")?;
        let expires_at: String = row.try_get("expires_at")?;
        let expires_at = DateTime::parse_from_rfc3339(&expires_at)?.with_timezone(&Utc);

        if expires_at <= Utc::now() {
            sqlx::query("DELETE FROM sessions WHERE token = ?")
                .bind(token)
                .execute(&self.pool)
                .await?;
            return Err(AuthError::SessionExpired);
        }

        let user = self.fetch_user(user_id).await?;
        let session = AuthSession {
            token: token.to_owned(),
            user_id,
            expires_at,
        };

        Ok((user, session))
    }

    pub async fn user_profile(&self, user_id: i64) -> Result<User, AuthError> {
        self.fetch_user(user_id).await
    }

    pub async fn update_profile(
        &self,
        user_id: i64,
        update: ProfileUpdate,
    ) -> Result<User, AuthError> {
        let mut assignments = Vec::new();
        let mut text_values = Vec::new();
        let mut number_values = Vec::new();

        if let Some(first_name) = update.first_name {
            assignments.push("first_name = ?");
            text_values.push(first_name);
        }
        if let Some(last_name) = update.last_name {
            assignments.push("last_name = ?");
            text_values.push(last_name);
        }
        if let Some(phone) = update.phone {
            assignments.push("phone = ?");
            text_values.push(phone);
        }
        if let Some(height_cm) = update.height_cm {
            assignments.push("height_cm = ?");
            number_values.push(height_cm);
        }
        if let Some(target_weight_kg) = update.target_weight_kg {
            assignments.push("target_weight_kg = ?");
            number_values.push(target_weight_kg);
        }

        if assignments.is_empty() {
            return self.fetch_user(user_id).await;
        }

        assignments.push("updated_at = ?");
        let updated_at = Utc::now().to_rfc3339();

        let query_str = format!(
            "UPDATE users SET {} WHERE id = ?",
            assignments.join(", ")
        );

        // Text assignments precede numeric ones, with updated_at trailing;
        // bind in the same order the placeholders appear.
        let mut query = sqlx::query(&query_str);
        for value in text_values {
            query = query.bind(value);
        }
        for value in number_values {
            query = query.bind(value);
        }
        query = query.bind(updated_at).bind(user_id);

        let result = query.execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }

        self.fetch_user(user_id).await
    }

    async fn insert_user(
        &self,
        tx: &mut Transaction<'_, sqlx::Sqlite>,
        new_user: &NewUser,
        now: DateTime<Utc>,
    ) -> Result<User, AuthError> {
        let public_id = new_public_id();
        let activity_level = new_user
            .activity_level
            .clone()
            .unwrap_or_else(|| "moderately_active".to_string());

        sqlx::query(
            r#"
            INSERT INTO users (
                public_id, email, first_name, last_name, phone, date_of_birth,
                gender, height_cm, target_weight_kg, activity_level, start_date,
                role, is_active, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'patient', true, ?, ?)
            "#,
        )
        .bind(&public_id)
        .bind(&new_user.email)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(&new_user.phone)
        .bind(new_user.date_of_birth.to_rfc3339())
        .bind(&new_user.gender)
        .bind(new_user.height_cm)
        .bind(new_user.target_weight_kg)
        .bind(&activity_level)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&mut **tx)
        .await?;

        let row = sqlx::query("SELECT id FROM users WHERE public_id = ?")
            .bind(&public_id)
            .fetch_one(&mut **tx)
            .await?;

        Ok(User {
            id: row.try_get("id")?,
            public_id,
            email: new_user.email.clone(),
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            phone: new_user.phone.clone(),
            date_of_birth: new_user.date_of_birth,
            gender: new_user.gender.clone(),
            height_cm: new_user.height_cm,
            target_weight_kg: new_user.target_weight_kg,
            activity_level,
            start_date: now,
            role: "patient".to_string(),
            is_active: true,
        })
    }

    async fn fetch_user(&self, id: i64) -> Result<User, AuthError> {
        let row = sqlx::query(
            r#"
            SELECT id, public_id, email, first_name, last_name, phone,
                   date_of_birth, gender, height_cm, target_weight_kg,
                   activity_level, start_date, role, is_active
            FROM users WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Err(AuthError::UserNotFound);
        };

        let date_of_birth: String = row.try_get("date_of_birth")?;
        let start_date: String = row.try_get("start_date")?;

        Ok(User {
            id: row.try_get("id")?,
            public_id: row.try_get("public_id")?,
            email: row.try_get("email")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            phone: row.try_get("phone")?,
            date_of_birth: DateTime::parse_from_rfc3339(&date_of_birth)?.with_timezone(&Utc),
            gender: row.try_get("gender")?,
            height_cm: row.try_get("height_cm")?,
            target_weight_kg: row.try_get("target_weight_kg")?,
            activity_level: row.try_get("activity_level")?,
            start_date: DateTime::parse_from_rfc3339(&start_date)?.with_timezone(&Utc),
            role: row.try_get("role")?,
            is_active: row.try_get("is_active")?,
        })
    }

    async fn issue_session(&self, user_id: i64) -> Result<AuthSession, AuthError> {
        let token = self.generate_session_token();
        let now = Utc::now();
        let expires_at = now + self.session_ttl;

        sqlx::query(
            "INSERT INTO sessions (user_id, token, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&token)
        .bind(now.to_rfc3339())
        .bind(expires_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(AuthSession {
            token,
            user_id,
            expires_at,
        })
    }

    fn hash_password(&self, password: &str) -> Result<String, argon2::password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    fn generate_session_token(&self) -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}

fn new_public_id() -> String {
    CUID.create_id()
}
