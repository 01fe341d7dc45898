use adhere_auth::{AuthSession, NewUser, ProfileUpdate, User};
use axum::{extract::State, http::HeaderMap, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{services::parse_timestamp, util::require_bearer, ApiError, AppState};

pub const GENDERS: &[&str] = &["male", "female", "other"];
pub const ACTIVITY_LEVELS: &[&str] = &[
    "sedentary",
    "lightly_active",
    "moderately_active",
    "very_active",
    "extremely_active",
];

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    /// RFC3339 timestamp or `YYYY-MM-DD`.
    pub date_of_birth: String,
    pub gender: String,
    pub height_cm: f64,
    pub target_weight_kg: f64,
    pub activity_level: Option<String>,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.email.trim().is_empty() || !self.email.contains('@') || !self.email.contains('.') {
            return Err("Please enter a valid email".to_string());
        }
        if self.email.len() > 255 {
            return Err("Email too long (max 255 characters)".to_string());
        }
        if self.password.len() < 6 {
            return Err("Password must be at least 6 characters".to_string());
        }
        if self.first_name.trim().is_empty() || self.first_name.len() > 50 {
            return Err("First name must be between 1 and 50 characters".to_string());
        }
        if self.last_name.trim().is_empty() || self.last_name.len() > 50 {
            return Err("Last name must be between 1 and 50 characters".to_string());
        }
        if self.phone.trim().is_empty()
            || !self
                .phone
                .chars()
                .all(|c| c.is_ascii_digit() || "-+(). ".contains(c))
        {
            return Err("Please enter a valid phone number".to_string());
        }
        if !GENDERS.contains(&self.gender.as_str()) {
            return Err(format!("Unknown gender '{}'", self.gender));
        }
        if !(100.0..=250.0).contains(&self.height_cm) {
            return Err("Height must be between 100 and 250 cm".to_string());
        }
        if !(20.0..=500.0).contains(&self.target_weight_kg) {
            return Err("Target weight must be between 20 and 500 kg".to_string());
        }
        if let Some(ref level) = self.activity_level {
            if !ACTIVITY_LEVELS.contains(&level.as_str()) {
                return Err(format!("Unknown activity level '{level}'"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub height_cm: Option<f64>,
    pub target_weight_kg: Option<f64>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref first_name) = self.first_name {
            if first_name.trim().is_empty() || first_name.len() > 50 {
                return Err("First name must be between 1 and 50 characters".to_string());
            }
        }
        if let Some(ref last_name) = self.last_name {
            if last_name.trim().is_empty() || last_name.len() > 50 {
                return Err("Last name must be between 1 and 50 characters".to_string());
            }
        }
        if let Some(ref phone) = self.phone {
            if phone.trim().is_empty()
                || !phone
                    .chars()
                    .all(|c| c.is_ascii_digit() || "-+(). ".contains(c))
            {
                return Err("Please enter a valid phone number".to_string());
            }
        }
        if let Some(height_cm) = self.height_cm {
            if !(100.0..=250.0).contains(&height_cm) {
                return Err("Height must be between 100 and 250 cm".to_string());
            }
        }
        if let Some(target_weight_kg) = self.target_weight_kg {
            if !(20.0..=500.0).contains(&target_weight_kg) {
                return Err("Target weight must be between 20 and 500 kg".to_string());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub token: String,
    pub user: UserResponse,
    pub expires_at: String,
}

impl SessionResponse {
    pub fn new(session: AuthSession, user: User) -> Self {
        Self {
            token: session.token,
            user: user.into(),
            expires_at: session.expires_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub phone: String,
    pub date_of_birth: String,
    pub gender: String,
    pub height_cm: f64,
    pub target_weight_kg: f64,
    pub activity_level: String,
    pub start_date: String,
    pub age: i64,
    pub role: String,
    pub is_active: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let age = user.age(Utc::now());
        Self {
            id: user.public_id,
            email: user.email,
            full_name: format!("{} {}", user.first_name, user.last_name),
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            date_of_birth: user.date_of_birth.to_rfc3339(),
            gender: user.gender,
            height_cm: user.height_cm,
            target_weight_kg: user.target_weight_kg,
            activity_level: user.activity_level,
            start_date: user.start_date.to_rfc3339(),
            age,
            role: user.role,
            is_active: user.is_active,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub user: UserResponse,
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created and session issued", body = SessionResponse),
        (status = 400, description = "Invalid registration payload", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    req.validate().map_err(ApiError::bad_request)?;

    let date_of_birth = parse_timestamp(&req.date_of_birth)
        .map_err(|_| ApiError::bad_request("Invalid date of birth"))?;

    let (user, session) = state
        .authenticator()
        .register(NewUser {
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
            phone: req.phone,
            date_of_birth,
            gender: req.gender,
            height_cm: req.height_cm,
            target_weight_kg: req.target_weight_kg,
            activity_level: req.activity_level,
        })
        .await
        .map_err(ApiError::from)?;

    Ok(Json(SessionResponse::new(session, user)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = SessionResponse),
        (status = 400, description = "Missing email or password", body = crate::error::ErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Please provide an email and password"));
    }

    let session = state
        .authenticator()
        .login(req.email.trim(), &req.password)
        .await
        .map_err(ApiError::from)?;
    let user = state
        .authenticator()
        .user_profile(session.user_id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(SessionResponse::new(session, user)))
}

#[utoipa::path(
    get,
    path = "/api/auth/profile",
    tag = "Auth",
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = ProfileResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ProfileResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    Ok(Json(ProfileResponse { user: user.into() }))
}

#[utoipa::path(
    put,
    path = "/api/auth/profile",
    tag = "Auth",
    security(("bearerAuth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Invalid profile payload", body = crate::error::ErrorResponse),
        (status = 401, description = "Authentication required", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let token = require_bearer(&headers)?;
    let (user, _) = state.authenticate(&token).await?;

    req.validate().map_err(ApiError::bad_request)?;

    let updated = state
        .authenticator()
        .update_profile(
            user.id,
            ProfileUpdate {
                first_name: req.first_name,
                last_name: req.last_name,
                phone: req.phone,
                height_cm: req.height_cm,
                target_weight_kg: req.target_weight_kg,
            },
        )
        .await
        .map_err(ApiError::from)?;

    Ok(Json(ProfileResponse {
        user: updated.into(),
    }))
}
