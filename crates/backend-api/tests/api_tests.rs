use std::str::FromStr;

use axum::{
    body::Body,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method, Request, StatusCode,
    },
    Router,
};
use chrono::{DateTime, Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tempfile::TempDir;
use tower::ServiceExt;

use adhere_auth::Authenticator;
use adhere_backend_api::{build_router, AppState};
use adhere_config::AppConfig;

type TestResult<T = ()> = anyhow::Result<T>;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

struct TestContext {
    _temp_dir: TempDir,
    pool: SqlitePool,
    state: AppState,
}

impl TestContext {
    async fn new() -> TestResult<Self> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("backend_api.sqlite");
        let db_url = format!("sqlite://{}", db_path.display());

        let options = SqliteConnectOptions::from_str(&db_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        MIGRATOR.run(&pool).await?;

        let config = AppConfig::default();
        let authenticator = Authenticator::new(pool.clone(), config.auth.clone());
        let state = AppState::new(pool.clone(), authenticator);

        Ok(Self {
            _temp_dir: temp_dir,
            pool,
            state,
        })
    }

    fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Register a user and return the session token and the user's row id.
    async fn register_user(&self, email: &str) -> TestResult<(String, i64)> {
        let (status, body) = request(
            self.router(),
            Method::POST,
            "/api/auth/register",
            None,
            Some(register_payload(email)),
        )
        .await?;
        assert_eq!(status, StatusCode::OK, "register failed: {body}");

        let token = body["token"].as_str().expect("token").to_string();
        let public_id = body["user"]["id"].as_str().expect("user id");
        let user_id: i64 = sqlx::query_scalar("SELECT id FROM users WHERE public_id = ?")
            .bind(public_id)
            .fetch_one(self.pool())
            .await?;

        Ok((token, user_id))
    }

    async fn add_weight_entry(
        &self,
        token: &str,
        weight_kg: f64,
        entry_date: DateTime<Utc>,
    ) -> TestResult<Value> {
        let (status, body) = request(
            self.router(),
            Method::POST,
            "/api/weight",
            Some(token),
            Some(json!({
                "weight_kg": weight_kg,
                "entry_date": entry_date.to_rfc3339(),
            })),
        )
        .await?;
        assert_eq!(status, StatusCode::OK, "add entry failed: {body}");
        Ok(body["entry"].clone())
    }

    #[allow(clippy::too_many_arguments)]
    async fn insert_shipment(
        &self,
        user_id: i64,
        tracking: &str,
        status: &str,
        shipped_offset_days: Option<i64>,
        expected_offset_days: i64,
        actual_offset_days: Option<i64>,
    ) -> TestResult<()> {
        let now = Utc::now();
        let shipped = shipped_offset_days.map(|d| (now + Duration::days(d)).to_rfc3339());
        let actual = actual_offset_days.map(|d| (now + Duration::days(d)).to_rfc3339());

        sqlx::query(
            r#"
            INSERT INTO shipments (
                public_id, user_id, tracking_number, status,
                medication_name, medication_kind, dosage, quantity, unit,
                street, city, state, zip_code, country,
                order_date, shipped_date, expected_delivery_date, actual_delivery_date,
                carrier, is_emergency, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, 'Ozempic', 'semaglutide', '0.5mg', 1, 'pens',
                    '1 Main St', 'Springfield', 'IL', '62701', 'United States',
                    ?, ?, ?, ?, 'FedEx', false, ?, ?)
            "#,
        )
        .bind(cuid2::create_id())
        .bind(user_id)
        .bind(tracking)
        .bind(status)
        .bind(now.to_rfc3339())
        .bind(&shipped)
        .bind((now + Duration::days(expected_offset_days)).to_rfc3339())
        .bind(&actual)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(self.pool())
        .await?;

        Ok(())
    }
}

fn register_payload(email: &str) -> Value {
    json!({
        "email": email,
        "password": "hunter22",
        "first_name": "Jane",
        "last_name": "Doe",
        "phone": "555-0100",
        "date_of_birth": "1990-06-15",
        "gender": "female",
        "height_cm": 170.0,
        "target_weight_kg": 70.0,
    })
}

async fn request(
    router: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> TestResult<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))?,
        None => builder.body(Body::empty())?,
    };

    let response = router.oneshot(request).await.expect("request should run");
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };

    Ok((status, value))
}

#[tokio::test]
async fn health_endpoint_reports_ok() -> TestResult {
    let ctx = TestContext::new().await?;

    let (status, body) = request(ctx.router(), Method::GET, "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    Ok(())
}

#[tokio::test]
async fn register_login_and_profile_flow() -> TestResult {
    let ctx = TestContext::new().await?;

    let (token, _) = ctx.register_user("jane@example.com").await?;

    let (status, body) =
        request(ctx.router(), Method::GET, "/api/auth/profile", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "jane@example.com");
    assert_eq!(body["user"]["full_name"], "Jane Doe");
    assert_eq!(body["user"]["height_cm"], 170.0);

    // Logging in again issues a fresh, working session.
    let (status, body) = request(
        ctx.router(),
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "jane@example.com", "password": "hunter22"})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());

    // Re-registering the same email fails.
    let (status, _) = request(
        ctx.router(),
        Method::POST,
        "/api/auth/register",
        None,
        Some(register_payload("jane@example.com")),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Wrong password is unauthorized.
    let (status, _) = request(
        ctx.router(),
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "jane@example.com", "password": "wrong"})),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn register_rejects_implausible_profile() -> TestResult {
    let ctx = TestContext::new().await?;

    let mut payload = register_payload("shorty@example.com");
    payload["height_cm"] = json!(50.0);

    let (status, _) = request(
        ctx.router(),
        Method::POST,
        "/api/auth/register",
        None,
        Some(payload),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut payload = register_payload("heavy@example.com");
    payload["target_weight_kg"] = json!(600.0);

    let (status, _) = request(
        ctx.router(),
        Method::POST,
        "/api/auth/register",
        None,
        Some(payload),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn protected_routes_require_bearer() -> TestResult {
    let ctx = TestContext::new().await?;

    for uri in [
        "/api/auth/profile",
        "/api/weight",
        "/api/medications",
        "/api/shipments",
        "/api/dashboard/overview",
    ] {
        let (status, _) = request(ctx.router(), Method::GET, uri, None, None).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "expected 401 for {uri}");
    }

    Ok(())
}

#[tokio::test]
async fn weight_entry_lifecycle() -> TestResult {
    let ctx = TestContext::new().await?;
    let (token, _) = ctx.register_user("jane@example.com").await?;

    let entry = ctx.add_weight_entry(&token, 82.5, Utc::now()).await?;
    // 82.5 kg at 170 cm -> 28.546... -> 28.5
    assert_eq!(entry["bmi"], 28.5);
    let entry_id = entry["public_id"].as_str().expect("entry id").to_string();

    let (status, body) =
        request(ctx.router(), Method::GET, "/api/weight", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["entries"][0]["weight_kg"], 82.5);

    // Updating the weight recomputes the cached BMI.
    let (status, body) = request(
        ctx.router(),
        Method::PUT,
        &format!("/api/weight/{entry_id}"),
        Some(&token),
        Some(json!({"weight_kg": 80.0})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entry"]["weight_kg"], 80.0);
    assert_eq!(body["entry"]["bmi"], 27.7);

    let (status, _) = request(
        ctx.router(),
        Method::DELETE,
        &format!("/api/weight/{entry_id}"),
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = request(ctx.router(), Method::GET, "/api/weight", Some(&token), None).await?;
    assert_eq!(body["total"], 0);

    // Gone means gone.
    let (status, _) = request(
        ctx.router(),
        Method::PUT,
        &format!("/api/weight/{entry_id}"),
        Some(&token),
        Some(json!({"weight_kg": 80.0})),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn weight_bounds_are_enforced() -> TestResult {
    let ctx = TestContext::new().await?;
    let (token, _) = ctx.register_user("jane@example.com").await?;

    for weight in [20.0, 350.0] {
        let (status, _) = request(
            ctx.router(),
            Method::POST,
            "/api/weight",
            Some(&token),
            Some(json!({"weight_kg": weight})),
        )
        .await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "weight {weight} accepted");
    }

    Ok(())
}

#[tokio::test]
async fn weight_entries_are_scoped_to_their_owner() -> TestResult {
    let ctx = TestContext::new().await?;
    let (token_a, _) = ctx.register_user("a@example.com").await?;
    let (token_b, _) = ctx.register_user("b@example.com").await?;

    let entry = ctx.add_weight_entry(&token_a, 90.0, Utc::now()).await?;
    let entry_id = entry["public_id"].as_str().expect("entry id");

    let (status, _) = request(
        ctx.router(),
        Method::DELETE,
        &format!("/api/weight/{entry_id}"),
        Some(&token_b),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = request(ctx.router(), Method::GET, "/api/weight", Some(&token_a), None).await?;
    assert_eq!(body["total"], 1);

    Ok(())
}

#[tokio::test]
async fn progress_reports_window_statistics() -> TestResult {
    let ctx = TestContext::new().await?;
    let (token, _) = ctx.register_user("jane@example.com").await?;

    let now = Utc::now();
    ctx.add_weight_entry(&token, 80.0, now - Duration::days(20))
        .await?;
    ctx.add_weight_entry(&token, 78.0, now - Duration::days(10))
        .await?;
    ctx.add_weight_entry(&token, 76.0, now).await?;

    let (status, body) = request(
        ctx.router(),
        Method::GET,
        "/api/weight/progress?period=1month",
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["period"], "1month");
    assert_eq!(body["target_weight_kg"], 70.0);

    let stats = &body["stats"];
    assert_eq!(stats["start_weight"], 80.0);
    assert_eq!(stats["current_weight"], 76.0);
    assert_eq!(stats["lowest_weight"], 76.0);
    assert_eq!(stats["highest_weight"], 80.0);
    assert_eq!(stats["total_weight_loss"], 4.0);
    assert_eq!(stats["average_weight"], 78.0);
    assert_eq!(stats["total_entries"], 3);

    // Chart data is oldest-first and carries per-entry BMI.
    let chart = body["chart_data"].as_array().expect("chart data");
    assert_eq!(chart.len(), 3);
    assert_eq!(chart[0]["weight"], 80.0);
    assert_eq!(chart[2]["weight"], 76.0);
    assert!(chart[0]["bmi"].as_f64().is_some());

    Ok(())
}

#[tokio::test]
async fn empty_progress_window_has_null_stats() -> TestResult {
    let ctx = TestContext::new().await?;
    let (token, _) = ctx.register_user("jane@example.com").await?;

    let (status, body) = request(
        ctx.router(),
        Method::GET,
        "/api/weight/progress",
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["period"], "3months");
    assert!(body["stats"].is_null());
    assert_eq!(body["chart_data"].as_array().expect("chart").len(), 0);

    Ok(())
}

#[tokio::test]
async fn cached_bmi_survives_height_change() -> TestResult {
    let ctx = TestContext::new().await?;
    let (token, _) = ctx.register_user("jane@example.com").await?;

    let entry = ctx.add_weight_entry(&token, 82.5, Utc::now()).await?;
    assert_eq!(entry["bmi"], 28.5);

    let (status, _) = request(
        ctx.router(),
        Method::PUT,
        "/api/auth/profile",
        Some(&token),
        Some(json!({"height_cm": 180.0})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    // The stored BMI still reflects the height at entry time.
    let (_, body) = request(ctx.router(), Method::GET, "/api/weight", Some(&token), None).await?;
    assert_eq!(body["entries"][0]["bmi"], 28.5);

    // The dashboard's current BMI is recomputed from today's height.
    let (_, body) = request(
        ctx.router(),
        Method::GET,
        "/api/dashboard/overview",
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(body["current_bmi"], 25.5);

    Ok(())
}

#[tokio::test]
async fn dashboard_overview_aggregates_everything() -> TestResult {
    let ctx = TestContext::new().await?;
    let (token, user_id) = ctx.register_user("jane@example.com").await?;

    let now = Utc::now();
    ctx.add_weight_entry(&token, 80.0, now - Duration::days(20))
        .await?;
    ctx.add_weight_entry(&token, 76.0, now).await?;

    ctx.insert_shipment(user_id, "TRK-PENDING", "pending", None, 2, None)
        .await?;
    ctx.insert_shipment(user_id, "TRK-TRANSIT", "in_transit", Some(-1), 5, None)
        .await?;
    ctx.insert_shipment(user_id, "TRK-DONE", "delivered", Some(-7), -3, Some(-3))
        .await?;
    ctx.insert_shipment(user_id, "TRK-CANCEL", "cancelled", None, 9, None)
        .await?;

    let (status, body) = request(
        ctx.router(),
        Method::GET,
        "/api/dashboard/overview",
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["user"]["full_name"], "Jane Doe");
    assert_eq!(body["user"]["days_since_start"], 0);
    assert_eq!(body["current_weight"], 76.0);

    let progress = &body["weight_progress"];
    assert_eq!(progress["start_weight"], 80.0);
    assert_eq!(progress["current_weight"], 76.0);
    assert_eq!(progress["weight_lost"], 4.0);
    assert_eq!(progress["progress_percentage"], 40);
    assert_eq!(progress["remaining_weight"], 6.0);

    let upcoming = body["upcoming_shipments"].as_array().expect("upcoming");
    assert_eq!(upcoming.len(), 2);
    // Soonest expected delivery first; cancelled shipments never appear.
    assert_eq!(upcoming[0]["tracking_number"], "TRK-PENDING");
    assert_eq!(upcoming[0]["days_until_delivery"], 2);
    assert_eq!(upcoming[1]["tracking_number"], "TRK-TRANSIT");

    let recent = body["recent_shipments"].as_array().expect("recent");
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0]["tracking_number"], "TRK-DONE");

    assert_eq!(body["stats"]["total_weight_entries"], 2);
    assert_eq!(body["stats"]["recent_entries_count"], 2);
    assert_eq!(body["stats"]["total_shipments"], 4);
    assert_eq!(body["stats"]["pending_shipments"], 2);

    Ok(())
}

#[tokio::test]
async fn dashboard_with_no_data_is_empty_not_an_error() -> TestResult {
    let ctx = TestContext::new().await?;
    let (token, _) = ctx.register_user("jane@example.com").await?;

    let (status, body) = request(
        ctx.router(),
        Method::GET,
        "/api/dashboard/overview",
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["current_weight"].is_null());
    assert!(body["current_bmi"].is_null());
    assert!(body["weight_progress"].is_null());
    assert_eq!(body["upcoming_shipments"].as_array().expect("upcoming").len(), 0);
    assert_eq!(body["stats"]["total_weight_entries"], 0);

    Ok(())
}

#[tokio::test]
async fn dashboard_reads_are_idempotent() -> TestResult {
    let ctx = TestContext::new().await?;
    let (token, user_id) = ctx.register_user("jane@example.com").await?;

    ctx.add_weight_entry(&token, 80.0, Utc::now() - Duration::days(5))
        .await?;
    ctx.insert_shipment(user_id, "TRK-1", "pending", None, 4, None)
        .await?;

    let (_, first) = request(
        ctx.router(),
        Method::GET,
        "/api/dashboard/overview",
        Some(&token),
        None,
    )
    .await?;
    let (_, second) = request(
        ctx.router(),
        Method::GET,
        "/api/dashboard/overview",
        Some(&token),
        None,
    )
    .await?;

    assert_eq!(first, second);

    Ok(())
}

#[tokio::test]
async fn medications_crud_and_status_filter() -> TestResult {
    let ctx = TestContext::new().await?;
    let (token, _) = ctx.register_user("jane@example.com").await?;

    let (status, body) = request(
        ctx.router(),
        Method::POST,
        "/api/medications",
        Some(&token),
        Some(json!({
            "name": "Ozempic",
            "kind": "semaglutide",
            "dosage": "0.5mg",
            "frequency": "weekly",
            "remaining_days": 28,
            "side_effects": ["nausea"],
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "create medication failed: {body}");
    let medication_id = body["medication"]["public_id"]
        .as_str()
        .expect("medication id")
        .to_string();
    assert_eq!(body["medication"]["status"], "active");
    assert_eq!(body["medication"]["remaining_days"], 28);
    assert_eq!(body["medication"]["side_effects"][0], "nausea");

    // Unknown kind is rejected.
    let (status, _) = request(
        ctx.router(),
        Method::POST,
        "/api/medications",
        Some(&token),
        Some(json!({
            "name": "Aspirin",
            "kind": "nsaid",
            "dosage": "100mg",
            "frequency": "daily",
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Discontinue it; the remaining-days counter is stored verbatim.
    let (status, body) = request(
        ctx.router(),
        Method::PUT,
        &format!("/api/medications/{medication_id}"),
        Some(&token),
        Some(json!({"status": "discontinued", "remaining_days": 0})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["medication"]["status"], "discontinued");
    assert_eq!(body["medication"]["remaining_days"], 0);
    assert_eq!(body["medication"]["name"], "Ozempic");

    let (_, body) = request(
        ctx.router(),
        Method::GET,
        "/api/medications?status=active",
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(body["total"], 0);

    let (_, body) = request(
        ctx.router(),
        Method::GET,
        "/api/medications?status=discontinued",
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(body["total"], 1);

    let (status, _) = request(
        ctx.router(),
        Method::DELETE,
        &format!("/api/medications/{medication_id}"),
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = request(
        ctx.router(),
        Method::GET,
        "/api/medications",
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(body["total"], 0);

    Ok(())
}

#[tokio::test]
async fn shipments_list_with_derived_fields() -> TestResult {
    let ctx = TestContext::new().await?;
    let (token, user_id) = ctx.register_user("jane@example.com").await?;

    ctx.insert_shipment(user_id, "TRK-OUT", "shipped", Some(-2), 3, None)
        .await?;
    ctx.insert_shipment(user_id, "TRK-DONE", "delivered", Some(-9), -5, Some(-5))
        .await?;

    let (status, body) =
        request(ctx.router(), Method::GET, "/api/shipments", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);

    let shipments = body["shipments"].as_array().expect("shipments");
    let outbound = shipments
        .iter()
        .find(|s| s["tracking_number"] == "TRK-OUT")
        .expect("outbound shipment");
    assert_eq!(outbound["status"], "shipped");
    assert_eq!(outbound["days_until_delivery"], 3);
    assert!(outbound["shipment_duration"].is_null());

    let delivered = shipments
        .iter()
        .find(|s| s["tracking_number"] == "TRK-DONE")
        .expect("delivered shipment");
    // Delivered shipments never carry a countdown, whatever the dates say.
    assert!(delivered["days_until_delivery"].is_null());
    assert_eq!(delivered["shipment_duration"], 4);

    // Status filtering.
    let (_, body) = request(
        ctx.router(),
        Method::GET,
        "/api/shipments?status=delivered",
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(body["total"], 1);

    Ok(())
}

#[tokio::test]
async fn patients_crud_with_validation() -> TestResult {
    let ctx = TestContext::new().await?;

    let (status, body) = request(
        ctx.router(),
        Method::POST,
        "/api/patients",
        None,
        Some(json!({
            "name": "John Doe",
            "age": 45,
            "email": "john.doe@example.com",
            "phone": "555-0123",
            "condition": "Hypertension",
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "create patient failed: {body}");
    let patient_id = body["patient"]["public_id"]
        .as_str()
        .expect("patient id")
        .to_string();
    assert_eq!(body["patient"]["status"], "active");
    assert_eq!(body["patient"]["medication_kind"], "semaglutide");

    // Duplicate email is a 400, not a 500.
    let (status, body) = request(
        ctx.router(),
        Method::POST,
        "/api/patients",
        None,
        Some(json!({
            "name": "John Clone",
            "age": 46,
            "email": "john.doe@example.com",
            "phone": "555-0124",
            "condition": "Diabetes",
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("already exists"));

    // Invalid payloads are rejected up front.
    let (status, _) = request(
        ctx.router(),
        Method::POST,
        "/api/patients",
        None,
        Some(json!({
            "name": "X",
            "age": 200,
            "email": "bad",
            "phone": "call me",
            "condition": "?",
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = request(
        ctx.router(),
        Method::GET,
        &format!("/api/patients/{patient_id}"),
        None,
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["patient"]["name"], "John Doe");

    let (status, body) = request(
        ctx.router(),
        Method::PUT,
        &format!("/api/patients/{patient_id}"),
        None,
        Some(json!({
            "name": "John Doe",
            "age": 46,
            "email": "john.doe@example.com",
            "phone": "555-0123",
            "condition": "Hypertension",
            "status": "inactive",
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["patient"]["age"], 46);
    assert_eq!(body["patient"]["status"], "inactive");

    let (status, _) = request(
        ctx.router(),
        Method::DELETE,
        &format!("/api/patients/{patient_id}"),
        None,
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(
        ctx.router(),
        Method::GET,
        &format!("/api/patients/{patient_id}"),
        None,
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn patients_search_and_pagination() -> TestResult {
    let ctx = TestContext::new().await?;

    for (name, condition) in [
        ("Alice Smith", "Hypertension"),
        ("Bob Johnson", "Diabetes"),
        ("Alice Cooper", "Diabetes"),
    ] {
        let email = format!(
            "{}@example.com",
            name.to_lowercase().replace(' ', ".")
        );
        let (status, _) = request(
            ctx.router(),
            Method::POST,
            "/api/patients",
            None,
            Some(json!({
                "name": name,
                "age": 40,
                "email": email,
                "phone": "555-0000",
                "condition": condition,
            })),
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = request(
        ctx.router(),
        Method::GET,
        "/api/patients?search=Alice",
        None,
        None,
    )
    .await?;
    assert_eq!(body["total_count"], 2);

    let (_, body) = request(
        ctx.router(),
        Method::GET,
        "/api/patients?condition=Diabetes",
        None,
        None,
    )
    .await?;
    assert_eq!(body["total_count"], 2);

    let (_, body) = request(
        ctx.router(),
        Method::GET,
        "/api/patients?page=1&limit=2",
        None,
        None,
    )
    .await?;
    assert_eq!(body["patients"].as_array().expect("patients").len(), 2);
    assert_eq!(body["total_count"], 3);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["has_next_page"], true);
    assert_eq!(body["has_prev_page"], false);

    Ok(())
}
