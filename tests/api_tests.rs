use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use sqlx::types::Json;
use tower::ServiceExt;
use uuid::Uuid;

use campervan_booking::availability::OccupancyPolicy;
use campervan_booking::build_app;
use campervan_booking::config::environment::EnvironmentConfig;
use campervan_booking::models::reservation::{Addons, Reservation, ReservationStatus};
use campervan_booking::repositories::{MemoryReservationRepository, MemoryUserRepository};
use campervan_booking::services::{NotificationService, PasswordService, RecordingMailer};
use campervan_booking::state::AppState;

const ADMIN_EMAIL: &str = "admin@campingtour.example";
const SIGNATURE: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

struct TestApp {
    router: Router,
    mailer: Arc<RecordingMailer>,
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn seeded(start: &str, end: &str, status: ReservationStatus) -> Reservation {
    Reservation {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        start_date: day(start),
        end_date: day(end),
        status,
        total_price: Decimal::from(3700),
        addons: Json(Addons::default()),
        authorization_ref: None,
        authorization_signed_at: None,
        created_at: Utc::now(),
    }
}

async fn create_test_app() -> TestApp {
    create_test_app_with(Vec::new()).await
}

async fn create_test_app_with(existing: Vec<Reservation>) -> TestApp {
    let config = EnvironmentConfig {
        admin_email: ADMIN_EMAIL.to_string(),
        ..EnvironmentConfig::default()
    };
    let policy = OccupancyPolicy::new(config.count_cancelled_reservations);

    let users = Arc::new(MemoryUserRepository::new());
    let reservations = Arc::new(MemoryReservationRepository::with_reservations(
        users.clone(),
        policy,
        existing,
    ));

    let mailer = Arc::new(RecordingMailer::new());
    let (notifications, _worker) = NotificationService::start(mailer.clone(), config.operator_email.clone());

    let state = AppState::new(config, users, reservations, notifications)
        .with_password_service(PasswordService::with_cost(4));

    TestApp {
        router: build_app(state),
        mailer,
    }
}

impl TestApp {
    async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    /// Registrar una cuenta y devolver su token
    async fn sign_up(&self, email: &str) -> String {
        let (status, _) = self
            .post(
                "/api/auth/register",
                None,
                json!({ "email": email, "password": "secret123", "name": "Lin", "phone": "0912345678" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = self
            .post("/api/auth/login", None, json!({ "email": email, "password": "secret123" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    async fn book(&self, token: &str, start: &str, end: &str) -> (StatusCode, Value) {
        self.post(
            "/api/inquiry",
            Some(token),
            json!({ "startDate": start, "endDate": end, "addons": { "mattress": true } }),
        )
        .await
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app().await;
    let (status, body) = app.get("/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["fleet_capacity"], 3);
}

#[tokio::test]
async fn test_register_and_login() {
    let app = create_test_app().await;
    let token = app.sign_up("lin@example.com").await;
    assert!(!token.is_empty());

    // Email duplicado
    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "email": "LIN@example.com", "password": "secret123", "name": "Lin", "phone": "0912345678" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (status, _) = app
        .post("/api/auth/login", None, json!({ "email": "lin@example.com", "password": "wrong-pass" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_registration_is_rejected() {
    let app = create_test_app().await;
    let (status, body) = app
        .post(
            "/api/auth/register",
            None,
            json!({ "email": "not-an-email", "password": "123", "name": "", "phone": "call me" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_update_profile() {
    let app = create_test_app().await;
    let token = app.sign_up("chen@example.com").await;

    let (status, body) = app
        .put(
            "/api/auth/profile",
            Some(&token),
            json!({ "name": "Chen", "phone": "+886 912-345-678", "address": "Taipei" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Chen");
    assert_eq!(body["data"]["address"], "Taipei");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = create_test_app().await;

    let (status, _) = app.get("/api/inquiry/my-orders", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/api/inquiry/my-orders", Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_no_reservations_means_no_blocked_dates() {
    let app = create_test_app().await;
    let (status, body) = app.get("/api/inquiry/blocked-dates", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_saturated_day_rejects_overlapping_booking() {
    let app = create_test_app_with(vec![
        seeded("2026-06-05", "2026-06-10", ReservationStatus::Confirmed),
        seeded("2026-06-08", "2026-06-10", ReservationStatus::Confirmed),
        seeded("2026-06-10", "2026-06-10", ReservationStatus::Confirmed),
    ])
    .await;
    let token = app.sign_up("guest@example.com").await;

    let (status, body) = app.get("/api/inquiry/blocked-dates", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["2026-06-10"]));

    let (status, body) = app.book(&token, "2026-06-09", "2026-06-11").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "CAPACITY_OVERLAP");
    assert_eq!(body["details"]["blocked_dates"], json!(["2026-06-10"]));

    let (status, body) = app.book(&token, "2026-06-11", "2026-06-13").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["rental_days"], 2);
    // 2 noches × 3700 + colchón
    assert_eq!(body["data"]["total_price"], "7900");
}

#[tokio::test]
async fn test_zero_length_booking_is_degenerate() {
    let app = create_test_app().await;
    let token = app.sign_up("guest@example.com").await;

    let (status, body) = app.book(&token, "2026-06-11", "2026-06-11").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "DEGENERATE_RANGE");

    let (status, body) = app.book(&token, "2026-06-12", "2026-06-11").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "DEGENERATE_RANGE");
}

#[tokio::test]
async fn test_overlong_rental_is_rejected_before_locking_days() {
    let app = create_test_app().await;
    let token = app.sign_up("guest@example.com").await;

    let (status, body) = app.book(&token, "2026-01-01", "3025-12-31").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "RANGE_TOO_LONG");
    assert_eq!(body["details"]["max_rental_days"], 30);

    let (_, orders) = app.get("/api/inquiry/my-orders", Some(&token)).await;
    assert_eq!(orders, json!([]));

    // Exactamente el máximo sigue siendo válido
    let (status, body) = app.book(&token, "2026-06-01", "2026-07-01").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["rental_days"], 30);
}

#[tokio::test]
async fn test_malformed_body_returns_api_error_shape() {
    let app = create_test_app().await;
    let token = app.sign_up("guest@example.com").await;

    let (status, body) = app
        .post(
            "/api/inquiry",
            Some(&token),
            json!({ "start_date": "11/06/2026", "end_date": "2026-06-12" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"], "Validation Error");

    let (status, body) = app
        .post("/api/auth/login", None, json!({ "email": "guest@example.com" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_fleet_fills_up_and_blocked_dates_are_sorted() {
    let app = create_test_app().await;
    let token = app.sign_up("guest@example.com").await;

    assert_eq!(app.book(&token, "2026-07-03", "2026-07-04").await.0, StatusCode::OK);
    assert_eq!(app.book(&token, "2026-07-01", "2026-07-03").await.0, StatusCode::OK);
    assert_eq!(app.book(&token, "2026-07-02", "2026-07-04").await.0, StatusCode::OK);
    assert_eq!(app.book(&token, "2026-07-01", "2026-07-02").await.0, StatusCode::OK);

    // La cuarta reserva lleva 07-02 a 3; 07-03 ya tenía tres
    let (_, body) = app.get("/api/inquiry/blocked-dates", None).await;
    assert_eq!(body, json!(["2026-07-02", "2026-07-03"]));

    let (status, body) = app.book(&token, "2026-07-01", "2026-07-05").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["blocked_dates"], json!(["2026-07-02", "2026-07-03"]));

    let (status, body) = app.get("/api/inquiry/my-orders", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_my_orders_only_lists_own_reservations() {
    let app = create_test_app().await;
    let alice = app.sign_up("alice@example.com").await;
    let bob = app.sign_up("bob@example.com").await;

    assert_eq!(app.book(&alice, "2026-08-01", "2026-08-03").await.0, StatusCode::OK);

    let (_, alice_orders) = app.get("/api/inquiry/my-orders", Some(&alice)).await;
    let (_, bob_orders) = app.get("/api/inquiry/my-orders", Some(&bob)).await;
    assert_eq!(alice_orders.as_array().unwrap().len(), 1);
    assert_eq!(bob_orders, json!([]));
}

#[tokio::test]
async fn test_new_inquiry_notifies_operator() {
    let app = create_test_app().await;
    let token = app.sign_up("guest@example.com").await;
    assert_eq!(app.book(&token, "2026-08-01", "2026-08-03").await.0, StatusCode::OK);

    for _ in 0..50 {
        if !app.mailer.sent().is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "operator@campingtour.example");
    assert!(sent[0].subject.contains("New inquiry"));
}

#[tokio::test]
async fn test_admin_routes_reject_regular_users() {
    let app = create_test_app().await;
    let token = app.sign_up("guest@example.com").await;

    let (status, body) = app.get("/api/admin/orders", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _) = app.get("/api/admin/orders", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_lists_orders_with_contact() {
    let app = create_test_app().await;
    let guest = app.sign_up("guest@example.com").await;
    let admin = app.sign_up(ADMIN_EMAIL).await;
    assert_eq!(app.book(&guest, "2026-08-01", "2026-08-03").await.0, StatusCode::OK);

    let (status, body) = app.get("/api/admin/orders", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    let orders = body.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["user_email"], "guest@example.com");
    assert_eq!(orders[0]["user_phone"], "0912345678");
    assert_eq!(orders[0]["start_date"], "2026-08-01");
}

#[tokio::test]
async fn test_cancelling_frees_capacity_and_reactivation_is_guarded() {
    let app = create_test_app().await;
    let guest = app.sign_up("guest@example.com").await;
    let admin = app.sign_up(ADMIN_EMAIL).await;

    let mut ids = Vec::new();
    for _ in 0..3 {
        let (status, body) = app.book(&guest, "2026-09-01", "2026-09-02").await;
        assert_eq!(status, StatusCode::OK);
        ids.push(body["data"]["id"].as_str().unwrap().to_string());
    }
    assert_eq!(app.book(&guest, "2026-09-02", "2026-09-04").await.0, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .put(
            &format!("/api/admin/orders/{}/status", ids[0]),
            Some(&admin),
            json!({ "status": "cancelled" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "cancelled");

    let (_, blocked) = app.get("/api/inquiry/blocked-dates", None).await;
    assert_eq!(blocked, json!([]));

    // El cupo liberado se vuelve a ocupar
    assert_eq!(app.book(&guest, "2026-09-02", "2026-09-04").await.0, StatusCode::OK);

    let (status, body) = app
        .put(
            &format!("/api/admin/orders/{}/status", ids[0]),
            Some(&admin),
            json!({ "status": "confirmed" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "CAPACITY_OVERLAP");
    assert_eq!(body["details"]["blocked_dates"], json!(["2026-09-02"]));
}

#[tokio::test]
async fn test_unknown_status_is_bad_request() {
    let app = create_test_app().await;
    let guest = app.sign_up("guest@example.com").await;
    let admin = app.sign_up(ADMIN_EMAIL).await;
    let (_, body) = app.book(&guest, "2026-09-01", "2026-09-02").await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .put(&format!("/api/admin/orders/{}/status", id), Some(&admin), json!({ "status": "archived" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .put(
            &format!("/api/admin/orders/{}/status", Uuid::new_v4()),
            Some(&admin),
            json!({ "status": "confirmed" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_signing_authorization_records_reference_and_mails_pdf() {
    let app = create_test_app().await;
    let guest = app.sign_up("guest@example.com").await;
    let (_, body) = app.book(&guest, "2026-10-01", "2026-10-03").await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .post(
            "/api/pdf/generate",
            Some(&guest),
            json!({
                "reservationId": id,
                "guest_name": "Lin Mei",
                "card_number": "4111111111111234",
                "amount": "7900",
                "signature": SIGNATURE,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["reservation_id"], id.as_str());
    assert!(body["data"]["authorization_ref"].as_str().unwrap().starts_with("auth-"));

    let (_, orders) = app.get("/api/inquiry/my-orders", Some(&guest)).await;
    assert_eq!(orders[0]["authorization_ref"], body["data"]["authorization_ref"]);

    for _ in 0..50 {
        if app.mailer.sent().iter().any(|m| m.attachment.is_some()) {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    let sent = app.mailer.sent();
    let mail = sent.iter().find(|m| m.attachment.is_some()).unwrap();
    let attachment = mail.attachment.as_ref().unwrap();
    assert_eq!(attachment.filename, "Auth_Form.pdf");
    assert!(attachment.bytes.starts_with(b"%PDF"));
    assert!(!mail.html_body.contains("4111111111111234"));
}

#[tokio::test]
async fn test_authorization_rejects_invalid_card_and_foreign_reservation() {
    let app = create_test_app().await;
    let alice = app.sign_up("alice@example.com").await;
    let bob = app.sign_up("bob@example.com").await;
    let (_, body) = app.book(&alice, "2026-10-01", "2026-10-03").await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .post(
            "/api/pdf/generate",
            Some(&alice),
            json!({ "reservationId": id, "guest_name": "Alice", "card_number": "1234", "amount": "7900" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = app
        .post(
            "/api/pdf/generate",
            Some(&bob),
            json!({ "reservationId": id, "guest_name": "Bob", "card_number": "4111111111111234", "amount": "7900" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
