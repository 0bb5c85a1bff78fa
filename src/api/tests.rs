use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::web::Data;
use actix_web::App;
use chrono::Local;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::api::attendance::AttendanceListResponse;
use crate::api::leave_balance::LeaveBalanceResponse;
use crate::config::Config;
use crate::leave::accrual::{BalanceSnapshot, accrued_months};
use crate::model::attendance::{AttendanceRow, LeaveStatus};
use crate::model::leave_balance::QuotaDefaults;
use crate::routes;
use crate::store::{AttendanceStore, MemoryStore};

const SECRET: &str = "test-secret";

fn test_config() -> Config {
    Config {
        server_addr: "127.0.0.1:0".into(),
        database_url: None,
        jwt_secret: SECRET.into(),
        jwt_audience: "authenticated".into(),
        rate_protected_per_min: 1000,
        api_prefix: "/api".into(),
        log_dir: "logs".into(),
        log_level: "info".into(),
        storage_public_url: Some("https://files.example".into()),
        quota_defaults: QuotaDefaults::default(),
    }
}

fn token_for(user: Uuid) -> String {
    let exp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
        + 3600;

    encode(
        &Header::default(),
        &json!({
            "sub": user.to_string(),
            "aud": "authenticated",
            "email": "someone@example.com",
            "exp": exp
        }),
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

fn authed(req: TestRequest, user: Uuid) -> TestRequest {
    req.insert_header(("Authorization", format!("Bearer {}", token_for(user))))
        .peer_addr("127.0.0.1:40000".parse().unwrap())
}

macro_rules! app {
    ($store:expr) => {{
        let store: Arc<dyn AttendanceStore> = $store;
        let limiter = routes::limiter_config(1000).unwrap();
        test::init_service(
            App::new()
                .app_data(Data::from(store))
                .app_data(Data::new(test_config()))
                .configure(move |cfg| routes::configure(cfg, "/api", &limiter)),
        )
        .await
    }};
}

#[actix_web::test]
async fn health_is_public() {
    let app = app!(Arc::new(MemoryStore::new()));
    let resp = test::call_service(&app, TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn api_requires_a_valid_bearer_token() {
    let app = app!(Arc::new(MemoryStore::new()));

    let req = TestRequest::get()
        .uri("/api/attendance")
        .peer_addr("127.0.0.1:40000".parse().unwrap())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = TestRequest::get()
        .uri("/api/attendance")
        .insert_header(("Authorization", "Bearer not-a-jwt"))
        .peer_addr("127.0.0.1:40000".parse().unwrap())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Verifier errors stay in the log
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Invalid or expired token" }));
    assert!(body.get("details").is_none());
}

#[actix_web::test]
async fn logs_a_range_and_lists_it_by_year() {
    let app = app!(Arc::new(MemoryStore::new()));
    let user = Uuid::new_v4();

    let req = authed(
        TestRequest::post().uri("/api/attendance").set_json(json!({
            "from": "2025-03-10",
            "to": "2025-03-12",
            "status": "Casual",
            "is_weekend_work": true,
            "leave_form_url": "abc/1741600000000_form.png"
        })),
        user,
    ).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["logged"], 3);

    let req = authed(TestRequest::get().uri("/api/attendance?year=2025"), user).to_request();
    let list: AttendanceListResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list.total, 3);
    assert_eq!(list.status, "all");
    assert_eq!(list.available_years, vec![2025]);
    assert_eq!(list.data[0].date.to_string(), "2025-03-12");
    assert!(list.data.iter().all(|r| r.status == LeaveStatus::Casual && !r.is_weekend_work));
    assert_eq!(
        list.data[0].leave_form_link.as_deref(),
        Some("https://files.example/storage/v1/object/public/leave-forms/abc/1741600000000_form.png")
    );

    let req = authed(TestRequest::get().uri("/api/attendance?year=2024"), user).to_request();
    let list: AttendanceListResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list.total, 0);

    let req = authed(TestRequest::get().uri("/api/attendance?year=2025&status=Medical"), user).to_request();
    let list: AttendanceListResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list.total, 0);

    let other = Uuid::new_v4();
    let req = authed(TestRequest::get().uri("/api/attendance?year=2025"), other).to_request();
    let list: AttendanceListResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list.total, 0);
}

#[actix_web::test]
async fn rejects_bad_ranges_and_leave_types() {
    let app = app!(Arc::new(MemoryStore::new()));
    let user = Uuid::new_v4();

    let req = authed(
        TestRequest::post().uri("/api/attendance").set_json(json!({
            "from": "2025-03-10",
            "to": "2025-03-01",
            "status": "Casual"
        })),
        user,
    ).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = authed(
        TestRequest::post().uri("/api/attendance").set_json(json!({
            "from": "2025-03-10",
            "status": "Sick"
        })),
        user,
    ).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = authed(TestRequest::get().uri("/api/attendance?status=Vacation"), user).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn edits_and_deletes_own_records() {
    let app = app!(Arc::new(MemoryStore::new()));
    let user = Uuid::new_v4();

    let req = authed(
        TestRequest::post().uri("/api/attendance").set_json(json!({
            "from": "2025-06-07",
            "status": "Casual"
        })),
        user,
    ).to_request();
    test::call_service(&app, req).await;

    let req = authed(TestRequest::get().uri("/api/attendance?year=2025"), user).to_request();
    let list: AttendanceListResponse = test::call_and_read_body_json(&app, req).await;
    let id = list.data[0].id;

    let req = authed(
        TestRequest::put()
            .uri(&format!("/api/attendance/{id}"))
            .set_json(json!({ "status": "Compensatory", "is_weekend_work": true })),
        user,
    ).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = authed(TestRequest::get().uri("/api/attendance?year=2025&status=Compensatory"), user).to_request();
    let list: AttendanceListResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list.total, 1);
    assert!(list.data[0].is_weekend_work);

    // Someone else cannot touch it
    let intruder = Uuid::new_v4();
    let req = authed(TestRequest::delete().uri(&format!("/api/attendance/{id}")), intruder).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = authed(TestRequest::delete().uri(&format!("/api/attendance/{id}")), user).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = authed(TestRequest::delete().uri(&format!("/api/attendance/{id}")), user).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = authed(
        TestRequest::put()
            .uri(&format!("/api/attendance/{id}"))
            .set_json(json!({ "status": "Casual" })),
        user,
    ).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn settings_fall_back_to_defaults_until_saved() {
    let app = app!(Arc::new(MemoryStore::new()));
    let user = Uuid::new_v4();

    let req = authed(TestRequest::get().uri("/api/leave-balance"), user).to_request();
    let settings: LeaveBalanceResponse = test::call_and_read_body_json(&app, req).await;
    assert!(settings.is_default);
    assert_eq!((settings.casual_total, settings.medical_total), (8, 8));
    assert_eq!((settings.annual_total, settings.annual_carry_forward), (12, 0));

    let req = authed(
        TestRequest::put().uri("/api/leave-balance").set_json(json!({
            "casual_total": "10",
            "medical_total": 14,
            "annual_total": 12,
            "annual_carry_forward": 2
        })),
        user,
    ).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = authed(TestRequest::get().uri("/api/leave-balance"), user).to_request();
    let settings: LeaveBalanceResponse = test::call_and_read_body_json(&app, req).await;
    assert!(!settings.is_default);
    assert_eq!(settings.casual_total, 10);
    assert_eq!(settings.medical_total, 14);
    assert_eq!(settings.annual_carry_forward, 2);

    let req = authed(
        TestRequest::put()
            .uri("/api/leave-balance")
            .set_json(json!({ "casual_total": "lots" })),
        user,
    ).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("casual_total"));
}

#[actix_web::test]
async fn partial_settings_save_keeps_stored_totals() {
    let app = app!(Arc::new(MemoryStore::new()));
    let user = Uuid::new_v4();

    let req = authed(
        TestRequest::put().uri("/api/leave-balance").set_json(json!({
            "casual_total": 10,
            "medical_total": 14,
            "annual_total": 12,
            "annual_carry_forward": 2
        })),
        user,
    ).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = authed(
        TestRequest::put()
            .uri("/api/leave-balance")
            .set_json(json!({ "annual_carry_forward": 3, "medical_total": "" })),
        user,
    ).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = authed(TestRequest::get().uri("/api/leave-balance"), user).to_request();
    let settings: LeaveBalanceResponse = test::call_and_read_body_json(&app, req).await;
    assert!(!settings.is_default);
    assert_eq!(settings.casual_total, 10);
    assert_eq!(settings.medical_total, 14);
    assert_eq!(settings.annual_total, 12);
    assert_eq!(settings.annual_carry_forward, 3);
}

#[actix_web::test]
async fn summary_combines_records_and_settings() {
    let app = app!(Arc::new(MemoryStore::new()));
    let user = Uuid::new_v4();

    let logs = [
        json!({ "from": "2025-03-10", "status": "Casual" }),
        json!({ "from": "2025-06-01", "status": "Casual" }),
        json!({ "from": "2025-02-03", "status": "Annual" }),
        json!({ "from": "2023-11-04", "status": "Compensatory", "is_weekend_work": true }),
        json!({ "from": "2025-05-03", "status": "Compensatory", "is_weekend_work": true }),
        json!({ "from": "2025-05-06", "status": "Compensatory" }),
    ];
    for log in logs {
        let req = authed(TestRequest::post().uri("/api/attendance").set_json(log), user).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    let req = authed(
        TestRequest::put()
            .uri("/api/leave-balance")
            .set_json(json!({ "annual_carry_forward": 2 })),
        user,
    ).to_request();
    test::call_service(&app, req).await;

    let req = authed(TestRequest::get().uri("/api/leave-balance/summary?year=2025"), user).to_request();
    let snapshot: BalanceSnapshot = test::call_and_read_body_json(&app, req).await;

    let accrued = accrued_months(2025, Local::now().date_naive());
    assert_eq!(snapshot.target_year, 2025);
    assert_eq!(snapshot.casual_remaining, 6);
    assert_eq!(snapshot.medical_remaining, 8);
    assert_eq!(snapshot.annual.accrued_to_date, accrued);
    assert_eq!(snapshot.annual.carry_forward, 2);
    assert_eq!(snapshot.annual.total_available, accrued + 2);
    assert_eq!(snapshot.annual.remaining, accrued + 1);
    assert_eq!(snapshot.compensatory.balance, 1);

    let req = authed(TestRequest::get().uri("/api/leave-balance/summary?year=2023"), user).to_request();
    let older: BalanceSnapshot = test::call_and_read_body_json(&app, req).await;
    assert_eq!(older.casual_remaining, 8);
    assert_eq!(older.compensatory, snapshot.compensatory);
}

#[actix_web::test]
async fn summary_fails_on_a_corrupt_stored_record() {
    let user = Uuid::new_v4();
    let store = MemoryStore::with_rows([AttendanceRow {
        id: 12,
        user_id: user.to_string(),
        date: "2025-04-01".into(),
        status: "Sick".into(),
        is_weekend_work: false,
        leave_form_url: None,
    }]);
    let app = app!(Arc::new(store));

    let req = authed(TestRequest::get().uri("/api/leave-balance/summary?year=2025"), user).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["error"],
        "invalid attendance record 12: unknown status `Sick`"
    );
}
