use actix_web::test::TestRequest;
use actix_web::{test, web, App};
use serde_json::json;
use sqlx::Row;

use stayhub_backend::error::ApiError;
use stayhub_backend::{api, bookings, AppState};

mod support;

#[actix_web::test]
async fn create_booking_rejects_invalid_dates() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let owner = support::create_user(pool, "owner", Some("owner@upi")).await;
    let tenant = support::create_user(pool, "tenant", None).await;
    let property = support::create_property(pool, owner, 10_000).await;

    let backwards = bookings::create_booking(
        pool,
        tenant,
        property,
        support::future_date(5),
        support::future_date(3),
    )
    .await;
    assert!(matches!(backwards, Err(ApiError::Validation(_))));

    let in_the_past = bookings::create_booking(
        pool,
        tenant,
        property,
        support::future_date(-2),
        support::future_date(3),
    )
    .await;
    assert!(matches!(in_the_past, Err(ApiError::Validation(_))));

    let missing_property = bookings::create_booking(
        pool,
        tenant,
        property + 1000,
        support::future_date(1),
        support::future_date(3),
    )
    .await;
    assert!(matches!(missing_property, Err(ApiError::PropertyNotFound)));
}

#[actix_web::test]
async fn overlapping_booking_is_rejected_and_adjacent_is_not() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let owner = support::create_user(pool, "owner", Some("owner@upi")).await;
    let tenant_a = support::create_user(pool, "tenant_a", None).await;
    let tenant_b = support::create_user(pool, "tenant_b", None).await;
    let property = support::create_property(pool, owner, 10_000).await;

    bookings::create_booking(
        pool,
        tenant_a,
        property,
        support::future_date(10),
        support::future_date(12),
    )
    .await
    .expect("first booking");

    // Scenario B: [10,12) vs [11,13) overlaps.
    let conflict = bookings::create_booking(
        pool,
        tenant_b,
        property,
        support::future_date(11),
        support::future_date(13),
    )
    .await;
    assert!(matches!(conflict, Err(ApiError::BookingConflict)));

    // Same-day turnover: [12,14) touches [10,12) only at the boundary.
    bookings::create_booking(
        pool,
        tenant_b,
        property,
        support::future_date(12),
        support::future_date(14),
    )
    .await
    .expect("adjacent booking allowed under half-open semantics");
}

#[actix_web::test]
async fn update_excludes_own_booking_from_the_overlap_check() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let owner = support::create_user(pool, "owner", None).await;
    let tenant = support::create_user(pool, "tenant", None).await;
    let stranger = support::create_user(pool, "stranger", None).await;
    let property = support::create_property(pool, owner, 10_000).await;

    let booking = bookings::create_booking(
        pool,
        tenant,
        property,
        support::future_date(10),
        support::future_date(12),
    )
    .await
    .expect("booking");

    // Shifting within its own window must not conflict with itself.
    let shifted = bookings::update_booking(
        pool,
        tenant,
        booking.id,
        Some(support::future_date(11)),
        Some(support::future_date(13)),
    )
    .await
    .expect("shift within own window");
    assert_eq!(shifted.check_in, support::future_date(11));

    // Someone else's booking still blocks.
    bookings::create_booking(
        pool,
        stranger,
        property,
        support::future_date(20),
        support::future_date(22),
    )
    .await
    .expect("second booking");

    let conflict = bookings::update_booking(
        pool,
        tenant,
        booking.id,
        Some(support::future_date(21)),
        Some(support::future_date(23)),
    )
    .await;
    assert!(matches!(conflict, Err(ApiError::BookingConflict)));

    // Not the caller's booking → not found, not forbidden.
    let not_owned = bookings::update_booking(
        pool,
        stranger,
        booking.id,
        Some(support::future_date(30)),
        Some(support::future_date(31)),
    )
    .await;
    assert!(matches!(not_owned, Err(ApiError::BookingNotFound)));
}

#[actix_web::test]
async fn cancelling_frees_the_window_and_is_terminal() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let owner = support::create_user(pool, "owner", None).await;
    let tenant = support::create_user(pool, "tenant", None).await;
    let property = support::create_property(pool, owner, 10_000).await;

    let booking = bookings::create_booking(
        pool,
        tenant,
        property,
        support::future_date(10),
        support::future_date(12),
    )
    .await
    .expect("booking");

    // The property owner may cancel too.
    bookings::cancel_booking(pool, owner, booking.id)
        .await
        .expect("owner cancels");

    // Window is free again.
    bookings::create_booking(
        pool,
        tenant,
        property,
        support::future_date(10),
        support::future_date(12),
    )
    .await
    .expect("rebook after cancellation");

    // CANCELLED is terminal.
    let again = bookings::cancel_booking(pool, tenant, booking.id).await;
    assert!(matches!(again, Err(ApiError::InvalidState(_))));

    // Uninvolved actors see nothing.
    let outsider = support::create_user(pool, "outsider", None).await;
    let hidden = bookings::cancel_booking(pool, outsider, booking.id).await;
    assert!(matches!(hidden, Err(ApiError::BookingNotFound)));
}

#[actix_web::test]
async fn booking_conflict_surfaces_over_http_with_machine_readable_code() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    std::env::set_var("JWT_SECRET", "test-secret");

    let owner = support::create_user(pool, "owner", Some("owner@upi")).await;
    let property = support::create_property(pool, owner, 10_000).await;

    let state = web::Data::new(AppState { pool: pool.clone() });
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .service(api::auth::register)
            .service(
                web::scope("/api")
                    .wrap(api::auth::JwtMiddleware)
                    .service(api::bookings::create_booking)
                    .service(api::bookings::booking_audit),
            ),
    )
    .await;

    let register_token = |email_label: &str| {
        TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({
                "email": format!("{email_label}_{}@stayhub.test", uuid::Uuid::new_v4()),
                "password": "secret-pw",
            }))
            .to_request()
    };
    let auth: serde_json::Value =
        test::call_and_read_body_json(&app, register_token("http_tenant")).await;
    let token = auth["token"].as_str().expect("token").to_string();

    let body = json!({
        "property_id": property,
        "check_in": support::future_date(10),
        "check_out": support::future_date(12),
    });

    let first = TestRequest::post()
        .uri("/api/bookings")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, first).await;
    assert!(resp.status().is_success());
    let created: serde_json::Value = test::read_body_json(resp).await;
    let booking_id = created["id"].as_i64().expect("booking id");

    let second = TestRequest::post()
        .uri("/api/bookings")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(&body)
        .to_request();
    let resp = test::call_service(&app, second).await;
    assert_eq!(resp.status().as_u16(), 409);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "BOOKING_CONFLICT");

    let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM bookings WHERE property_id = $1")
        .bind(property)
        .fetch_one(pool)
        .await
        .expect("count bookings")
        .get("n");
    assert_eq!(count, 1);

    // The audit trail is participants-only.
    let trail = TestRequest::get()
        .uri(&format!("/api/bookings/{booking_id}/audit"))
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, trail).await;
    assert!(resp.status().is_success());
    let entries: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(entries[0]["action"], "BOOKING_CREATED");

    let outsider: serde_json::Value =
        test::call_and_read_body_json(&app, register_token("http_outsider")).await;
    let outsider_token = outsider["token"].as_str().expect("token");
    let forbidden = TestRequest::get()
        .uri(&format!("/api/bookings/{booking_id}/audit"))
        .insert_header(("Authorization", format!("Bearer {outsider_token}")))
        .to_request();
    let resp = test::call_service(&app, forbidden).await;
    assert_eq!(resp.status().as_u16(), 403);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "FORBIDDEN");
}
