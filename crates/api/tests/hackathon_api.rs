//! HTTP-level integration tests for hackathons: phase derivation,
//! registration windows, capacity, and visibility.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{
    body_json, create_test_user, get_auth, post_json_auth, token_for, ROLE_ID_ADMIN,
    ROLE_ID_PARTICIPANT,
};
use sqlx::PgPool;

use hackforge_db::models::hackathon::CreateHackathon;
use hackforge_db::repositories::HackathonRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn windows_body(name: &str, reg_offset_hours: i64) -> serde_json::Value {
    let now = Utc::now();
    serde_json::json!({
        "name": name,
        "registration_starts_at": now + Duration::hours(reg_offset_hours),
        "registration_ends_at": now + Duration::hours(reg_offset_hours + 2),
        "starts_at": now + Duration::hours(reg_offset_hours + 3),
        "ends_at": now + Duration::hours(reg_offset_hours + 5),
        "judging_ends_at": now + Duration::hours(reg_offset_hours + 6),
    })
}

/// Seed a hackathon with an open registration window and a capacity limit.
async fn seed_open_hackathon(pool: &PgPool, admin_name: &str, capacity: i64) -> i64 {
    let (admin, _) = create_test_user(pool, admin_name, ROLE_ID_ADMIN).await;
    let now = Utc::now();
    HackathonRepo::create(
        pool,
        admin.id,
        &CreateHackathon {
            name: format!("{admin_name}-hack"),
            description: None,
            registration_starts_at: now - Duration::hours(1),
            registration_ends_at: now + Duration::hours(1),
            starts_at: now + Duration::hours(2),
            ends_at: now + Duration::hours(3),
            judging_ends_at: now + Duration::hours(4),
            is_public: Some(true),
            max_participants: Some(capacity),
        },
    )
    .await
    .unwrap()
    .id
}

// ---------------------------------------------------------------------------
// CRUD and phase
// ---------------------------------------------------------------------------

/// Creating a hackathon is admin-only and returns the derived phase.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_requires_admin(pool: PgPool) {
    let (admin, _) = create_test_user(&pool, "boss", ROLE_ID_ADMIN).await;
    let (pleb, _) = create_test_user(&pool, "pleb", ROLE_ID_PARTICIPANT).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/hackathons",
        &token_for(pleb.id, "participant"),
        windows_body("Nope", 1),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/hackathons",
        &token_for(admin.id, "admin"),
        windows_body("Future Hack", 1),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let data = body_json(response).await["data"].clone();
    // Registration opens an hour from now: the phase reads as upcoming.
    assert_eq!(data["phase"], "upcoming");
    assert_eq!(data["registration_open"], false);
}

/// Misordered windows are rejected with 400.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_misordered_windows_rejected(pool: PgPool) {
    let (admin, _) = create_test_user(&pool, "sloppy", ROLE_ID_ADMIN).await;
    let now = Utc::now();

    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "name": "Backwards",
        "registration_starts_at": now + Duration::hours(5),
        "registration_ends_at": now + Duration::hours(1),
        "starts_at": now + Duration::hours(2),
        "ends_at": now + Duration::hours(3),
        "judging_ends_at": now + Duration::hours(4),
    });
    let response = post_json_auth(app, "/api/v1/hackathons", &token_for(admin.id, "admin"), body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Reading a hackathon whose window state drifted refreshes the persisted
/// snapshot, but the derived phase is authoritative either way.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_phase_snapshot_refreshes_on_read(pool: PgPool) {
    let id = seed_open_hackathon(&pool, "drift", 10).await;

    // The stored snapshot still says upcoming (the insert default).
    let stored = HackathonRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(stored.status, "upcoming");

    let (reader, _) = create_test_user(&pool, "reader", ROLE_ID_PARTICIPANT).await;
    let app = common::build_test_app(pool.clone());
    let response = get_auth(
        app,
        &format!("/api/v1/hackathons/{id}"),
        &token_for(reader.id, "participant"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["phase"], "registration_open");
    assert_eq!(data["registration_open"], true);

    // The read opportunistically persisted the snapshot.
    let stored = HackathonRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(stored.status, "registration_open");
}

/// Private hackathons are hidden from non-admin callers.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_private_hackathons_hidden(pool: PgPool) {
    let (admin, _) = create_test_user(&pool, "secretive", ROLE_ID_ADMIN).await;
    let now = Utc::now();
    let hackathon = HackathonRepo::create(
        &pool,
        admin.id,
        &CreateHackathon {
            name: "Invite Only".into(),
            description: None,
            registration_starts_at: now,
            registration_ends_at: now + Duration::hours(1),
            starts_at: now + Duration::hours(2),
            ends_at: now + Duration::hours(3),
            judging_ends_at: now + Duration::hours(4),
            is_public: Some(false),
            max_participants: None,
        },
    )
    .await
    .unwrap();

    let (pleb, _) = create_test_user(&pool, "curious", ROLE_ID_PARTICIPANT).await;
    let app = common::build_test_app(pool.clone());
    let response = get_auth(
        app,
        &format!("/api/v1/hackathons/{}", hackathon.id),
        &token_for(pleb.id, "participant"),
    )
    .await;
    // Hidden, not forbidden.
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/hackathons", &token_for(pleb.id, "participant")).await;
    let data = body_json(response).await["data"].clone();
    assert!(data.as_array().unwrap().iter().all(|h| h["id"] != hackathon.id));
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Registration succeeds inside the window, duplicates are 409.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_registration_and_duplicates(pool: PgPool) {
    let id = seed_open_hackathon(&pool, "reg", 10).await;
    let (user, _) = create_test_user(&pool, "joiner", ROLE_ID_PARTICIPANT).await;
    let token = token_for(user.id, "participant");

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/hackathons/{id}/register"),
        &token,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/hackathons/{id}/register"),
        &token,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/v1/hackathons/{id}/participants"), &token).await;
    let data = body_json(response).await["data"].clone();
    assert_eq!(data.as_array().unwrap().len(), 1);
    assert_eq!(data[0]["username"], "joiner");
}

/// Registration outside the window is a 400.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_registration_closed_window(pool: PgPool) {
    let (admin, _) = create_test_user(&pool, "early", ROLE_ID_ADMIN).await;
    let now = Utc::now();
    let hackathon = HackathonRepo::create(
        &pool,
        admin.id,
        &CreateHackathon {
            name: "Not Yet".into(),
            description: None,
            registration_starts_at: now + Duration::hours(1),
            registration_ends_at: now + Duration::hours(2),
            starts_at: now + Duration::hours(3),
            ends_at: now + Duration::hours(4),
            judging_ends_at: now + Duration::hours(5),
            is_public: Some(true),
            max_participants: None,
        },
    )
    .await
    .unwrap();

    let (user, _) = create_test_user(&pool, "keen", ROLE_ID_PARTICIPANT).await;
    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("/api/v1/hackathons/{}/register", hackathon.id),
        &token_for(user.id, "participant"),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// The capacity guard rejects registrations once the limit is reached.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_registration_capacity(pool: PgPool) {
    let id = seed_open_hackathon(&pool, "tiny", 1).await;
    let (first, _) = create_test_user(&pool, "first", ROLE_ID_PARTICIPANT).await;
    let (second, _) = create_test_user(&pool, "second", ROLE_ID_PARTICIPANT).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/hackathons/{id}/register"),
        &token_for(first.id, "participant"),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        &format!("/api/v1/hackathons/{id}/register"),
        &token_for(second.id, "participant"),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Hackathon is at capacity");
}
