//! HTTP-level integration tests for user profiles, soft delete, and the
//! dashboard aggregate.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{
    body_json, create_test_user, delete_auth, get_auth, put_json_auth, token_for,
    ROLE_ID_ADMIN, ROLE_ID_PARTICIPANT,
};
use sqlx::PgPool;

use hackforge_db::models::hackathon::CreateHackathon;
use hackforge_db::models::team::CreateTeam;
use hackforge_db::repositories::{HackathonRepo, TeamRepo, UserRepo};

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// /users/me returns the caller's own profile with the role resolved.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_me_returns_own_profile(pool: PgPool) {
    let (user, _) = create_test_user(&pool, "selfie", ROLE_ID_PARTICIPANT).await;
    let token = token_for(user.id, "participant");

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/users/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["id"], user.id);
    assert_eq!(data["username"], "selfie");
    assert_eq!(data["role"], "participant");
    // The password hash never leaves the server.
    assert!(data.get("password_hash").is_none());
}

/// Profile updates persist name, bio, and the skill list.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_own_profile(pool: PgPool) {
    let (user, _) = create_test_user(&pool, "tinkerer", ROLE_ID_PARTICIPANT).await;
    let token = token_for(user.id, "participant");

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        "/api/v1/users/me",
        &token,
        serde_json::json!({
            "full_name": "Tina Tinkerer",
            "bio": "I build things",
            "skills": ["rust", "postgres", "websockets"],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["full_name"], "Tina Tinkerer");
    assert_eq!(data["skills"].as_array().unwrap().len(), 3);

    // Non-array skills are rejected.
    let app = common::build_test_app(pool);
    let response = put_json_auth(
        app,
        "/api/v1/users/me",
        &token,
        serde_json::json!({ "skills": "rust" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Role changes are admin-only.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_role_update(pool: PgPool) {
    let (admin, _) = create_test_user(&pool, "root", ROLE_ID_ADMIN).await;
    let (user, _) = create_test_user(&pool, "mortal", ROLE_ID_PARTICIPANT).await;

    // A participant cannot change roles.
    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/users/{}", user.id),
        &token_for(user.id, "participant"),
        serde_json::json!({ "role_id": 3 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // An admin can.
    let app = common::build_test_app(pool);
    let response = put_json_auth(
        app,
        &format!("/api/v1/users/{}", user.id),
        &token_for(admin.id, "admin"),
        serde_json::json!({ "role_id": 3 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["role"], "judge");
}

// ---------------------------------------------------------------------------
// Soft delete
// ---------------------------------------------------------------------------

/// Users may delete themselves; strangers may not delete each other.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_soft_delete_authorization(pool: PgPool) {
    let (victim, _) = create_test_user(&pool, "victim", ROLE_ID_PARTICIPANT).await;
    let (stranger, _) = create_test_user(&pool, "rando", ROLE_ID_PARTICIPANT).await;

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(
        app,
        &format!("/api/v1/users/{}", victim.id),
        &token_for(stranger.id, "participant"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(
        app,
        &format!("/api/v1/users/{}", victim.id),
        &token_for(victim.id, "participant"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The row survives, deactivated, with the email renamed.
    let row = UserRepo::find_by_id(&pool, victim.id).await.unwrap().unwrap();
    assert!(!row.is_active);
    assert!(row.email.starts_with("deleted_"));

    // Deleting twice is a 404: the account is already inactive.
    let (admin, _) = create_test_user(&pool, "sweeper", ROLE_ID_ADMIN).await;
    let app = common::build_test_app(pool);
    let response = delete_auth(
        app,
        &format!("/api/v1/users/{}", victim.id),
        &token_for(admin.id, "admin"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// The dashboard aggregates the caller's teams, invitations, and upcoming
/// hackathons in one read.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_dashboard_aggregate(pool: PgPool) {
    let (admin, _) = create_test_user(&pool, "dash-admin", ROLE_ID_ADMIN).await;
    let now = Utc::now();
    let hackathon = HackathonRepo::create(
        &pool,
        admin.id,
        &CreateHackathon {
            name: "Dash Hack".into(),
            description: None,
            registration_starts_at: now - Duration::hours(1),
            registration_ends_at: now + Duration::hours(1),
            starts_at: now + Duration::hours(2),
            ends_at: now + Duration::hours(3),
            judging_ends_at: now + Duration::hours(4),
            is_public: Some(true),
            max_participants: None,
        },
    )
    .await
    .unwrap();

    let (leader, _) = create_test_user(&pool, "dash-leader", ROLE_ID_PARTICIPANT).await;
    let (invitee, _) = create_test_user(&pool, "dash-invitee", ROLE_ID_PARTICIPANT).await;

    let team = TeamRepo::create(
        &pool,
        leader.id,
        &CreateTeam {
            hackathon_id: hackathon.id,
            name: "Dash Team".into(),
            description: None,
            max_members: Some(5),
        },
    )
    .await
    .unwrap();
    TeamRepo::insert_pending_member(&pool, team.id, invitee.id)
        .await
        .unwrap();

    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        "/api/v1/dashboard",
        &token_for(invitee.id, "participant"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    assert!(data["teams"].as_array().unwrap().is_empty());
    assert_eq!(data["pending_invitations"].as_array().unwrap().len(), 1);
    assert_eq!(data["pending_invitations"][0]["id"], team.id);
    assert!(data["projects"].as_array().unwrap().is_empty());
    assert_eq!(data["unread_notifications"], 0);
    assert_eq!(data["upcoming_hackathons"].as_array().unwrap().len(), 1);
    assert_eq!(data["upcoming_hackathons"][0]["phase"], "registration_open");
}
