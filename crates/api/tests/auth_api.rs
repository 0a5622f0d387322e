//! HTTP-level integration tests for the auth endpoints.
//!
//! Tests cover registration, duplicate-email rejection, login, token
//! refresh with rotation, logout, and the soft-delete authentication block.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_test_user, post_json, post_json_auth, ROLE_ID_PARTICIPANT};
use sqlx::PgPool;

use hackforge_db::repositories::UserRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn register_body(username: &str) -> serde_json::Value {
    serde_json::json!({
        "username": username,
        "email": format!("{username}@test.com"),
        "password": "a-strong-enough-password",
        "skills": ["rust", "sql"],
    })
}

/// Log in a user via the API and return the data envelope containing
/// `access_token`, `refresh_token`, and `user` info.
async fn login_user(app: axum::Router, email: &str, password: &str) -> serde_json::Value {
    let body = serde_json::json!({ "email": email, "password": password });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"].clone()
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Successful registration returns 201 with tokens and the participant role.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_success(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(app, "/api/v1/auth/register", register_body("newuser")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    let data = &json["data"];
    assert!(data["access_token"].is_string());
    assert!(data["refresh_token"].is_string());
    assert_eq!(data["user"]["username"], "newuser");
    assert_eq!(data["user"]["role"], "participant");
}

/// Registering twice with the same email fails the second time with 409.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_duplicate_email_fails(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/auth/register", register_body("dupuser")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/auth/register", register_body("dupuser")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "User already exists");
}

/// Registration rejects malformed emails and short passwords with 400.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_validation(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "username": "badmail",
        "email": "not-an-email",
        "password": "a-strong-enough-password",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "username": "shortpw",
        "email": "shortpw@test.com",
        "password": "short",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// Successful login returns tokens and user info.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_success(pool: PgPool) {
    let (user, password) = create_test_user(&pool, "loginuser", ROLE_ID_PARTICIPANT).await;
    let app = common::build_test_app(pool);

    let data = login_user(app, "loginuser@test.com", &password).await;

    assert!(data["access_token"].is_string());
    assert!(data["refresh_token"].is_string());
    assert!(data["expires_in"].is_number());
    assert_eq!(data["user"]["id"], user.id);
    assert_eq!(data["user"]["email"], "loginuser@test.com");
    assert_eq!(data["user"]["role"], "participant");
}

/// Login with an incorrect password returns 401.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_wrong_password(pool: PgPool) {
    let (_user, _password) = create_test_user(&pool, "wrongpw", ROLE_ID_PARTICIPANT).await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "email": "wrongpw@test.com", "password": "incorrect" });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Login with an unknown email returns 401.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_nonexistent_user(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "email": "ghost@test.com", "password": "whatever" });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// A soft-deleted account can no longer authenticate, even with correct
/// credentials: the rename frees the email, so the lookup itself misses.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_soft_deleted_user_cannot_login(pool: PgPool) {
    let (user, password) = create_test_user(&pool, "ghosted", ROLE_ID_PARTICIPANT).await;
    let deleted = UserRepo::soft_delete(&pool, user.id)
        .await
        .expect("soft delete should succeed");
    assert!(deleted);

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "email": "ghosted@test.com", "password": password });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The row survives with a renamed email and the active flag off.
    let row = UserRepo::find_by_id(&pool, user.id)
        .await
        .expect("lookup should succeed")
        .expect("row must still exist");
    assert!(!row.is_active);
    assert_eq!(row.email, format!("deleted_{}_ghosted@test.com", user.id));
}

// ---------------------------------------------------------------------------
// Refresh + logout
// ---------------------------------------------------------------------------

/// A valid refresh token returns new tokens, and the old one stops working.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_token_refresh_rotates(pool: PgPool) {
    let (_user, password) = create_test_user(&pool, "refresher", ROLE_ID_PARTICIPANT).await;

    let app = common::build_test_app(pool.clone());
    let login = login_user(app, "refresher@test.com", &password).await;
    let refresh_token = login["refresh_token"].as_str().unwrap();

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "refresh_token": refresh_token });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let new_refresh = json["data"]["refresh_token"].as_str().unwrap();
    assert_ne!(new_refresh, refresh_token, "refresh token must rotate on use");

    // The rotated-out token is revoked.
    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "refresh_token": refresh_token });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Refreshing with a garbage token returns 401.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_refresh_with_invalid_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "refresh_token": "not-a-real-token" });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Logout revokes the refresh session and returns 204.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_logout_revokes_sessions(pool: PgPool) {
    let (_user, password) = create_test_user(&pool, "leaver", ROLE_ID_PARTICIPANT).await;

    let app = common::build_test_app(pool.clone());
    let login = login_user(app, "leaver@test.com", &password).await;
    let access_token = login["access_token"].as_str().unwrap();
    let refresh_token = login["refresh_token"].as_str().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/auth/logout",
        access_token,
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The refresh token from before the logout is dead.
    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "refresh_token": refresh_token });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
