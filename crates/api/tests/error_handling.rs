//! Integration tests for the centralized error responder: envelope shape,
//! status mapping, and authentication middleware rejections.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_test_user, get, get_auth, token_for, ROLE_ID_PARTICIPANT};
use sqlx::PgPool;

/// Missing Authorization header yields 401 with the failure envelope.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_missing_auth_header(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/notifications").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert!(json["error"].is_string());
}

/// A malformed bearer token yields 401.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_garbage_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/notifications", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

/// Unknown resource ids yield 404 with the NOT_FOUND code.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_not_found_mapping(pool: PgPool) {
    let (user, _) = create_test_user(&pool, "seeker", ROLE_ID_PARTICIPANT).await;
    let token = token_for(user.id, "participant");

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/teams/999999", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "NOT_FOUND");
    assert!(json["error"].as_str().unwrap().contains("Team"));
}

/// Role-gated routes reject the wrong role with 403 and FORBIDDEN.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_forbidden_mapping(pool: PgPool) {
    let (user, _) = create_test_user(&pool, "wannabe", ROLE_ID_PARTICIPANT).await;
    let token = token_for(user.id, "participant");

    let app = common::build_test_app(pool);
    let response = common::post_json_auth(
        app,
        "/api/v1/hackathons",
        &token,
        serde_json::json!({ "name": "Nope" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let json = body_json(response).await;
    assert_eq!(json["code"], "FORBIDDEN");
}

/// The health endpoint responds at root level without authentication.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_health_check(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
    assert!(json["version"].is_string());
}
