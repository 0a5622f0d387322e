//! HTTP-level integration tests for submissions, evaluations, and the
//! aggregate score.
//!
//! The aggregate is the mean of the five per-criterion means across judges,
//! verified here against the worked example: J1(8,7,9,6,8) and J2(6,9,7,8,7)
//! yield per-criterion means (7, 8, 8, 7, 7.5) and an aggregate of 7.5.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{
    body_json, create_test_user, get_auth, post_json_auth, put_json_auth, token_for,
    ROLE_ID_ADMIN, ROLE_ID_JUDGE, ROLE_ID_PARTICIPANT,
};
use sqlx::PgPool;

use hackforge_db::models::hackathon::CreateHackathon;
use hackforge_db::models::project::CreateProject;
use hackforge_db::repositories::{HackathonRepo, ProjectRepo, SubmissionRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Seed a hackathon + project in `submitted` status and its submission.
/// Returns `(project_id, submission_id, owner_token)`.
async fn seed_submission(pool: &PgPool, owner_name: &str) -> (i64, i64, String) {
    let (admin, _) = create_test_user(pool, &format!("{owner_name}-admin"), ROLE_ID_ADMIN).await;
    let now = Utc::now();
    let hackathon = HackathonRepo::create(
        pool,
        admin.id,
        &CreateHackathon {
            name: format!("{owner_name}-hack"),
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

    let (owner, _) = create_test_user(pool, owner_name, ROLE_ID_PARTICIPANT).await;
    let project = ProjectRepo::create(
        pool,
        owner.id,
        &CreateProject {
            hackathon_id: hackathon.id,
            title: format!("{owner_name}-project"),
            description: None,
            repo_url: None,
            demo_url: None,
        },
    )
    .await
    .unwrap();

    // Walk the project into submitted status.
    ProjectRepo::set_status(pool, project.id, "in_progress").await.unwrap();
    ProjectRepo::set_status(pool, project.id, "submitted").await.unwrap();

    let token = token_for(owner.id, "participant");
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/submissions",
        &token,
        serde_json::json!({
            "project_id": project.id,
            "content": "Our project writeup",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let submission_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    (project.id, submission_id, token)
}

/// Record one judge's evaluation through the API.
async fn evaluate(
    pool: &PgPool,
    submission_id: i64,
    judge_token: &str,
    scores: [i16; 5],
) -> axum::http::Response<axum::body::Body> {
    let app = common::build_test_app(pool.clone());
    post_json_auth(
        app,
        &format!("/api/v1/submissions/{submission_id}/evaluations"),
        judge_token,
        serde_json::json!({
            "innovation": scores[0],
            "technical_execution": scores[1],
            "design": scores[2],
            "impact": scores[3],
            "presentation": scores[4],
        }),
    )
    .await
}

// ---------------------------------------------------------------------------
// Submission CRUD
// ---------------------------------------------------------------------------

/// A second submission for the same project is a 409.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_one_submission_per_project(pool: PgPool) {
    let (project_id, _submission_id, token) = seed_submission(&pool, "unique").await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/submissions",
        &token,
        serde_json::json!({ "project_id": project_id, "content": "second try" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// Only project members can create a submission for a project.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_submission_requires_membership(pool: PgPool) {
    let (project_id, _submission_id, _token) = seed_submission(&pool, "guarded").await;
    let (outsider, _) = create_test_user(&pool, "sneaky", ROLE_ID_PARTICIPANT).await;

    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        &format!("/api/v1/submissions?project_id={project_id}"),
        &token_for(outsider.id, "participant"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Updating a submission appends the previous content to the version
/// history before overwriting.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_appends_version(pool: PgPool) {
    let (_project_id, submission_id, token) = seed_submission(&pool, "editor").await;

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/submissions/{submission_id}"),
        &token,
        serde_json::json!({ "content": "Revised writeup" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["content"], "Revised writeup");

    let versions = SubmissionRepo::versions(&pool, submission_id).await.unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].content, "Our project writeup");

    // A second edit appends another version; the trail is append-only.
    let app = common::build_test_app(pool.clone());
    put_json_auth(
        app,
        &format!("/api/v1/submissions/{submission_id}"),
        &token,
        serde_json::json!({ "content": "Third draft" }),
    )
    .await;
    let versions = SubmissionRepo::versions(&pool, submission_id).await.unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[1].content, "Revised writeup");
}

// ---------------------------------------------------------------------------
// Evaluations and the aggregate
// ---------------------------------------------------------------------------

/// The worked example from the scoring rules: two judges, aggregate 7.5.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_aggregate_is_mean_of_criterion_means(pool: PgPool) {
    let (_project_id, submission_id, _token) = seed_submission(&pool, "scored").await;
    let (judge1, _) = create_test_user(&pool, "judge-one", ROLE_ID_JUDGE).await;
    let (judge2, _) = create_test_user(&pool, "judge-two", ROLE_ID_JUDGE).await;

    let response = evaluate(&pool, submission_id, &token_for(judge1.id, "judge"), [8, 7, 9, 6, 8]).await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    // Single judge: aggregate is that judge's own mean, (8+7+9+6+8)/5 = 7.6.
    assert_eq!(data["average_score"], 7.6);

    let response = evaluate(&pool, submission_id, &token_for(judge2.id, "judge"), [6, 9, 7, 8, 7]).await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["average_score"], 7.5);
}

/// A judge re-submitting replaces their vector instead of adding a second one.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_judge_resubmission_replaces_scores(pool: PgPool) {
    let (_project_id, submission_id, _token) = seed_submission(&pool, "rescored").await;
    let (judge, _) = create_test_user(&pool, "judge-redo", ROLE_ID_JUDGE).await;
    let judge_token = token_for(judge.id, "judge");

    evaluate(&pool, submission_id, &judge_token, [2, 2, 2, 2, 2]).await;
    let response = evaluate(&pool, submission_id, &judge_token, [10, 10, 10, 10, 10]).await;
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["average_score"], 10.0);

    let evaluations = SubmissionRepo::evaluations(&pool, submission_id).await.unwrap();
    assert_eq!(evaluations.len(), 1, "re-submission must not add a second row");
}

/// The first evaluation moves the project from submitted to under_review;
/// later ones leave it alone.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_first_evaluation_moves_project_under_review(pool: PgPool) {
    let (project_id, submission_id, _token) = seed_submission(&pool, "reviewed").await;
    let (judge, _) = create_test_user(&pool, "judge-flip", ROLE_ID_JUDGE).await;

    let project = ProjectRepo::find_by_id(&pool, project_id).await.unwrap().unwrap();
    assert_eq!(project.status, "submitted");

    evaluate(&pool, submission_id, &token_for(judge.id, "judge"), [5, 5, 5, 5, 5]).await;

    let project = ProjectRepo::find_by_id(&pool, project_id).await.unwrap().unwrap();
    assert_eq!(project.status, "under_review");
}

/// Participants cannot evaluate; out-of-range scores are rejected.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_evaluation_guards(pool: PgPool) {
    let (_project_id, submission_id, owner_token) = seed_submission(&pool, "strict").await;

    // The project owner is a participant, not a judge.
    let response = evaluate(&pool, submission_id, &owner_token, [5, 5, 5, 5, 5]).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // A judge with an 11 in one criterion is rejected.
    let (judge, _) = create_test_user(&pool, "judge-strict", ROLE_ID_JUDGE).await;
    let response = evaluate(&pool, submission_id, &token_for(judge.id, "judge"), [11, 5, 5, 5, 5]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Nothing was recorded.
    let evaluations = SubmissionRepo::evaluations(&pool, submission_id).await.unwrap();
    assert!(evaluations.is_empty());
}
