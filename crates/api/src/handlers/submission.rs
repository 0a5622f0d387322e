//! Handlers for the `/submissions` resource and judge evaluations.
//!
//! A project carries at most one submission (unique index). Judges attach
//! one five-criterion score vector each; the aggregate is recomputed as the
//! mean of the per-criterion means on every evaluation change, and the first
//! evaluation moves the owning project from `submitted` to `under_review`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use hackforge_core::error::CoreError;
use hackforge_core::notification::NotificationPayload;
use hackforge_core::roles::{ROLE_ADMIN, ROLE_JUDGE};
use hackforge_core::scoring::ScoreVector;
use hackforge_core::types::DbId;
use hackforge_db::models::submission::{
    CreateSubmission, Evaluation, Submission, SubmissionVersion, UpdateSubmission,
};
use hackforge_db::repositories::{ProjectRepo, SubmissionRepo};
use hackforge_events::PlatformEvent;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::project::require_member;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireJudge;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / request types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /submissions`.
#[derive(Debug, Deserialize)]
pub struct SubmissionListQuery {
    /// Look up the single submission belonging to this project.
    pub project_id: Option<DbId>,
}

/// Request body for `POST /submissions/{id}/evaluations`.
#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub innovation: i16,
    pub technical_execution: i16,
    pub design: i16,
    pub impact: i16,
    pub presentation: i16,
    pub comment: Option<String>,
}

impl EvaluateRequest {
    fn score_vector(&self) -> ScoreVector {
        ScoreVector {
            innovation: self.innovation,
            technical_execution: self.technical_execution,
            design: self.design,
            impact: self.impact,
            presentation: self.presentation,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/submissions
///
/// Create the project's submission. Project members only; a second
/// submission for the same project is a 409.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateSubmission>,
) -> AppResult<(StatusCode, Json<ApiResponse<Submission>>)> {
    ProjectRepo::find_by_id(&state.pool, input.project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: input.project_id,
        }))?;
    require_member(&state, input.project_id, auth.user_id).await?;

    if input.content.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Submission content must not be empty".into(),
        )));
    }

    // Friendly pre-check; uq_submissions_project_id backs it under races.
    if SubmissionRepo::find_by_project(&state.pool, input.project_id)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Project already has a submission".into(),
        )));
    }

    let submission = SubmissionRepo::create(&state.pool, &input).await?;
    tracing::info!(
        submission_id = submission.id,
        project_id = input.project_id,
        "Submission created"
    );
    Ok((StatusCode::CREATED, Json(ApiResponse::new(submission))))
}

/// GET /api/v1/submissions
///
/// With `?project_id=`, look up that project's submission (members and
/// judges). Without it, list all submissions ranked by aggregate score
/// (judges and admins only).
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<SubmissionListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Submission>>>> {
    match params.project_id {
        Some(project_id) => {
            require_member_or_judge(&state, &auth, project_id).await?;
            let submission = SubmissionRepo::find_by_project(&state.pool, project_id).await?;
            Ok(Json(ApiResponse::new(submission.into_iter().collect())))
        }
        None => {
            if auth.role != ROLE_JUDGE && auth.role != ROLE_ADMIN {
                return Err(AppError::Core(CoreError::Forbidden(
                    "Only judges can list all submissions".into(),
                )));
            }
            let submissions = SubmissionRepo::list(&state.pool).await?;
            Ok(Json(ApiResponse::new(submissions)))
        }
    }
}

/// GET /api/v1/submissions/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Submission>>> {
    let submission = find_submission(&state, id).await?;
    require_member_or_judge(&state, &auth, submission.project_id).await?;
    Ok(Json(ApiResponse::new(submission)))
}

/// PUT /api/v1/submissions/{id}
///
/// Overwrite the submission's content. The previous content is appended to
/// the version history first (append-only audit trail).
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSubmission>,
) -> AppResult<Json<ApiResponse<Submission>>> {
    let submission = find_submission(&state, id).await?;
    require_member(&state, submission.project_id, auth.user_id).await?;

    let submission = SubmissionRepo::update_with_version(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Submission",
            id,
        }))?;

    Ok(Json(ApiResponse::new(submission)))
}

/// GET /api/v1/submissions/{id}/versions
///
/// The append-only edit history, oldest first.
pub async fn versions(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Vec<SubmissionVersion>>>> {
    let submission = find_submission(&state, id).await?;
    require_member_or_judge(&state, &auth, submission.project_id).await?;

    let versions = SubmissionRepo::versions(&state.pool, id).await?;
    Ok(Json(ApiResponse::new(versions)))
}

/// POST /api/v1/submissions/{id}/evaluations
///
/// Record (or replace) the calling judge's score vector and recompute the
/// aggregate. The first evaluation moves the project under review.
pub async fn evaluate(
    RequireJudge(judge): RequireJudge,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<EvaluateRequest>,
) -> AppResult<Json<ApiResponse<Submission>>> {
    find_submission(&state, id).await?;

    let scores = input.score_vector();
    scores.validate().map_err(AppError::Core)?;

    let submission = SubmissionRepo::record_evaluation(
        &state.pool,
        id,
        judge.user_id,
        &scores,
        input.comment.as_deref(),
    )
    .await?;

    let evaluations = SubmissionRepo::evaluations(&state.pool, id).await?;
    let targets = ProjectRepo::member_user_ids(&state.pool, submission.project_id).await?;
    state.event_bus.publish(
        PlatformEvent::new("submission.evaluated")
            .with_source("submission", id)
            .with_actor(judge.user_id)
            .with_targets(targets)
            .with_notification(NotificationPayload::SubmissionEvaluated {
                submission_id: id,
                project_id: submission.project_id,
                judge_count: evaluations.len() as i64,
            }),
    );

    tracing::info!(
        submission_id = id,
        judge_id = judge.user_id,
        average = submission.average_score,
        "Evaluation recorded"
    );
    Ok(Json(ApiResponse::new(submission)))
}

/// GET /api/v1/submissions/{id}/evaluations
pub async fn evaluations(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Vec<Evaluation>>>> {
    let submission = find_submission(&state, id).await?;
    require_member_or_judge(&state, &auth, submission.project_id).await?;

    let evaluations = SubmissionRepo::evaluations(&state.pool, id).await?;
    Ok(Json(ApiResponse::new(evaluations)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_submission(state: &AppState, id: DbId) -> AppResult<Submission> {
    SubmissionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Submission",
            id,
        }))
}

/// Project members, judges, and admins may read submission data.
async fn require_member_or_judge(
    state: &AppState,
    auth: &AuthUser,
    project_id: DbId,
) -> AppResult<()> {
    if auth.role == ROLE_JUDGE || auth.role == ROLE_ADMIN {
        return Ok(());
    }
    require_member(state, project_id, auth.user_id).await
}
