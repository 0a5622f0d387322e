//! Handlers for the `/projects` resource.
//!
//! Mutations are gated by membership: any member may update, only an owner
//! may delete or manage members. Status moves through the state machine in
//! `hackforge_core::project_status`; the first transition into `submitted`
//! stamps `submitted_at` once.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use hackforge_core::error::CoreError;
use hackforge_core::notification::NotificationPayload;
use hackforge_core::project_status::ProjectStatus;
use hackforge_core::types::DbId;
use hackforge_db::models::project::{
    CreateProject, Project, ProjectMemberInfo, UpdateProject,
};
use hackforge_db::repositories::{HackathonRepo, ProjectRepo, UserRepo};
use hackforge_events::PlatformEvent;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /projects`.
#[derive(Debug, Deserialize)]
pub struct ProjectListQuery {
    pub hackathon_id: Option<DbId>,
}

/// Request body for `POST /projects/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// Request body for `POST /projects/{id}/members`.
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: DbId,
}

/// A project enriched with its member list.
#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub members: Vec<ProjectMemberInfo>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/projects
///
/// Create a project; the creator becomes its owner.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<ApiResponse<ProjectDetail>>)> {
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Project title must not be empty".into(),
        )));
    }

    HackathonRepo::find_by_id(&state.pool, input.hackathon_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Hackathon",
            id: input.hackathon_id,
        }))?;

    let project = ProjectRepo::create(&state.pool, auth.user_id, &input).await?;
    tracing::info!(project_id = project.id, user_id = auth.user_id, "Project created");

    let detail = load_detail(&state, project).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(detail))))
}

/// GET /api/v1/projects
pub async fn list(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ProjectListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Project>>>> {
    let projects = ProjectRepo::list(&state.pool, params.hackathon_id).await?;
    Ok(Json(ApiResponse::new(projects)))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<ProjectDetail>>> {
    let project = find_project(&state, id).await?;
    let detail = load_detail(&state, project).await?;
    Ok(Json(ApiResponse::new(detail)))
}

/// PUT /api/v1/projects/{id}
///
/// Update descriptive fields. Any member may update.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<ApiResponse<ProjectDetail>>> {
    find_project(&state, id).await?;
    require_member(&state, id, auth.user_id).await?;

    let project = ProjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    notify_members(&state, &project, auth.user_id, "Project details changed").await?;

    let detail = load_detail(&state, project).await?;
    Ok(Json(ApiResponse::new(detail)))
}

/// POST /api/v1/projects/{id}/status
///
/// Move the project along its status track. Illegal transitions are 400s;
/// the first move into `submitted` stamps the submission date exactly once.
pub async fn set_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<StatusRequest>,
) -> AppResult<Json<ApiResponse<ProjectDetail>>> {
    let project = find_project(&state, id).await?;
    require_member(&state, id, auth.user_id).await?;

    let current = ProjectStatus::parse(&project.status)
        .map_err(|_| AppError::InternalError(format!("Corrupt status on project {id}")))?;
    let target = ProjectStatus::parse(&input.status).map_err(AppError::Core)?;

    current.check_transition(target).map_err(AppError::Core)?;

    let project = ProjectRepo::set_status(&state.pool, id, target.as_str())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    notify_members(
        &state,
        &project,
        auth.user_id,
        &format!("Project status changed to {}", target.as_str()),
    )
    .await?;

    tracing::info!(project_id = id, status = target.as_str(), "Project status changed");

    let detail = load_detail(&state, project).await?;
    Ok(Json(ApiResponse::new(detail)))
}

/// DELETE /api/v1/projects/{id}
///
/// Delete a project. Owner only.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_project(&state, id).await?;
    require_owner(&state, id, auth.user_id).await?;

    ProjectRepo::delete(&state.pool, id).await?;
    tracing::info!(project_id = id, user_id = auth.user_id, "Project deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/projects/{id}/members
///
/// Add a member. Owner only.
pub async fn add_member(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AddMemberRequest>,
) -> AppResult<StatusCode> {
    let project = find_project(&state, id).await?;
    require_owner(&state, id, auth.user_id).await?;

    UserRepo::find_by_id(&state.pool, input.user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: input.user_id,
        }))?;

    if ProjectRepo::member_role(&state.pool, id, input.user_id)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "User is already a project member".into(),
        )));
    }

    ProjectRepo::add_member(&state.pool, id, input.user_id, "member").await?;
    notify_members(&state, &project, auth.user_id, "A member joined the project").await?;

    Ok(StatusCode::CREATED)
}

/// DELETE /api/v1/projects/{id}/members/{user_id}
///
/// Remove a member (owner) or leave the project (self). The last owner
/// cannot be removed.
pub async fn remove_member(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, user_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let project = find_project(&state, id).await?;

    if auth.user_id != user_id {
        require_owner(&state, id, auth.user_id).await?;
    }

    let removed = ProjectRepo::remove_member(&state.pool, id, user_id).await?;
    if !removed {
        return Err(AppError::Core(CoreError::Conflict(
            "Cannot remove the only project owner".into(),
        )));
    }

    notify_members(&state, &project, auth.user_id, "A member left the project").await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_project(state: &AppState, id: DbId) -> AppResult<Project> {
    ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))
}

/// Caller must hold any membership role on the project.
pub(crate) async fn require_member(
    state: &AppState,
    project_id: DbId,
    user_id: DbId,
) -> AppResult<()> {
    let role = ProjectRepo::member_role(&state.pool, project_id, user_id).await?;
    if role.is_some() {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "Only project members can do this".into(),
        )))
    }
}

/// Caller must be an owner of the project.
async fn require_owner(state: &AppState, project_id: DbId, user_id: DbId) -> AppResult<()> {
    let role = ProjectRepo::member_role(&state.pool, project_id, user_id).await?;
    if role.as_deref() == Some("owner") {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "Only a project owner can do this".into(),
        )))
    }
}

async fn load_detail(state: &AppState, project: Project) -> AppResult<ProjectDetail> {
    let members = ProjectRepo::members(&state.pool, project.id).await?;
    Ok(ProjectDetail { project, members })
}

/// Fan a project-update notification out to all members.
async fn notify_members(
    state: &AppState,
    project: &Project,
    actor: DbId,
    summary: &str,
) -> AppResult<()> {
    let targets = ProjectRepo::member_user_ids(&state.pool, project.id).await?;
    state.event_bus.publish(
        PlatformEvent::new("project.updated")
            .with_source("project", project.id)
            .with_actor(actor)
            .with_targets(targets)
            .with_notification(NotificationPayload::ProjectUpdate {
                project_id: project.id,
                title: project.title.clone(),
                summary: summary.into(),
            }),
    );
    Ok(())
}
