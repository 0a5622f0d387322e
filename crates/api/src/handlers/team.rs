//! Handlers for the `/teams` resource and the invitation lifecycle.
//!
//! Roster checks run against a snapshot via the pure domain logic in
//! `hackforge_core::team`; the repository statements carry the same guards
//! so racing requests cannot break the invariants. Every illegal transition
//! is surfaced synchronously with a specific message — nothing is retried
//! or queued.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use hackforge_core::error::CoreError;
use hackforge_core::notification::NotificationPayload;
use hackforge_core::team::{self, InviteAction, MemberSlot};
use hackforge_core::types::DbId;
use hackforge_db::models::team::{CreateTeam, Team, TeamMemberInfo, UpdateTeam};
use hackforge_db::repositories::{HackathonRepo, TeamRepo, UserRepo};
use hackforge_events::PlatformEvent;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /teams`.
#[derive(Debug, Deserialize)]
pub struct TeamListQuery {
    pub hackathon_id: Option<DbId>,
    /// If `true`, only teams with an open slot are returned.
    #[serde(default)]
    pub looking_for_members: bool,
}

/// Request body for `POST /teams/{id}/invite`.
#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    pub user_id: DbId,
}

/// Request body for `POST /teams/{id}/respond`.
#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub accept: bool,
}

/// A team enriched with its roster and read-time derived flags.
#[derive(Debug, Serialize)]
pub struct TeamDetail {
    #[serde(flatten)]
    pub team: Team,
    pub members: Vec<TeamMemberInfo>,
    pub accepted_count: i64,
    pub available_slots: i64,
    pub is_looking_for_members: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/teams
///
/// Create a team; the creator becomes its accepted leader.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateTeam>,
) -> AppResult<(StatusCode, Json<ApiResponse<TeamDetail>>)> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Team name must not be empty".into(),
        )));
    }
    if input.max_members.is_some_and(|m| m < 1) {
        return Err(AppError::Core(CoreError::Validation(
            "A team needs room for at least one member".into(),
        )));
    }

    // The hackathon must exist; a dangling reference would also trip the FK.
    HackathonRepo::find_by_id(&state.pool, input.hackathon_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Hackathon",
            id: input.hackathon_id,
        }))?;

    let team = TeamRepo::create(&state.pool, auth.user_id, &input).await?;
    tracing::info!(team_id = team.id, user_id = auth.user_id, "Team created");

    let detail = load_detail(&state, team).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(detail))))
}

/// GET /api/v1/teams
pub async fn list(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<TeamListQuery>,
) -> AppResult<Json<ApiResponse<Vec<TeamDetail>>>> {
    let teams =
        TeamRepo::list(&state.pool, params.hackathon_id, params.looking_for_members).await?;

    let mut details = Vec::with_capacity(teams.len());
    for team in teams {
        details.push(load_detail(&state, team).await?);
    }
    Ok(Json(ApiResponse::new(details)))
}

/// GET /api/v1/teams/{id}
pub async fn get_by_id(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<TeamDetail>>> {
    let team = find_team(&state, id).await?;
    let detail = load_detail(&state, team).await?;
    Ok(Json(ApiResponse::new(detail)))
}

/// PUT /api/v1/teams/{id}
///
/// Update team fields. Only an accepted leader may update, and
/// `max_members` cannot shrink below the current accepted count.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTeam>,
) -> AppResult<Json<ApiResponse<TeamDetail>>> {
    let _team = find_team(&state, id).await?;
    let members = TeamRepo::members(&state.pool, id).await?;
    let slots = to_slots(&members)?;

    require_accepted_leader(&slots, auth.user_id)?;

    if let Some(new_max) = input.max_members {
        if new_max < team::accepted_count(&slots) {
            return Err(AppError::Core(CoreError::Validation(
                "max_members cannot be lower than the current member count".into(),
            )));
        }
    }

    let team = TeamRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Team", id }))?;

    notify_team(&state, &team, auth.user_id, "Team details changed").await?;

    let detail = load_detail(&state, team).await?;
    Ok(Json(ApiResponse::new(detail)))
}

/// DELETE /api/v1/teams/{id}
///
/// Disband a team. Only an accepted leader may delete.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_team(&state, id).await?;
    let members = TeamRepo::members(&state.pool, id).await?;
    let slots = to_slots(&members)?;
    require_accepted_leader(&slots, auth.user_id)?;

    TeamRepo::delete(&state.pool, id).await?;
    tracing::info!(team_id = id, user_id = auth.user_id, "Team deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/teams/{id}/invite
///
/// Invite a user into the team. Only an accepted member may invite, the
/// team must have an open slot, and a previously rejected invitation is
/// reset to pending.
pub async fn invite(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<InviteRequest>,
) -> AppResult<StatusCode> {
    let team = find_team(&state, id).await?;

    // The invitee must exist and be active.
    let invitee = UserRepo::find_by_id(&state.pool, input.user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: input.user_id,
        }))?;

    let members = TeamRepo::members(&state.pool, id).await?;
    let slots = to_slots(&members)?;

    let action = team::check_invite(&slots, team.max_members, auth.user_id, input.user_id)
        .map_err(AppError::Core)?;

    let applied = match action {
        InviteAction::CreatePending => {
            TeamRepo::insert_pending_member(&state.pool, id, input.user_id).await?
        }
        InviteAction::ResetRejectedToPending => {
            TeamRepo::reset_rejected_to_pending(&state.pool, id, input.user_id).await?
        }
    };
    if !applied {
        // The statement-level guard lost a race the snapshot check passed.
        return Err(AppError::Core(CoreError::Conflict("Team is full".into())));
    }

    state.event_bus.publish(
        PlatformEvent::new("team.invited")
            .with_source("team", id)
            .with_actor(auth.user_id)
            .with_targets(vec![invitee.id])
            .with_notification(NotificationPayload::TeamInvite {
                team_id: id,
                team_name: team.name.clone(),
                invited_by: auth.user_id,
            }),
    );

    tracing::info!(team_id = id, invitee = invitee.id, inviter = auth.user_id, "Invitation sent");
    Ok(StatusCode::CREATED)
}

/// POST /api/v1/teams/{id}/respond
///
/// Accept or reject the caller's own pending invitation. Accepting stamps
/// the join timestamp.
pub async fn respond(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RespondRequest>,
) -> AppResult<StatusCode> {
    let team = find_team(&state, id).await?;
    let members = TeamRepo::members(&state.pool, id).await?;
    let slots = to_slots(&members)?;

    team::check_response(&slots, team.max_members, auth.user_id, input.accept)
        .map_err(AppError::Core)?;

    let applied = if input.accept {
        TeamRepo::accept_invitation(&state.pool, id, auth.user_id).await?
    } else {
        TeamRepo::reject_invitation(&state.pool, id, auth.user_id).await?
    };
    if !applied {
        return Err(AppError::Core(CoreError::Conflict("Team is full".into())));
    }

    // Tell the accepted roster how the invitation went.
    let targets = TeamRepo::accepted_member_ids(&state.pool, id).await?;
    state.event_bus.publish(
        PlatformEvent::new("team.invite_responded")
            .with_source("team", id)
            .with_actor(auth.user_id)
            .with_targets(targets)
            .with_notification(NotificationPayload::InviteResponse {
                team_id: id,
                team_name: team.name.clone(),
                responder_id: auth.user_id,
                accepted: input.accept,
            }),
    );

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/teams/{id}/members/{user_id}
///
/// Leave the team, or remove a member as a leader. The slot row is deleted
/// outright; removing the sole accepted leader is rejected.
pub async fn remove_member(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, user_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let team = find_team(&state, id).await?;
    let members = TeamRepo::members(&state.pool, id).await?;
    let slots = to_slots(&members)?;

    // Members may leave on their own; removing someone else takes a leader.
    if auth.user_id != user_id {
        require_accepted_leader(&slots, auth.user_id)?;
    }

    team::check_removal(&slots, user_id).map_err(AppError::Core)?;

    let removed = TeamRepo::remove_member(&state.pool, id, user_id).await?;
    if !removed {
        return Err(AppError::Core(CoreError::Conflict(
            "Cannot remove the only team leader".into(),
        )));
    }

    notify_team(&state, &team, auth.user_id, "A member left the team").await?;

    tracing::info!(team_id = id, removed = user_id, actor = auth.user_id, "Member removed");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_team(state: &AppState, id: DbId) -> AppResult<Team> {
    TeamRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Team", id }))
}

/// Assemble the roster snapshot for the domain checks.
fn to_slots(members: &[TeamMemberInfo]) -> AppResult<Vec<MemberSlot>> {
    members
        .iter()
        .map(|m| {
            m.as_slot().ok_or_else(|| {
                AppError::InternalError(format!(
                    "Corrupt invitation status for user {}",
                    m.user_id
                ))
            })
        })
        .collect()
}

fn require_accepted_leader(slots: &[MemberSlot], user_id: DbId) -> AppResult<()> {
    let is_leader = slots.iter().any(|s| {
        s.user_id == user_id
            && s.is_leader
            && s.status == hackforge_core::team::InvitationStatus::Accepted
    });
    if is_leader {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "Only a team leader can do this".into(),
        )))
    }
}

/// Compute the read-time derived fields for a team.
async fn load_detail(state: &AppState, team: Team) -> AppResult<TeamDetail> {
    let members = TeamRepo::members(&state.pool, team.id).await?;
    let slots = to_slots(&members)?;

    let accepted_count = team::accepted_count(&slots);
    let available_slots = team::available_slots(&slots, team.max_members);
    let is_looking_for_members = team::is_looking_for_members(&slots, team.max_members);

    Ok(TeamDetail {
        team,
        members,
        accepted_count,
        available_slots,
        is_looking_for_members,
    })
}

/// Fan a team-update notification out to the accepted roster.
async fn notify_team(
    state: &AppState,
    team: &Team,
    actor: DbId,
    summary: &str,
) -> AppResult<()> {
    let targets = TeamRepo::accepted_member_ids(&state.pool, team.id).await?;
    state.event_bus.publish(
        PlatformEvent::new("team.updated")
            .with_source("team", team.id)
            .with_actor(actor)
            .with_targets(targets)
            .with_notification(NotificationPayload::TeamUpdate {
                team_id: team.id,
                team_name: team.name.clone(),
                summary: summary.into(),
            }),
    );
    Ok(())
}
