//! Handler for the `/dashboard` aggregate view.
//!
//! One authenticated read that gathers the caller's teams, pending
//! invitations, projects, unread notification count, and the public
//! hackathons that are still ahead of their judging deadline.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use hackforge_db::models::project::Project;
use hackforge_db::models::team::Team;
use hackforge_db::repositories::{HackathonRepo, NotificationRepo, ProjectRepo, TeamRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::handlers::hackathon::HackathonDetail;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Aggregate dashboard payload for the authenticated user.
#[derive(Debug, Serialize)]
pub struct Dashboard {
    /// Teams where the caller holds an accepted slot.
    pub teams: Vec<Team>,
    /// Teams with a pending invitation for the caller.
    pub pending_invitations: Vec<Team>,
    /// Projects where the caller is a member.
    pub projects: Vec<Project>,
    /// Unread notification count.
    pub unread_notifications: i64,
    /// Public hackathons that have not finished judging yet.
    pub upcoming_hackathons: Vec<HackathonDetail>,
}

/// GET /api/v1/dashboard
pub async fn get(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Dashboard>>> {
    let teams = TeamRepo::teams_for_user(&state.pool, auth.user_id).await?;
    let pending_invitations =
        TeamRepo::pending_invitations_for_user(&state.pool, auth.user_id).await?;
    let projects = ProjectRepo::projects_for_user(&state.pool, auth.user_id).await?;
    let unread_notifications = NotificationRepo::unread_count(&state.pool, auth.user_id).await?;

    let now = Utc::now();
    let mut upcoming_hackathons = Vec::new();
    for hackathon in HackathonRepo::list(&state.pool, true).await? {
        let windows = hackathon.windows();
        if now < hackathon.judging_ends_at {
            let phase = windows.phase_at(now);
            upcoming_hackathons.push(HackathonDetail {
                registration_open: windows.registration_open_at(now),
                hackathon,
                phase: phase.as_str(),
            });
        }
    }

    Ok(Json(ApiResponse::new(Dashboard {
        teams,
        pending_invitations,
        projects,
        unread_notifications,
        upcoming_hackathons,
    })))
}
