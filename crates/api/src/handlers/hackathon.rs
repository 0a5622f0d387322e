//! Handlers for the `/hackathons` resource.
//!
//! Every read derives the hackathon's phase from its stored time windows
//! and opportunistically refreshes the persisted `status` snapshot when it
//! drifted. The snapshot is never treated as the source of truth.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use hackforge_core::error::CoreError;
use hackforge_core::notification::NotificationPayload;
use hackforge_core::roles::ROLE_ADMIN;
use hackforge_core::types::{DbId, Timestamp};
use hackforge_db::models::hackathon::{
    CreateHackathon, Hackathon, ParticipantInfo, UpdateHackathon,
};
use hackforge_db::repositories::HackathonRepo;
use hackforge_events::PlatformEvent;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A hackathon enriched with its clock-derived phase.
#[derive(Debug, Serialize)]
pub struct HackathonDetail {
    #[serde(flatten)]
    pub hackathon: Hackathon,
    /// Phase derived from the time windows at response time.
    pub phase: &'static str,
    pub registration_open: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/hackathons
///
/// Create a hackathon. Admin only.
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateHackathon>,
) -> AppResult<(StatusCode, Json<ApiResponse<HackathonDetail>>)> {
    validate_windows(
        input.registration_starts_at,
        input.registration_ends_at,
        input.starts_at,
        input.ends_at,
        input.judging_ends_at,
    )?;

    let hackathon = HackathonRepo::create(&state.pool, admin.user_id, &input).await?;
    let detail = with_phase(&state, hackathon).await;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(detail))))
}

/// GET /api/v1/hackathons
///
/// List hackathons. Non-admin callers only see public ones.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<HackathonDetail>>>> {
    let public_only = auth.role != ROLE_ADMIN;
    let hackathons = HackathonRepo::list(&state.pool, public_only).await?;

    let mut details = Vec::with_capacity(hackathons.len());
    for hackathon in hackathons {
        details.push(with_phase(&state, hackathon).await);
    }
    Ok(Json(ApiResponse::new(details)))
}

/// GET /api/v1/hackathons/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<HackathonDetail>>> {
    let hackathon = find_visible(&state, &auth, id).await?;
    Ok(Json(ApiResponse::new(with_phase(&state, hackathon).await)))
}

/// PUT /api/v1/hackathons/{id}
///
/// Update a hackathon and notify registered participants. Admin only.
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateHackathon>,
) -> AppResult<Json<ApiResponse<HackathonDetail>>> {
    let existing = HackathonRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Hackathon",
            id,
        }))?;

    // Validate the windows as they would look after the merge, before
    // anything is persisted.
    validate_windows(
        input
            .registration_starts_at
            .unwrap_or(existing.registration_starts_at),
        input
            .registration_ends_at
            .unwrap_or(existing.registration_ends_at),
        input.starts_at.unwrap_or(existing.starts_at),
        input.ends_at.unwrap_or(existing.ends_at),
        input.judging_ends_at.unwrap_or(existing.judging_ends_at),
    )?;

    let hackathon = HackathonRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Hackathon",
            id,
        }))?;

    let targets = HackathonRepo::participant_user_ids(&state.pool, id).await?;
    state.event_bus.publish(
        PlatformEvent::new("hackathon.updated")
            .with_source("hackathon", id)
            .with_actor(admin.user_id)
            .with_targets(targets)
            .with_notification(NotificationPayload::HackathonUpdate {
                hackathon_id: id,
                name: hackathon.name.clone(),
                summary: "Hackathon details changed".into(),
            }),
    );

    Ok(Json(ApiResponse::new(with_phase(&state, hackathon).await)))
}

/// DELETE /api/v1/hackathons/{id}
///
/// Delete a hackathon and everything under it. Admin only.
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = HackathonRepo::delete(&state.pool, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Hackathon",
            id,
        }))
    }
}

/// POST /api/v1/hackathons/{id}/register
///
/// Register the caller as a participant. Only allowed while the
/// registration window is open and capacity remains.
pub async fn register(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let hackathon = find_visible(&state, &auth, id).await?;

    if !hackathon.windows().registration_open_at(Utc::now()) {
        return Err(AppError::Core(CoreError::Validation(
            "Registration is not open".into(),
        )));
    }

    if HackathonRepo::is_registered(&state.pool, id, auth.user_id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "Already registered for this hackathon".into(),
        )));
    }

    let registered = HackathonRepo::register_participant(&state.pool, id, auth.user_id).await?;
    if !registered {
        return Err(AppError::Core(CoreError::Conflict(
            "Hackathon is at capacity".into(),
        )));
    }

    tracing::info!(hackathon_id = id, user_id = auth.user_id, "Participant registered");
    Ok(StatusCode::CREATED)
}

/// GET /api/v1/hackathons/{id}/participants
pub async fn participants(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Vec<ParticipantInfo>>>> {
    find_visible(&state, &auth, id).await?;
    let participants = HackathonRepo::list_participants(&state.pool, id).await?;
    Ok(Json(ApiResponse::new(participants)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a hackathon, hiding private ones from non-admin callers.
async fn find_visible(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<Hackathon> {
    let hackathon = HackathonRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Hackathon",
            id,
        }))?;

    if !hackathon.is_public && auth.role != ROLE_ADMIN {
        // Hidden, not forbidden: private events should not leak existence.
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Hackathon",
            id,
        }));
    }

    Ok(hackathon)
}

/// Derive the phase and opportunistically refresh the stored snapshot.
async fn with_phase(state: &AppState, hackathon: Hackathon) -> HackathonDetail {
    let windows = hackathon.windows();
    let now = Utc::now();
    let phase = windows.phase_at(now);

    if hackathon.status != phase.as_str() {
        // Best-effort snapshot refresh; the derived value is authoritative.
        if let Err(e) =
            HackathonRepo::update_status_snapshot(&state.pool, hackathon.id, phase.as_str()).await
        {
            tracing::warn!(error = %e, hackathon_id = hackathon.id, "Status snapshot update failed");
        }
    }

    HackathonDetail {
        registration_open: windows.registration_open_at(now),
        hackathon,
        phase: phase.as_str(),
    }
}

/// Reject window configurations that cannot be satisfied by any clock.
fn validate_windows(
    registration_starts_at: Timestamp,
    registration_ends_at: Timestamp,
    starts_at: Timestamp,
    ends_at: Timestamp,
    judging_ends_at: Timestamp,
) -> Result<(), AppError> {
    let ordered = registration_starts_at < registration_ends_at
        && registration_ends_at <= starts_at
        && starts_at < ends_at
        && ends_at <= judging_ends_at;
    if ordered {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Validation(
            "Time windows must be ordered: registration, event, judging".into(),
        )))
    }
}
