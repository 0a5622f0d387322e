//! Handlers for the `/messages` resource (chat history and soft delete).
//!
//! Live chat goes over the WebSocket channel; these endpoints serve history
//! backfill and message removal. Room access uses the same membership rules
//! as the socket layer.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use hackforge_core::error::CoreError;
use hackforge_core::types::DbId;
use hackforge_db::models::message::Message;
use hackforge_db::repositories::{MessageRepo, ProjectRepo, TeamRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::{DEFAULT_LIMIT, MAX_LIMIT};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::ws::RoomKey;

/// Query parameters for `GET /messages`.
#[derive(Debug, Deserialize)]
pub struct MessageListQuery {
    /// Room key: `team_<id>` or `project_<id>`.
    pub room: String,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/v1/messages?room=team_42
///
/// A room's message history, newest first. Callers must be a member of the
/// underlying team or project.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<MessageListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Message>>>> {
    require_room_member(&state, &auth, &params.room).await?;

    let messages = MessageRepo::list_room(
        &state.pool,
        &params.room,
        params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        params.offset.unwrap_or(0).max(0),
    )
    .await?;
    Ok(Json(ApiResponse::new(messages)))
}

/// DELETE /api/v1/messages/{id}
///
/// Soft-delete a message: the content is replaced with a tombstone and the
/// flag set. Only the sender may delete their own message.
pub async fn soft_delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let message = MessageRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Message",
            id,
        }))?;

    if message.sender_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only delete your own messages".into(),
        )));
    }

    let deleted = MessageRepo::soft_delete(&state.pool, id, auth.user_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::Conflict(
            "Message is already deleted".into(),
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Check the caller's membership of the team/project behind a room key.
async fn require_room_member(state: &AppState, auth: &AuthUser, room: &str) -> AppResult<()> {
    let key = RoomKey::parse(room)
        .ok_or_else(|| AppError::Core(CoreError::Validation("Unknown room key".into())))?;

    let allowed = match key {
        RoomKey::Team(team_id) => {
            TeamRepo::is_accepted_member(&state.pool, team_id, auth.user_id).await?
        }
        RoomKey::Project(project_id) => {
            ProjectRepo::member_role(&state.pool, project_id, auth.user_id)
                .await?
                .is_some()
        }
    };

    if allowed {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "You are not a member of this room".into(),
        )))
    }
}
