//! Handlers for the `/users` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use hackforge_core::error::CoreError;
use hackforge_core::roles::ROLE_ADMIN;
use hackforge_core::types::DbId;
use hackforge_db::models::user::{UpdateProfile, UpdateUser, UserResponse};
use hackforge_db::repositories::{SessionRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/users
///
/// List active users. Requires authentication.
pub async fn list(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list_responses(&state.pool, params.limit(), params.offset()).await?;
    Ok(Json(ApiResponse::new(users)))
}

/// GET /api/v1/users/me
///
/// The authenticated user's own profile.
pub async fn me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = UserRepo::find_response_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    Ok(Json(ApiResponse::new(user)))
}

/// PUT /api/v1/users/me
///
/// Update the authenticated user's own profile (name, bio, skills).
pub async fn update_me(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfile>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    if let Some(skills) = &input.skills {
        if !skills.is_array() {
            return Err(AppError::Core(CoreError::Validation(
                "Skills must be an array of strings".into(),
            )));
        }
    }

    UserRepo::update_profile(&state.pool, auth.user_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;

    // Re-read through the joined query so the role name is resolved.
    let user = UserRepo::find_response_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    Ok(Json(ApiResponse::new(user)))
}

/// GET /api/v1/users/{id}
pub async fn get_by_id(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = UserRepo::find_response_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(Json(ApiResponse::new(user)))
}

/// PUT /api/v1/users/{id}
///
/// Admin-only update of another user's role or active flag.
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUser>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    UserRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    let user = UserRepo::find_response_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    Ok(Json(ApiResponse::new(user)))
}

/// DELETE /api/v1/users/{id}
///
/// Soft-delete an account: the email is renamed and `is_active` flipped off,
/// so the row survives for referential history but can no longer
/// authenticate. Allowed for the account owner and admins.
pub async fn soft_delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if auth.user_id != id && auth.role != ROLE_ADMIN {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only delete your own account".into(),
        )));
    }

    let deleted = UserRepo::soft_delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }

    // Active sessions die with the account.
    SessionRepo::revoke_all_for_user(&state.pool, id).await?;

    tracing::info!(user_id = id, actor = auth.user_id, "User soft-deleted");
    Ok(StatusCode::NO_CONTENT)
}
