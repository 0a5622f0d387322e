//! Route definitions for the `/teams` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::team;
use crate::state::AppState;

/// Routes mounted at `/teams`.
///
/// ```text
/// GET    /                         -> list
/// POST   /                         -> create
/// GET    /{id}                     -> get_by_id
/// PUT    /{id}                     -> update (leader)
/// DELETE /{id}                     -> delete (leader)
/// POST   /{id}/invite              -> invite (accepted member)
/// POST   /{id}/respond             -> respond (invitee)
/// DELETE /{id}/members/{user_id}   -> remove_member (self or leader)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(team::list).post(team::create))
        .route(
            "/{id}",
            get(team::get_by_id).put(team::update).delete(team::delete),
        )
        .route("/{id}/invite", post(team::invite))
        .route("/{id}/respond", post(team::respond))
        .route("/{id}/members/{user_id}", delete(team::remove_member))
}
