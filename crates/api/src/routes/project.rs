//! Route definitions for the `/projects` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::project;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                         -> list
/// POST   /                         -> create
/// GET    /{id}                     -> get_by_id
/// PUT    /{id}                     -> update (member)
/// DELETE /{id}                     -> delete (owner)
/// POST   /{id}/status              -> set_status (member)
/// POST   /{id}/members             -> add_member (owner)
/// DELETE /{id}/members/{user_id}   -> remove_member (self or owner)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .route("/{id}/status", post(project::set_status))
        .route("/{id}/members", post(project::add_member))
        .route("/{id}/members/{user_id}", delete(project::remove_member))
}
