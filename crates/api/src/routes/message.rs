//! Route definitions for the `/messages` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::message;
use crate::state::AppState;

/// Routes mounted at `/messages`.
///
/// ```text
/// GET    /        -> list (?room=team_<id>|project_<id>)
/// DELETE /{id}    -> soft_delete (sender only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(message::list))
        .route("/{id}", delete(message::soft_delete))
}
