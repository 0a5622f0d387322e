//! Route definitions for the `/users` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /        -> list
/// GET    /me      -> me
/// PUT    /me      -> update_me
/// GET    /{id}    -> get_by_id
/// PUT    /{id}    -> update (admin)
/// DELETE /{id}    -> soft_delete (self or admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(user::list))
        .route("/me", get(user::me).put(user::update_me))
        .route(
            "/{id}",
            get(user::get_by_id)
                .put(user::update)
                .delete(user::soft_delete),
        )
}
