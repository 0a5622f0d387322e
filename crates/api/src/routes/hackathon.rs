//! Route definitions for the `/hackathons` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::hackathon;
use crate::state::AppState;

/// Routes mounted at `/hackathons`.
///
/// ```text
/// GET    /                    -> list
/// POST   /                    -> create (admin)
/// GET    /{id}                -> get_by_id
/// PUT    /{id}                -> update (admin)
/// DELETE /{id}                -> delete (admin)
/// POST   /{id}/register       -> register
/// GET    /{id}/participants   -> participants
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(hackathon::list).post(hackathon::create))
        .route(
            "/{id}",
            get(hackathon::get_by_id)
                .put(hackathon::update)
                .delete(hackathon::delete),
        )
        .route("/{id}/register", post(hackathon::register))
        .route("/{id}/participants", get(hackathon::participants))
}
