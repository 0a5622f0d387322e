//! Route definitions for the `/submissions` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::submission;
use crate::state::AppState;

/// Routes mounted at `/submissions`.
///
/// ```text
/// GET    /                      -> list (?project_id)
/// POST   /                      -> create (project member)
/// GET    /{id}                  -> get_by_id
/// PUT    /{id}                  -> update (project member)
/// GET    /{id}/versions         -> versions
/// GET    /{id}/evaluations      -> evaluations
/// POST   /{id}/evaluations      -> evaluate (judge)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(submission::list).post(submission::create))
        .route(
            "/{id}",
            get(submission::get_by_id).put(submission::update),
        )
        .route("/{id}/versions", get(submission::versions))
        .route(
            "/{id}/evaluations",
            get(submission::evaluations).post(submission::evaluate),
        )
}
