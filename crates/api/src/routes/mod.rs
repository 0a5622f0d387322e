pub mod auth;
pub mod dashboard;
pub mod hackathon;
pub mod health;
pub mod message;
pub mod notification;
pub mod project;
pub mod submission;
pub mod team;
pub mod user;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                  WebSocket (auth + rooms + chat)
///
/// /auth/register                       register (public)
/// /auth/login                          login (public)
/// /auth/refresh                        refresh (public)
/// /auth/logout                         logout (requires auth)
///
/// /users                               list
/// /users/me                            get, update own profile
/// /users/{id}                          get, update (admin), soft-delete
///
/// /hackathons                          list, create (admin)
/// /hackathons/{id}                     get, update (admin), delete (admin)
/// /hackathons/{id}/register            register participant (POST)
/// /hackathons/{id}/participants        list participants (GET)
///
/// /teams                               list (?hackathon_id, ?looking_for_members), create
/// /teams/{id}                          get, update, delete
/// /teams/{id}/invite                   invite member (POST)
/// /teams/{id}/respond                  accept/reject own invitation (POST)
/// /teams/{id}/members/{user_id}        leave / remove member (DELETE)
///
/// /projects                            list (?hackathon_id), create
/// /projects/{id}                       get, update, delete
/// /projects/{id}/status                status transition (POST)
/// /projects/{id}/members               add member (POST)
/// /projects/{id}/members/{user_id}     remove member (DELETE)
///
/// /submissions                         list (?project_id), create
/// /submissions/{id}                    get, update
/// /submissions/{id}/versions           edit history (GET)
/// /submissions/{id}/evaluations        list (GET), record (POST, judge)
///
/// /notifications                       list (?unread_only, limit, offset)
/// /notifications/read-all              mark all read (POST)
/// /notifications/unread-count          unread count (GET)
/// /notifications/{id}/read             mark read (POST)
///
/// /messages                            room history (?room, limit, offset)
/// /messages/{id}                       soft-delete own message (DELETE)
///
/// /dashboard                           aggregate view for the caller (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // WebSocket endpoint (chat rooms + notification push).
        .route("/ws", get(ws::ws_handler))
        // Authentication routes (register, login, refresh, logout).
        .nest("/auth", auth::router())
        // User profiles and account lifecycle.
        .nest("/users", user::router())
        // Hackathon events and participant registration.
        .nest("/hackathons", hackathon::router())
        // Team formation and the invitation lifecycle.
        .nest("/teams", team::router())
        // Projects and their member lists.
        .nest("/projects", project::router())
        // Submissions, versions, and judge evaluations.
        .nest("/submissions", submission::router())
        // Per-user notifications.
        .nest("/notifications", notification::router())
        // Chat history and message soft-delete.
        .nest("/messages", message::router())
        // Aggregate dashboard.
        .nest("/dashboard", dashboard::router())
}
