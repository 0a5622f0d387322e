//! Chat message entity model and DTOs.

use hackforge_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `messages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Message {
    pub id: DbId,
    /// Room key: `team_<id>` or `project_<id>`.
    pub room: String,
    pub sender_id: DbId,
    pub content: String,
    pub parent_id: Option<DbId>,
    /// Denormalized reply counter, incremented when a reply is written.
    pub reply_count: i64,
    pub is_deleted: bool,
    pub is_delivered: bool,
    pub created_at: Timestamp,
}

/// DTO for persisting a new chat message.
#[derive(Debug)]
pub struct CreateMessage {
    pub room: String,
    pub sender_id: DbId,
    pub content: String,
    pub parent_id: Option<DbId>,
}
