//! Team entity models and DTOs.

use hackforge_core::team::{InvitationStatus, MemberSlot};
use hackforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `teams` table.
///
/// Derived flags (`available_slots`, `is_looking_for_members`) are not
/// stored; they are computed on read from the roster.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Team {
    pub id: DbId,
    pub hackathon_id: DbId,
    pub name: String,
    pub description: String,
    pub max_members: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A roster slot joined with the member's username.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TeamMemberInfo {
    pub user_id: DbId,
    pub username: String,
    pub invitation_status: String,
    pub is_leader: bool,
    pub invited_at: Timestamp,
    pub joined_at: Option<Timestamp>,
}

impl TeamMemberInfo {
    /// Convert to the in-memory slot shape the domain checks consume.
    ///
    /// Returns `None` for a row whose status string does not parse, which
    /// the CHECK constraint makes unreachable in practice.
    pub fn as_slot(&self) -> Option<MemberSlot> {
        Some(MemberSlot {
            user_id: self.user_id,
            status: InvitationStatus::parse(&self.invitation_status).ok()?,
            is_leader: self.is_leader,
        })
    }
}

/// DTO for creating a team.
#[derive(Debug, Deserialize)]
pub struct CreateTeam {
    pub hackathon_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub max_members: Option<i64>,
}

/// DTO for updating a team. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateTeam {
    pub name: Option<String>,
    pub description: Option<String>,
    pub max_members: Option<i64>,
}
