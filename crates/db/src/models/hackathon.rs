//! Hackathon entity models and DTOs.

use hackforge_core::hackathon::HackathonWindows;
use hackforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `hackathons` table.
///
/// The `status` column is an opportunistic snapshot; derive the live phase
/// from [`Hackathon::windows`] instead of trusting it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Hackathon {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub registration_starts_at: Timestamp,
    pub registration_ends_at: Timestamp,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub judging_ends_at: Timestamp,
    pub is_public: bool,
    pub max_participants: i64,
    pub status: String,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Hackathon {
    /// The window boundaries as a value the phase derivation can consume.
    pub fn windows(&self) -> HackathonWindows {
        HackathonWindows {
            registration_starts_at: self.registration_starts_at,
            registration_ends_at: self.registration_ends_at,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            judging_ends_at: self.judging_ends_at,
        }
    }
}

/// DTO for creating a hackathon.
#[derive(Debug, Deserialize)]
pub struct CreateHackathon {
    pub name: String,
    pub description: Option<String>,
    pub registration_starts_at: Timestamp,
    pub registration_ends_at: Timestamp,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub judging_ends_at: Timestamp,
    pub is_public: Option<bool>,
    pub max_participants: Option<i64>,
}

/// DTO for updating a hackathon. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateHackathon {
    pub name: Option<String>,
    pub description: Option<String>,
    pub registration_starts_at: Option<Timestamp>,
    pub registration_ends_at: Option<Timestamp>,
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
    pub judging_ends_at: Option<Timestamp>,
    pub is_public: Option<bool>,
    pub max_participants: Option<i64>,
}

/// A registered participant, joined with their username.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ParticipantInfo {
    pub user_id: DbId,
    pub username: String,
    pub registered_at: Timestamp,
}
