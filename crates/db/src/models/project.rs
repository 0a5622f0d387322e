//! Project entity models and DTOs.

use hackforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub hackathon_id: DbId,
    pub title: String,
    pub description: String,
    pub repo_url: Option<String>,
    pub demo_url: Option<String>,
    pub status: String,
    /// Stamped on the first transition into `submitted`; never overwritten.
    pub submitted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A project member joined with their username.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectMemberInfo {
    pub user_id: DbId,
    pub username: String,
    pub role: String,
    pub added_at: Timestamp,
}

/// DTO for creating a project.
#[derive(Debug, Deserialize)]
pub struct CreateProject {
    pub hackathon_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub repo_url: Option<String>,
    pub demo_url: Option<String>,
}

/// DTO for updating a project. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateProject {
    pub title: Option<String>,
    pub description: Option<String>,
    pub repo_url: Option<String>,
    pub demo_url: Option<String>,
}
