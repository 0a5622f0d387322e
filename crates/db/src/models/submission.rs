//! Submission entity models and DTOs.

use hackforge_core::scoring::ScoreVector;
use hackforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `submissions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Submission {
    pub id: DbId,
    pub project_id: DbId,
    pub content: String,
    pub repo_url: Option<String>,
    pub demo_url: Option<String>,
    /// Mean of the five per-criterion means across judges; `None` until the
    /// first evaluation lands.
    pub average_score: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `submission_evaluations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Evaluation {
    pub id: DbId,
    pub submission_id: DbId,
    pub judge_id: DbId,
    pub innovation: i16,
    pub technical_execution: i16,
    pub design: i16,
    pub impact: i16,
    pub presentation: i16,
    pub comment: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Evaluation {
    /// The judge's scores as a domain score vector.
    pub fn score_vector(&self) -> ScoreVector {
        ScoreVector {
            innovation: self.innovation,
            technical_execution: self.technical_execution,
            design: self.design,
            impact: self.impact,
            presentation: self.presentation,
        }
    }
}

/// A row from the `submission_versions` audit table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubmissionVersion {
    pub id: DbId,
    pub submission_id: DbId,
    pub content: String,
    pub repo_url: Option<String>,
    pub demo_url: Option<String>,
    pub replaced_at: Timestamp,
}

/// DTO for creating a submission.
#[derive(Debug, Deserialize)]
pub struct CreateSubmission {
    pub project_id: DbId,
    pub content: String,
    pub repo_url: Option<String>,
    pub demo_url: Option<String>,
}

/// DTO for updating a submission's content. All fields are optional; the
/// previous content is appended to the version history before overwriting.
#[derive(Debug, Deserialize)]
pub struct UpdateSubmission {
    pub content: Option<String>,
    pub repo_url: Option<String>,
    pub demo_url: Option<String>,
}
