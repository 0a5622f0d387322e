//! The project status state machine.
//!
//! Projects move along a fixed track: draft → in_progress → submitted →
//! under_review, then fan out into one of the judged outcomes. The first
//! transition into `submitted` stamps the project's submission date; the
//! stamp is never overwritten.

use crate::error::CoreError;

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectStatus {
    Draft,
    InProgress,
    Submitted,
    UnderReview,
    Selected,
    Winner,
    Completed,
    Rejected,
}

impl ProjectStatus {
    /// Stable string form stored in the `projects.status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Draft => "draft",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Submitted => "submitted",
            ProjectStatus::UnderReview => "under_review",
            ProjectStatus::Selected => "selected",
            ProjectStatus::Winner => "winner",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Rejected => "rejected",
        }
    }

    /// Parse the stored string form.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "draft" => Ok(ProjectStatus::Draft),
            "in_progress" => Ok(ProjectStatus::InProgress),
            "submitted" => Ok(ProjectStatus::Submitted),
            "under_review" => Ok(ProjectStatus::UnderReview),
            "selected" => Ok(ProjectStatus::Selected),
            "winner" => Ok(ProjectStatus::Winner),
            "completed" => Ok(ProjectStatus::Completed),
            "rejected" => Ok(ProjectStatus::Rejected),
            other => Err(CoreError::Validation(format!(
                "Unknown project status: {other}"
            ))),
        }
    }

    /// Whether `self → to` is a legal transition.
    pub fn can_transition(&self, to: ProjectStatus) -> bool {
        use ProjectStatus::*;
        matches!(
            (self, to),
            (Draft, InProgress)
                | (InProgress, Submitted)
                | (Submitted, UnderReview)
                | (UnderReview, Selected)
                | (UnderReview, Winner)
                | (UnderReview, Completed)
                | (UnderReview, Rejected)
                | (Selected, Winner)
                | (Selected, Completed)
        )
    }

    /// Validate a transition, producing the user-facing error on failure.
    pub fn check_transition(&self, to: ProjectStatus) -> Result<(), CoreError> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(CoreError::Validation(format!(
                "Cannot change project status from '{}' to '{}'",
                self.as_str(),
                to.as_str()
            )))
        }
    }
}
