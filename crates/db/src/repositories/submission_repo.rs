//! Repository for the `submissions`, `submission_evaluations`, and
//! `submission_versions` tables.

use hackforge_core::scoring::{aggregate_score, ScoreVector};
use hackforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::submission::{
    CreateSubmission, Evaluation, Submission, SubmissionVersion, UpdateSubmission,
};

/// Column list for `submissions` queries.
const COLUMNS: &str =
    "id, project_id, content, repo_url, demo_url, average_score, created_at, updated_at";

/// Column list for `submission_evaluations` queries.
const EVALUATION_COLUMNS: &str = "id, submission_id, judge_id, innovation, technical_execution, \
                        design, impact, presentation, comment, created_at, updated_at";

/// Provides CRUD operations for submissions, evaluations, and the
/// append-only version history.
pub struct SubmissionRepo;

impl SubmissionRepo {
    /// Insert a new submission.
    ///
    /// A second submission for the same project surfaces as a unique
    /// violation on `uq_submissions_project_id`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSubmission,
    ) -> Result<Submission, sqlx::Error> {
        let query = format!(
            "INSERT INTO submissions (project_id, content, repo_url, demo_url)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Submission>(&query)
            .bind(input.project_id)
            .bind(&input.content)
            .bind(&input.repo_url)
            .bind(&input.demo_url)
            .fetch_one(pool)
            .await
    }

    /// Find a submission by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Submission>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM submissions WHERE id = $1");
        sqlx::query_as::<_, Submission>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the submission belonging to a project, if any.
    pub async fn find_by_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Option<Submission>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM submissions WHERE project_id = $1");
        sqlx::query_as::<_, Submission>(&query)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// List all submissions, highest aggregate first (unscored last).
    pub async fn list(pool: &PgPool) -> Result<Vec<Submission>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM submissions \
             ORDER BY average_score DESC NULLS LAST, created_at ASC"
        );
        sqlx::query_as::<_, Submission>(&query).fetch_all(pool).await
    }

    /// Overwrite a submission's content, appending the previous content to
    /// the version history first. Both writes share one transaction.
    pub async fn update_with_version(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSubmission,
    ) -> Result<Option<Submission>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let appended = sqlx::query(
            "INSERT INTO submission_versions (submission_id, content, repo_url, demo_url)
             SELECT id, content, repo_url, demo_url FROM submissions WHERE id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if appended.rows_affected() == 0 {
            // No such submission; nothing to update.
            return Ok(None);
        }

        let update_query = format!(
            "UPDATE submissions SET
                content = COALESCE($2, content),
                repo_url = COALESCE($3, repo_url),
                demo_url = COALESCE($4, demo_url),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let submission = sqlx::query_as::<_, Submission>(&update_query)
            .bind(id)
            .bind(&input.content)
            .bind(&input.repo_url)
            .bind(&input.demo_url)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(submission))
    }

    /// The append-only edit history, oldest first.
    pub async fn versions(
        pool: &PgPool,
        submission_id: DbId,
    ) -> Result<Vec<SubmissionVersion>, sqlx::Error> {
        sqlx::query_as::<_, SubmissionVersion>(
            "SELECT id, submission_id, content, repo_url, demo_url, replaced_at \
             FROM submission_versions \
             WHERE submission_id = $1 \
             ORDER BY replaced_at ASC",
        )
        .bind(submission_id)
        .fetch_all(pool)
        .await
    }

    /// Record (or replace) one judge's score vector and recompute the
    /// aggregate, all in one transaction.
    ///
    /// Also flips the owning project from `submitted` to `under_review` if
    /// it has not moved yet. Returns the updated submission.
    pub async fn record_evaluation(
        pool: &PgPool,
        submission_id: DbId,
        judge_id: DbId,
        scores: &ScoreVector,
        comment: Option<&str>,
    ) -> Result<Submission, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "INSERT INTO submission_evaluations
                (submission_id, judge_id, innovation, technical_execution,
                 design, impact, presentation, comment)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (submission_id, judge_id) DO UPDATE SET
                innovation = EXCLUDED.innovation,
                technical_execution = EXCLUDED.technical_execution,
                design = EXCLUDED.design,
                impact = EXCLUDED.impact,
                presentation = EXCLUDED.presentation,
                comment = EXCLUDED.comment,
                updated_at = NOW()",
        )
        .bind(submission_id)
        .bind(judge_id)
        .bind(scores.innovation)
        .bind(scores.technical_execution)
        .bind(scores.design)
        .bind(scores.impact)
        .bind(scores.presentation)
        .bind(comment)
        .execute(&mut *tx)
        .await?;

        let eval_query = format!(
            "SELECT {EVALUATION_COLUMNS} FROM submission_evaluations WHERE submission_id = $1"
        );
        let evaluations = sqlx::query_as::<_, Evaluation>(&eval_query)
            .bind(submission_id)
            .fetch_all(&mut *tx)
            .await?;

        let vectors: Vec<ScoreVector> = evaluations.iter().map(|e| e.score_vector()).collect();
        let average = aggregate_score(&vectors);

        let update_query = format!(
            "UPDATE submissions SET average_score = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let submission = sqlx::query_as::<_, Submission>(&update_query)
            .bind(submission_id)
            .bind(average)
            .fetch_one(&mut *tx)
            .await?;

        // First evaluation moves the project under review; the status guard
        // makes this a no-op on every later evaluation.
        sqlx::query(
            "UPDATE projects SET status = 'under_review', updated_at = NOW()
             WHERE id = $1 AND status = 'submitted'",
        )
        .bind(submission.project_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(submission)
    }

    /// All evaluations for a submission, oldest first.
    pub async fn evaluations(
        pool: &PgPool,
        submission_id: DbId,
    ) -> Result<Vec<Evaluation>, sqlx::Error> {
        let query = format!(
            "SELECT {EVALUATION_COLUMNS} FROM submission_evaluations \
             WHERE submission_id = $1 \
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, Evaluation>(&query)
            .bind(submission_id)
            .fetch_all(pool)
            .await
    }
}
