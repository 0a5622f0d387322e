//! Repository for the `projects` and `project_members` tables.

use hackforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::project::{CreateProject, Project, ProjectMemberInfo, UpdateProject};

/// Column list for `projects` queries.
const COLUMNS: &str = "id, hackathon_id, title, description, repo_url, demo_url, status, \
                        submitted_at, created_at, updated_at";

/// Provides CRUD operations for projects and their member lists.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project with its creator as the owning member.
    pub async fn create(
        pool: &PgPool,
        creator_id: DbId,
        input: &CreateProject,
    ) -> Result<Project, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert_query = format!(
            "INSERT INTO projects (hackathon_id, title, description, repo_url, demo_url)
             VALUES ($1, $2, COALESCE($3, ''), $4, $5)
             RETURNING {COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&insert_query)
            .bind(input.hackathon_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.repo_url)
            .bind(&input.demo_url)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO project_members (project_id, user_id, role) VALUES ($1, $2, 'owner')")
            .bind(project.id)
            .bind(creator_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(project)
    }

    /// Find a project by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List projects, newest first, optionally filtered by hackathon.
    pub async fn list(
        pool: &PgPool,
        hackathon_id: Option<DbId>,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE ($1::bigint IS NULL OR hackathon_id = $1)
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(hackathon_id)
            .fetch_all(pool)
            .await
    }

    /// Update a project's descriptive fields. Only non-`None` fields apply.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                repo_url = COALESCE($4, repo_url),
                demo_url = COALESCE($5, demo_url),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.repo_url)
            .bind(&input.demo_url)
            .fetch_optional(pool)
            .await
    }

    /// Apply a status transition.
    ///
    /// `submitted_at` is stamped only when moving into `submitted` with no
    /// prior stamp; every later save leaves it untouched. The caller is
    /// responsible for validating the transition against the state machine.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                status = $2,
                submitted_at = CASE
                    WHEN $2 = 'submitted' AND submitted_at IS NULL THEN NOW()
                    ELSE submitted_at
                END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Delete a project. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The member list with usernames, owners first.
    pub async fn members(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ProjectMemberInfo>, sqlx::Error> {
        sqlx::query_as::<_, ProjectMemberInfo>(
            "SELECT m.user_id, u.username, m.role, m.added_at \
             FROM project_members m \
             JOIN users u ON m.user_id = u.id \
             WHERE m.project_id = $1 \
             ORDER BY m.role DESC, m.added_at ASC",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// The caller's membership role on the project, if any.
    pub async fn member_role(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT role FROM project_members WHERE project_id = $1 AND user_id = $2",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Add a member. A duplicate surfaces as a unique violation on
    /// `uq_project_members_project_user`.
    pub async fn add_member(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
        role: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO project_members (project_id, user_id, role) VALUES ($1, $2, $3)")
            .bind(project_id)
            .bind(user_id)
            .bind(role)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Remove a member, refusing to remove the last owner.
    ///
    /// Returns `false` when no row was removed (unknown member or sole owner).
    pub async fn remove_member(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM project_members
             WHERE project_id = $1 AND user_id = $2
               AND NOT (
                   role = 'owner'
                   AND (SELECT COUNT(*) FROM project_members pm
                        WHERE pm.project_id = $1 AND pm.role = 'owner') <= 1
               )",
        )
        .bind(project_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// IDs of all members (notification fan-out targets).
    pub async fn member_user_ids(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT user_id FROM project_members WHERE project_id = $1")
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Projects where the user is a member.
    pub async fn projects_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects \
             WHERE id IN (SELECT project_id FROM project_members WHERE user_id = $1) \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
