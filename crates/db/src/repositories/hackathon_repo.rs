//! Repository for the `hackathons` and `hackathon_participants` tables.

use hackforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::hackathon::{CreateHackathon, Hackathon, ParticipantInfo, UpdateHackathon};

/// Column list for `hackathons` queries.
const COLUMNS: &str = "id, name, description, registration_starts_at, registration_ends_at, \
                        starts_at, ends_at, judging_ends_at, is_public, max_participants, \
                        status, created_by, created_at, updated_at";

/// Provides CRUD operations for hackathons and participant registration.
pub struct HackathonRepo;

impl HackathonRepo {
    /// Insert a new hackathon, returning the created row.
    pub async fn create(
        pool: &PgPool,
        created_by: DbId,
        input: &CreateHackathon,
    ) -> Result<Hackathon, sqlx::Error> {
        let query = format!(
            "INSERT INTO hackathons \
                (name, description, registration_starts_at, registration_ends_at, \
                 starts_at, ends_at, judging_ends_at, is_public, max_participants, created_by)
             VALUES ($1, COALESCE($2, ''), $3, $4, $5, $6, $7, COALESCE($8, true), \
                     COALESCE($9, 500), $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Hackathon>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.registration_starts_at)
            .bind(input.registration_ends_at)
            .bind(input.starts_at)
            .bind(input.ends_at)
            .bind(input.judging_ends_at)
            .bind(input.is_public)
            .bind(input.max_participants)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a hackathon by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Hackathon>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM hackathons WHERE id = $1");
        sqlx::query_as::<_, Hackathon>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List hackathons, soonest-starting first.
    ///
    /// When `public_only` is `true`, private hackathons are filtered out.
    pub async fn list(pool: &PgPool, public_only: bool) -> Result<Vec<Hackathon>, sqlx::Error> {
        let filter = if public_only {
            "WHERE is_public = true"
        } else {
            ""
        };
        let query = format!("SELECT {COLUMNS} FROM hackathons {filter} ORDER BY starts_at ASC");
        sqlx::query_as::<_, Hackathon>(&query).fetch_all(pool).await
    }

    /// Update a hackathon. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateHackathon,
    ) -> Result<Option<Hackathon>, sqlx::Error> {
        let query = format!(
            "UPDATE hackathons SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                registration_starts_at = COALESCE($4, registration_starts_at),
                registration_ends_at = COALESCE($5, registration_ends_at),
                starts_at = COALESCE($6, starts_at),
                ends_at = COALESCE($7, ends_at),
                judging_ends_at = COALESCE($8, judging_ends_at),
                is_public = COALESCE($9, is_public),
                max_participants = COALESCE($10, max_participants),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Hackathon>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.registration_starts_at)
            .bind(input.registration_ends_at)
            .bind(input.starts_at)
            .bind(input.ends_at)
            .bind(input.judging_ends_at)
            .bind(input.is_public)
            .bind(input.max_participants)
            .fetch_optional(pool)
            .await
    }

    /// Delete a hackathon. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM hackathons WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Opportunistically persist the derived phase snapshot.
    pub async fn update_status_snapshot(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE hackathons SET status = $2 WHERE id = $1 AND status <> $2")
            .bind(id)
            .bind(status)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Register a user, guarded by the capacity limit.
    ///
    /// The insert only proceeds while the current participant count is below
    /// `max_participants`, so concurrent registrations cannot overshoot.
    /// Returns `false` when the hackathon is full. A duplicate registration
    /// surfaces as a unique-violation error on `uq_hackathon_participants`.
    pub async fn register_participant(
        pool: &PgPool,
        hackathon_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO hackathon_participants (hackathon_id, user_id)
             SELECT $1, $2
             WHERE (SELECT COUNT(*) FROM hackathon_participants WHERE hackathon_id = $1)
                 < (SELECT max_participants FROM hackathons WHERE id = $1)",
        )
        .bind(hackathon_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether the user is registered for the hackathon.
    pub async fn is_registered(
        pool: &PgPool,
        hackathon_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM hackathon_participants WHERE hackathon_id = $1 AND user_id = $2",
        )
        .bind(hackathon_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(count > 0)
    }

    /// List a hackathon's participants with usernames, oldest first.
    pub async fn list_participants(
        pool: &PgPool,
        hackathon_id: DbId,
    ) -> Result<Vec<ParticipantInfo>, sqlx::Error> {
        sqlx::query_as::<_, ParticipantInfo>(
            "SELECT p.user_id, u.username, p.registered_at \
             FROM hackathon_participants p \
             JOIN users u ON p.user_id = u.id \
             WHERE p.hackathon_id = $1 \
             ORDER BY p.registered_at ASC",
        )
        .bind(hackathon_id)
        .fetch_all(pool)
        .await
    }

    /// IDs of every registered participant (notification fan-out targets).
    pub async fn participant_user_ids(
        pool: &PgPool,
        hackathon_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT user_id FROM hackathon_participants WHERE hackathon_id = $1",
        )
        .bind(hackathon_id)
        .fetch_all(pool)
        .await
    }
}
