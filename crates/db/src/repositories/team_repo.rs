//! Repository for the `teams` and `team_members` tables.
//!
//! Roster mutations embed their invariant guards in the statement itself
//! (capacity subqueries, sole-leader check) so the invariants hold even
//! when two requests race past the handler-level checks.

use hackforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::team::{CreateTeam, Team, TeamMemberInfo, UpdateTeam};

/// Column list for `teams` queries.
const COLUMNS: &str =
    "id, hackathon_id, name, description, max_members, created_at, updated_at";

/// Column list for roster queries (joined with usernames).
const MEMBER_COLUMNS: &str = "m.user_id, u.username, m.invitation_status, m.is_leader, \
                        m.invited_at, m.joined_at";

/// Provides CRUD operations for teams and their rosters.
pub struct TeamRepo;

impl TeamRepo {
    /// Insert a new team with its creator as the accepted leader.
    pub async fn create(
        pool: &PgPool,
        creator_id: DbId,
        input: &CreateTeam,
    ) -> Result<Team, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert_query = format!(
            "INSERT INTO teams (hackathon_id, name, description, max_members)
             VALUES ($1, $2, COALESCE($3, ''), COALESCE($4, 5))
             RETURNING {COLUMNS}"
        );
        let team = sqlx::query_as::<_, Team>(&insert_query)
            .bind(input.hackathon_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.max_members)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO team_members \
                (team_id, user_id, invitation_status, is_leader, joined_at)
             VALUES ($1, $2, 'accepted', true, NOW())",
        )
        .bind(team.id)
        .bind(creator_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(team)
    }

    /// Find a team by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Team>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM teams WHERE id = $1");
        sqlx::query_as::<_, Team>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List teams, newest first, optionally filtered by hackathon and by
    /// whether they still have an open slot.
    pub async fn list(
        pool: &PgPool,
        hackathon_id: Option<DbId>,
        looking_for_members: bool,
    ) -> Result<Vec<Team>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM teams
             WHERE ($1::bigint IS NULL OR hackathon_id = $1)
               AND ($2::boolean = false OR
                    (SELECT COUNT(*) FROM team_members m
                     WHERE m.team_id = teams.id AND m.invitation_status = 'accepted')
                    < max_members)
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Team>(&query)
            .bind(hackathon_id)
            .bind(looking_for_members)
            .fetch_all(pool)
            .await
    }

    /// Update a team. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTeam,
    ) -> Result<Option<Team>, sqlx::Error> {
        let query = format!(
            "UPDATE teams SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                max_members = COALESCE($4, max_members),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Team>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.max_members)
            .fetch_optional(pool)
            .await
    }

    /// Delete a team and its roster. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The full roster with usernames, leaders first, then by invite time.
    pub async fn members(pool: &PgPool, team_id: DbId) -> Result<Vec<TeamMemberInfo>, sqlx::Error> {
        let query = format!(
            "SELECT {MEMBER_COLUMNS} FROM team_members m \
             JOIN users u ON m.user_id = u.id \
             WHERE m.team_id = $1 \
             ORDER BY m.is_leader DESC, m.invited_at ASC"
        );
        sqlx::query_as::<_, TeamMemberInfo>(&query)
            .bind(team_id)
            .fetch_all(pool)
            .await
    }

    /// Insert a fresh pending slot, guarded by the capacity invariant.
    ///
    /// Returns `false` when the accepted count has already reached
    /// `max_members` (a racing accept won). A duplicate slot surfaces as a
    /// unique violation on `uq_team_members_team_user`.
    pub async fn insert_pending_member(
        pool: &PgPool,
        team_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO team_members (team_id, user_id, invitation_status)
             SELECT $1, $2, 'pending'
             WHERE (SELECT COUNT(*) FROM team_members
                    WHERE team_id = $1 AND invitation_status = 'accepted')
                 < (SELECT max_members FROM teams WHERE id = $1)",
        )
        .bind(team_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Reset a previously rejected slot back to pending.
    ///
    /// Returns `false` if no rejected slot exists for the user.
    pub async fn reset_rejected_to_pending(
        pool: &PgPool,
        team_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE team_members
             SET invitation_status = 'pending', invited_at = NOW(), joined_at = NULL
             WHERE team_id = $1 AND user_id = $2 AND invitation_status = 'rejected'",
        )
        .bind(team_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Flip the caller's own pending slot to accepted, stamping `joined_at`.
    ///
    /// Guarded by the capacity invariant; returns `false` when the slot is
    /// not pending or the team filled up in the meantime.
    pub async fn accept_invitation(
        pool: &PgPool,
        team_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE team_members
             SET invitation_status = 'accepted', joined_at = NOW()
             WHERE team_id = $1 AND user_id = $2 AND invitation_status = 'pending'
               AND (SELECT COUNT(*) FROM team_members tm
                    WHERE tm.team_id = $1 AND tm.invitation_status = 'accepted')
                 < (SELECT max_members FROM teams WHERE id = $1)",
        )
        .bind(team_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Flip the caller's own pending slot to rejected.
    pub async fn reject_invitation(
        pool: &PgPool,
        team_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE team_members
             SET invitation_status = 'rejected'
             WHERE team_id = $1 AND user_id = $2 AND invitation_status = 'pending'",
        )
        .bind(team_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a slot outright, guarded by the leader invariant.
    ///
    /// The delete refuses to remove the last accepted leader; returns
    /// `false` in that case (or when no slot exists).
    pub async fn remove_member(
        pool: &PgPool,
        team_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM team_members
             WHERE team_id = $1 AND user_id = $2
               AND NOT (
                   is_leader AND invitation_status = 'accepted'
                   AND (SELECT COUNT(*) FROM team_members tm
                        WHERE tm.team_id = $1
                          AND tm.invitation_status = 'accepted'
                          AND tm.is_leader = true) <= 1
               )",
        )
        .bind(team_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether the user holds an accepted slot on the team.
    pub async fn is_accepted_member(
        pool: &PgPool,
        team_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM team_members \
             WHERE team_id = $1 AND user_id = $2 AND invitation_status = 'accepted'",
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(count > 0)
    }

    /// IDs of all accepted members (notification fan-out targets).
    pub async fn accepted_member_ids(
        pool: &PgPool,
        team_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT user_id FROM team_members \
             WHERE team_id = $1 AND invitation_status = 'accepted'",
        )
        .bind(team_id)
        .fetch_all(pool)
        .await
    }

    /// Teams where the user holds an accepted slot.
    pub async fn teams_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Team>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM teams \
             WHERE id IN (SELECT team_id FROM team_members \
                          WHERE user_id = $1 AND invitation_status = 'accepted') \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Team>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Teams where the user has a pending invitation.
    pub async fn pending_invitations_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Team>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM teams \
             WHERE id IN (SELECT team_id FROM team_members \
                          WHERE user_id = $1 AND invitation_status = 'pending') \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Team>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
