//! Repository for the `roles` table.

use hackforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::role::Role;

/// Provides lookups for the seeded role set.
pub struct RoleRepo;

impl RoleRepo {
    /// Resolve a role ID to its name.
    pub async fn resolve_name(pool: &PgPool, id: DbId) -> Result<String, sqlx::Error> {
        sqlx::query_scalar("SELECT name FROM roles WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Find a role by its well-known name.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Role>, sqlx::Error> {
        sqlx::query_as::<_, Role>(
            "SELECT id, name, description, created_at FROM roles WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(pool)
        .await
    }
}
