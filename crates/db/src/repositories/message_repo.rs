//! Repository for the `messages` table.

use hackforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::message::{CreateMessage, Message};

/// Column list for `messages` queries.
const COLUMNS: &str = "id, room, sender_id, content, parent_id, reply_count, \
                        is_deleted, is_delivered, created_at";

/// Tombstone text stored in place of soft-deleted message content.
const DELETED_CONTENT: &str = "[deleted]";

/// Provides CRUD operations for chat messages.
pub struct MessageRepo;

impl MessageRepo {
    /// Persist a new message. When the message is a threaded reply, the
    /// parent's denormalized `reply_count` is incremented in the same
    /// transaction.
    pub async fn create(pool: &PgPool, input: &CreateMessage) -> Result<Message, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert_query = format!(
            "INSERT INTO messages (room, sender_id, content, parent_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let message = sqlx::query_as::<_, Message>(&insert_query)
            .bind(&input.room)
            .bind(input.sender_id)
            .bind(&input.content)
            .bind(input.parent_id)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(parent_id) = input.parent_id {
            sqlx::query("UPDATE messages SET reply_count = reply_count + 1 WHERE id = $1")
                .bind(parent_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(message)
    }

    /// Find a message by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Message>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM messages WHERE id = $1");
        sqlx::query_as::<_, Message>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a room's messages, newest first.
    pub async fn list_room(
        pool: &PgPool,
        room: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Message>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM messages \
             WHERE room = $1 \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Message>(&query)
            .bind(room)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Soft-delete a message: replace the content with a tombstone and set
    /// the flag. Only the sender may delete; returns `false` otherwise.
    pub async fn soft_delete(
        pool: &PgPool,
        message_id: DbId,
        sender_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE messages \
             SET content = $3, is_deleted = true \
             WHERE id = $1 AND sender_id = $2 AND is_deleted = false",
        )
        .bind(message_id)
        .bind(sender_id)
        .bind(DELETED_CONTENT)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Flip the delivery flag once at least one room member received the push.
    pub async fn mark_delivered(pool: &PgPool, message_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE messages SET is_delivered = true WHERE id = $1")
            .bind(message_id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
