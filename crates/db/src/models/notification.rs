//! Notification entity model.

use hackforge_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notifications` table.
///
/// `payload` is the serialized
/// [`NotificationPayload`](hackforge_core::notification::NotificationPayload);
/// `kind` duplicates its tag for indexed filtering.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub kind: String,
    pub payload: serde_json::Value,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub is_delivered: bool,
    pub delivered_at: Option<Timestamp>,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}
