//! Periodic cleanup of expired notifications.
//!
//! Notifications carry an `expires_at` stamp 30 days after creation. This
//! task deletes rows past their TTL on a fixed interval using
//! `tokio::time::interval`, standing in for a store-level TTL index.

use sqlx::PgPool;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use hackforge_db::repositories::NotificationRepo;

/// How often the cleanup job runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Run the notification retention cleanup loop.
///
/// Runs until `cancel` is triggered.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = CLEANUP_INTERVAL.as_secs(),
        "Notification retention job started"
    );

    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Notification retention job stopping");
                break;
            }
            _ = interval.tick() => {
                match NotificationRepo::delete_expired(&pool).await {
                    Ok(deleted) => {
                        if deleted > 0 {
                            tracing::info!(deleted, "Notification retention: purged expired rows");
                        } else {
                            tracing::debug!("Notification retention: no rows to purge");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Notification retention: cleanup failed");
                    }
                }
            }
        }
    }
}
