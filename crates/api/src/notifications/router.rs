//! Event-to-notification fan-out engine.
//!
//! [`NotificationRouter`] subscribes to the platform event bus and, for each
//! event carrying targets, performs one notification insert per target user
//! as an unordered batch of independent writes. A failed insert is logged
//! and skipped; there is no transaction around the batch and no rollback —
//! partial fan-out is accepted. In-app delivery additionally pushes a
//! WebSocket frame; email delivery is attempted only when SMTP is
//! configured, also best-effort.

use std::sync::Arc;

use axum::extract::ws::Message;
use chrono::Duration;
use hackforge_core::notification::NOTIFICATION_TTL_DAYS;
use hackforge_core::types::DbId;
use hackforge_db::repositories::{NotificationRepo, UserRepo};
use hackforge_db::DbPool;
use hackforge_events::{EmailConfig, EmailDelivery, PlatformEvent};
use tokio::sync::broadcast;

use crate::ws::WsManager;

/// Routes platform events to user notifications.
pub struct NotificationRouter {
    pool: DbPool,
    ws_manager: Arc<WsManager>,
    email: Option<EmailDelivery>,
}

impl NotificationRouter {
    /// Create a new router with the given database pool and WebSocket manager.
    ///
    /// Email delivery is enabled only when `SMTP_HOST` is configured.
    pub fn new(pool: DbPool, ws_manager: Arc<WsManager>) -> Self {
        let email = EmailConfig::from_env().map(EmailDelivery::new);
        if email.is_none() {
            tracing::info!("SMTP not configured, email delivery disabled");
        }
        Self {
            pool,
            ws_manager,
            email,
        }
    }

    /// Run the main routing loop.
    ///
    /// Subscribes to the event bus via `receiver` and processes each event.
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](hackforge_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.route_event(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Fan an event out to all of its target users.
    async fn route_event(&self, event: &PlatformEvent) {
        let Some(payload) = &event.notification else {
            // Events without a notification payload are bus-internal.
            return;
        };

        let payload_json = match serde_json::to_value(payload) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, event_type = %event.event_type, "Unserializable payload");
                return;
            }
        };
        let kind = payload.kind();
        let expires_at = chrono::Utc::now() + Duration::days(NOTIFICATION_TTL_DAYS);

        for &user_id in &event.target_user_ids {
            // The actor does not get notified about their own action.
            if event.actor_user_id == Some(user_id) {
                continue;
            }

            let notification_id = match NotificationRepo::create(
                &self.pool,
                user_id,
                kind.as_str(),
                &payload_json,
                expires_at,
            )
            .await
            {
                Ok(id) => id,
                Err(e) => {
                    // Best-effort batch: log and move on to the next target.
                    tracing::error!(
                        error = %e,
                        user_id,
                        event_type = %event.event_type,
                        "Notification insert failed"
                    );
                    continue;
                }
            };

            self.push_in_app(user_id, notification_id, event, &payload_json)
                .await;
            self.send_email(user_id, event).await;
        }
    }

    /// Push the notification over WebSocket and stamp the delivery flag when
    /// at least one connection received it.
    async fn push_in_app(
        &self,
        user_id: DbId,
        notification_id: DbId,
        event: &PlatformEvent,
        payload_json: &serde_json::Value,
    ) {
        let frame = serde_json::json!({
            "type": "notification",
            "id": notification_id,
            "event_type": event.event_type,
            "payload": payload_json,
            "timestamp": event.timestamp,
        });
        let ws_msg = Message::Text(frame.to_string().into());
        let pushed = self.ws_manager.send_to_user(user_id, ws_msg).await;

        if pushed > 0 {
            NotificationRepo::mark_delivered(&self.pool, notification_id)
                .await
                .ok();
        }
    }

    /// Best-effort email delivery to the target user's address.
    async fn send_email(&self, user_id: DbId, event: &PlatformEvent) {
        let Some(email) = &self.email else {
            return;
        };

        let address = match UserRepo::find_by_id(&self.pool, user_id).await {
            Ok(Some(user)) if user.is_active => user.email,
            Ok(_) => return,
            Err(e) => {
                tracing::warn!(error = %e, user_id, "Email recipient lookup failed");
                return;
            }
        };

        if let Err(e) = email.deliver(&address, event).await {
            tracing::warn!(error = %e, user_id, "Email delivery failed");
        }
    }
}
