//! WebSocket upgrade handler and the chat message protocol.
//!
//! A freshly upgraded socket is unauthenticated. The client authenticates by
//! sending its access token as the first frame, then joins rooms and sends
//! chat messages:
//!
//! ```text
//! -> {"type": "auth", "token": "<jwt>"}
//! <- {"type": "authenticated", "user_id": 7}
//! -> {"type": "join", "room": "team_42"}
//! <- {"type": "joined", "room": "team_42"}
//! -> {"type": "chat", "room": "team_42", "content": "hello"}
//! <- {"type": "chat", "message": { ... }}            (to all room members)
//! ```
//!
//! Broadcasts are fire-and-forget; the only acknowledgment is the delivery
//! flag stamped on the persisted message once at least one other room member
//! received the push.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use hackforge_core::notification::NotificationPayload;
use hackforge_core::types::DbId;
use hackforge_db::models::message::CreateMessage;
use hackforge_db::repositories::{MessageRepo, ProjectRepo, TeamRepo};
use hackforge_events::PlatformEvent;
use serde::Deserialize;

use crate::auth::jwt::validate_token;
use crate::state::AppState;
use crate::ws::room::RoomKey;

/// Frames accepted from clients.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientFrame {
    Auth {
        token: String,
    },
    Join {
        room: String,
    },
    Leave {
        room: String,
    },
    Chat {
        room: String,
        content: String,
        parent_id: Option<DbId>,
        /// User ids mentioned in the message; each receives a notification.
        #[serde(default)]
        mentions: Vec<DbId>,
    },
}

/// HTTP handler that upgrades the connection to WebSocket.
///
/// After the upgrade the connection is registered with `WsManager` and
/// managed by two tasks (sender + receiver).
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager`.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Dispatches inbound frames on the current task.
///   4. Cleans up on disconnect.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    // Register and get the receiver for outbound messages.
    let mut rx = state.ws_manager.add(conn_id.clone(), None).await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // Receiver loop: dispatch inbound frames.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientFrame>(&text) {
                Ok(frame) => dispatch_frame(&state, &conn_id, frame).await,
                Err(e) => {
                    send_error(&state, &conn_id, &format!("Malformed frame: {e}")).await;
                }
            },
            Ok(_other) => {
                // Binary and ping frames are ignored.
            }
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Clean up: remove connection and abort sender task.
    state.ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

/// Handle one parsed client frame.
async fn dispatch_frame(state: &AppState, conn_id: &str, frame: ClientFrame) {
    match frame {
        ClientFrame::Auth { token } => handle_auth(state, conn_id, &token).await,
        ClientFrame::Join { room } => handle_join(state, conn_id, &room).await,
        ClientFrame::Leave { room } => {
            state.ws_manager.leave_room(conn_id, &room).await;
            send_json(
                state,
                conn_id,
                serde_json::json!({ "type": "left", "room": room }),
            )
            .await;
        }
        ClientFrame::Chat {
            room,
            content,
            parent_id,
            mentions,
        } => handle_chat(state, conn_id, &room, content, parent_id, mentions).await,
    }
}

/// Authenticate the socket with a JWT access token.
async fn handle_auth(state: &AppState, conn_id: &str, token: &str) {
    match validate_token(token, &state.config.jwt) {
        Ok(claims) => {
            state.ws_manager.authenticate(conn_id, claims.sub).await;
            tracing::info!(conn_id = %conn_id, user_id = claims.sub, "WebSocket authenticated");
            send_json(
                state,
                conn_id,
                serde_json::json!({ "type": "authenticated", "user_id": claims.sub }),
            )
            .await;
        }
        Err(_) => {
            send_error(state, conn_id, "Invalid or expired token").await;
        }
    }
}

/// Join a room after checking the caller's membership of the underlying
/// team or project.
async fn handle_join(state: &AppState, conn_id: &str, room: &str) {
    let Some(user_id) = state.ws_manager.user_of(conn_id).await else {
        send_error(state, conn_id, "Authenticate before joining rooms").await;
        return;
    };

    let Some(key) = RoomKey::parse(room) else {
        send_error(state, conn_id, "Unknown room key").await;
        return;
    };

    let allowed = match key {
        RoomKey::Team(team_id) => {
            TeamRepo::is_accepted_member(&state.pool, team_id, user_id).await
        }
        RoomKey::Project(project_id) => ProjectRepo::member_role(&state.pool, project_id, user_id)
            .await
            .map(|role| role.is_some()),
    };

    match allowed {
        Ok(true) => {
            state.ws_manager.join_room(conn_id, room).await;
            send_json(
                state,
                conn_id,
                serde_json::json!({ "type": "joined", "room": room }),
            )
            .await;
        }
        Ok(false) => {
            send_error(state, conn_id, "You are not a member of this room").await;
        }
        Err(e) => {
            tracing::error!(error = %e, room, "Room membership check failed");
            send_error(state, conn_id, "Room membership check failed").await;
        }
    }
}

/// Persist a chat message and relay it to the room.
async fn handle_chat(
    state: &AppState,
    conn_id: &str,
    room: &str,
    content: String,
    parent_id: Option<DbId>,
    mentions: Vec<DbId>,
) {
    let Some(user_id) = state.ws_manager.user_of(conn_id).await else {
        send_error(state, conn_id, "Authenticate before sending messages").await;
        return;
    };

    if !state.ws_manager.in_room(conn_id, room).await {
        send_error(state, conn_id, "Join the room before sending messages").await;
        return;
    }

    if content.trim().is_empty() {
        send_error(state, conn_id, "Message content must not be empty").await;
        return;
    }

    let input = CreateMessage {
        room: room.to_string(),
        sender_id: user_id,
        content,
        parent_id,
    };
    let message = match MessageRepo::create(&state.pool, &input).await {
        Ok(message) => message,
        Err(e) => {
            tracing::error!(error = %e, room, "Failed to persist chat message");
            send_error(state, conn_id, "Failed to persist message").await;
            return;
        }
    };

    // Relay to every room member, the sender's own connection included so
    // multi-device clients stay in sync.
    let frame = serde_json::json!({ "type": "chat", "message": message });
    let ws_msg = Message::Text(frame.to_string().into());
    let pushed = state.ws_manager.send_to_room(room, ws_msg, None).await;

    // Delivery bookkeeping: flipped once anyone besides the sender's own
    // connection received the push.
    if pushed > 1 {
        if let Err(e) = MessageRepo::mark_delivered(&state.pool, message.id).await {
            tracing::warn!(error = %e, message_id = message.id, "Delivery flag update failed");
        }
    }

    // Mentioned users get a notification through the regular fan-out path.
    if !mentions.is_empty() {
        state.event_bus.publish(
            PlatformEvent::new("message.mention")
                .with_source("message", message.id)
                .with_actor(user_id)
                .with_targets(mentions)
                .with_notification(NotificationPayload::MessageMention {
                    room: room.to_string(),
                    message_id: message.id,
                    sender_id: user_id,
                }),
        );
    }
}

/// Push a JSON frame to a single connection.
async fn send_json(state: &AppState, conn_id: &str, value: serde_json::Value) {
    state
        .ws_manager
        .send_to_conn(conn_id, Message::Text(value.to_string().into()))
        .await;
}

/// Push an error frame to a single connection.
async fn send_error(state: &AppState, conn_id: &str, message: &str) {
    send_json(
        state,
        conn_id,
        serde_json::json!({ "type": "error", "message": message }),
    )
    .await;
}
