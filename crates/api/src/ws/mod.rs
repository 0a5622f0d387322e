//! WebSocket infrastructure for the real-time chat and update channel.
//!
//! Provides connection management with named rooms, heartbeat monitoring,
//! and the HTTP upgrade handler used by Axum routes.

mod handler;
mod heartbeat;
pub mod manager;
pub mod room;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
pub use room::RoomKey;
