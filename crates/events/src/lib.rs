//! Hackforge event bus and notification delivery infrastructure.
//!
//! This crate provides the building blocks for platform-wide eventing:
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`] — the canonical domain event envelope.
//! - [`delivery`] — the SMTP email delivery channel.

pub mod bus;
pub mod delivery;

pub use bus::{EventBus, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailDelivery};
