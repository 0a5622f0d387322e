//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod hackathon;
pub mod message;
pub mod notification;
pub mod project;
pub mod role;
pub mod session;
pub mod submission;
pub mod team;
pub mod user;
