//! Request handlers, one submodule per API resource.
//!
//! Handlers are thin: validate input, check authorization, delegate to the
//! corresponding repository in `hackforge_db`, publish fan-out events, and
//! map errors via [`AppError`](crate::error::AppError).

pub mod auth;
pub mod dashboard;
pub mod hackathon;
pub mod message;
pub mod notification;
pub mod project;
pub mod submission;
pub mod team;
pub mod user;
