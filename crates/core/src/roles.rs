//! Well-known role name constants.
//!
//! These must match the seed data in the `create_roles` migration.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_PARTICIPANT: &str = "participant";
pub const ROLE_JUDGE: &str = "judge";
pub const ROLE_MENTOR: &str = "mentor";
