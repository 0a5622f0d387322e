//! Room key parsing.
//!
//! Rooms are string keys shared by chat participants: `team_<id>` for team
//! rooms and `project_<id>` for project rooms. Join authorization depends on
//! which entity the key refers to.

use hackforge_core::types::DbId;

/// A parsed room key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomKey {
    Team(DbId),
    Project(DbId),
}

impl RoomKey {
    /// Parse a raw room string (`team_<id>` / `project_<id>`).
    pub fn parse(room: &str) -> Option<Self> {
        if let Some(id) = room.strip_prefix("team_") {
            return id.parse().ok().map(RoomKey::Team);
        }
        if let Some(id) = room.strip_prefix("project_") {
            return id.parse().ok().map(RoomKey::Project);
        }
        None
    }

    /// The canonical string form of the key.
    pub fn as_string(&self) -> String {
        match self {
            RoomKey::Team(id) => format!("team_{id}"),
            RoomKey::Project(id) => format!("project_{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_team_and_project_keys() {
        assert_eq!(RoomKey::parse("team_42"), Some(RoomKey::Team(42)));
        assert_eq!(RoomKey::parse("project_7"), Some(RoomKey::Project(7)));
    }

    #[test]
    fn rejects_malformed_keys() {
        assert_eq!(RoomKey::parse("team_"), None);
        assert_eq!(RoomKey::parse("team_abc"), None);
        assert_eq!(RoomKey::parse("lobby"), None);
        assert_eq!(RoomKey::parse(""), None);
    }

    #[test]
    fn round_trips_to_string() {
        let key = RoomKey::parse("project_9").unwrap();
        assert_eq!(key.as_string(), "project_9");
    }
}
