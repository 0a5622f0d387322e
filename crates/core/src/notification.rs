//! Typed notification payloads.
//!
//! Every notification kind carries a closed payload shape rather than an
//! open metadata dictionary. The serialized form is stored in the
//! `notifications.payload` jsonb column, with the kind duplicated into the
//! `notifications.kind` column for indexed filtering.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Days until a notification expires and is eligible for retention cleanup.
pub const NOTIFICATION_TTL_DAYS: i64 = 30;

/// Closed set of notification kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    TeamInvite,
    InviteResponse,
    TeamUpdate,
    ProjectUpdate,
    SubmissionEvaluated,
    HackathonUpdate,
    MessageMention,
}

impl NotificationKind {
    /// Stable string form stored in the `notifications.kind` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::TeamInvite => "team_invite",
            NotificationKind::InviteResponse => "invite_response",
            NotificationKind::TeamUpdate => "team_update",
            NotificationKind::ProjectUpdate => "project_update",
            NotificationKind::SubmissionEvaluated => "submission_evaluated",
            NotificationKind::HackathonUpdate => "hackathon_update",
            NotificationKind::MessageMention => "message_mention",
        }
    }
}

/// Kind-specific notification payload.
///
/// Serialized as internally-tagged JSON (`{"kind": "team_invite", ...}`),
/// so the stored payload is self-describing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationPayload {
    TeamInvite {
        team_id: DbId,
        team_name: String,
        invited_by: DbId,
    },
    InviteResponse {
        team_id: DbId,
        team_name: String,
        responder_id: DbId,
        accepted: bool,
    },
    TeamUpdate {
        team_id: DbId,
        team_name: String,
        summary: String,
    },
    ProjectUpdate {
        project_id: DbId,
        title: String,
        summary: String,
    },
    SubmissionEvaluated {
        submission_id: DbId,
        project_id: DbId,
        judge_count: i64,
    },
    HackathonUpdate {
        hackathon_id: DbId,
        name: String,
        summary: String,
    },
    MessageMention {
        room: String,
        message_id: DbId,
        sender_id: DbId,
    },
}

impl NotificationPayload {
    /// The kind tag for this payload.
    pub fn kind(&self) -> NotificationKind {
        match self {
            NotificationPayload::TeamInvite { .. } => NotificationKind::TeamInvite,
            NotificationPayload::InviteResponse { .. } => NotificationKind::InviteResponse,
            NotificationPayload::TeamUpdate { .. } => NotificationKind::TeamUpdate,
            NotificationPayload::ProjectUpdate { .. } => NotificationKind::ProjectUpdate,
            NotificationPayload::SubmissionEvaluated { .. } => {
                NotificationKind::SubmissionEvaluated
            }
            NotificationPayload::HackathonUpdate { .. } => NotificationKind::HackathonUpdate,
            NotificationPayload::MessageMention { .. } => NotificationKind::MessageMention,
        }
    }

    /// Short human-readable subject line, used by the email delivery channel.
    pub fn subject(&self) -> String {
        match self {
            NotificationPayload::TeamInvite { team_name, .. } => {
                format!("You have been invited to join team {team_name}")
            }
            NotificationPayload::InviteResponse {
                team_name,
                accepted,
                ..
            } => {
                if *accepted {
                    format!("An invitation to {team_name} was accepted")
                } else {
                    format!("An invitation to {team_name} was declined")
                }
            }
            NotificationPayload::TeamUpdate { team_name, .. } => {
                format!("Team {team_name} was updated")
            }
            NotificationPayload::ProjectUpdate { title, .. } => {
                format!("Project {title} was updated")
            }
            NotificationPayload::SubmissionEvaluated { .. } => {
                "Your submission received an evaluation".to_string()
            }
            NotificationPayload::HackathonUpdate { name, .. } => {
                format!("Hackathon {name} was updated")
            }
            NotificationPayload::MessageMention { room, .. } => {
                format!("You were mentioned in {room}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_serializes_with_kind_tag() {
        let payload = NotificationPayload::TeamInvite {
            team_id: 7,
            team_name: "Rustaceans".into(),
            invited_by: 3,
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], "team_invite");
        assert_eq!(json["team_id"], 7);

        let back: NotificationPayload = serde_json::from_value(json).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn kind_tag_matches_kind_column_value() {
        let payload = NotificationPayload::SubmissionEvaluated {
            submission_id: 1,
            project_id: 2,
            judge_count: 3,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], payload.kind().as_str());
    }

    #[test]
    fn unknown_kind_fails_to_parse() {
        let result: Result<NotificationPayload, _> =
            serde_json::from_value(serde_json::json!({ "kind": "carrier_pigeon" }));
        assert!(result.is_err(), "open-ended kinds must be rejected");
    }
}
