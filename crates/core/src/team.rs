//! Team roster invariants and the invitation lifecycle.
//!
//! A team roster is a list of member slots, each carrying a tri-state
//! [`InvitationStatus`] and a leader flag. Two invariants hold across every
//! mutation:
//!
//! 1. At least one *accepted* member carries the leader flag; the removal
//!    that would violate this is rejected.
//! 2. The accepted-member count never exceeds the team's `max_members`.
//!
//! The functions here are pure checks over an in-memory roster snapshot.
//! Callers pair them with guarded SQL statements so the invariants also hold
//! under concurrent writers.

use crate::error::CoreError;
use crate::types::DbId;

/// Tri-state consent tag on a team member slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl InvitationStatus {
    /// Stable string form stored in the `team_members.invitation_status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Rejected => "rejected",
        }
    }

    /// Parse the stored string form.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(InvitationStatus::Pending),
            "accepted" => Ok(InvitationStatus::Accepted),
            "rejected" => Ok(InvitationStatus::Rejected),
            other => Err(CoreError::Internal(format!(
                "Unknown invitation status: {other}"
            ))),
        }
    }
}

/// In-memory snapshot of a single roster slot.
#[derive(Debug, Clone, Copy)]
pub struct MemberSlot {
    pub user_id: DbId,
    pub status: InvitationStatus,
    pub is_leader: bool,
}

/// What an invite should do to the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteAction {
    /// No slot exists for the target: insert a fresh pending slot.
    CreatePending,
    /// The target previously rejected an invite: reset that slot to pending.
    ResetRejectedToPending,
}

/// Number of slots with `accepted` status.
pub fn accepted_count(slots: &[MemberSlot]) -> i64 {
    slots
        .iter()
        .filter(|s| s.status == InvitationStatus::Accepted)
        .count() as i64
}

/// Remaining capacity: `max_members` minus accepted count, floored at zero.
pub fn available_slots(slots: &[MemberSlot], max_members: i64) -> i64 {
    (max_members - accepted_count(slots)).max(0)
}

/// A team is looking for members while it has at least one open slot.
pub fn is_looking_for_members(slots: &[MemberSlot], max_members: i64) -> bool {
    available_slots(slots, max_members) > 0
}

/// Validate an invite and decide what it does to the roster.
///
/// Rules:
/// - Only an existing *accepted* member may invite.
/// - The team must have an open slot (accepted count < `max_members`).
/// - A target with a pending or accepted slot cannot be re-invited.
/// - A target with a rejected slot is reset to pending.
pub fn check_invite(
    slots: &[MemberSlot],
    max_members: i64,
    inviter_id: DbId,
    target_id: DbId,
) -> Result<InviteAction, CoreError> {
    let inviter_accepted = slots
        .iter()
        .any(|s| s.user_id == inviter_id && s.status == InvitationStatus::Accepted);
    if !inviter_accepted {
        return Err(CoreError::Forbidden(
            "Only an accepted team member can invite".into(),
        ));
    }

    if accepted_count(slots) >= max_members {
        return Err(CoreError::Conflict("Team is full".into()));
    }

    match slots.iter().find(|s| s.user_id == target_id) {
        None => Ok(InviteAction::CreatePending),
        Some(slot) => match slot.status {
            InvitationStatus::Rejected => Ok(InviteAction::ResetRejectedToPending),
            InvitationStatus::Pending => {
                Err(CoreError::Conflict("User is already invited".into()))
            }
            InvitationStatus::Accepted => {
                Err(CoreError::Conflict("User is already a team member".into()))
            }
        },
    }
}

/// Validate a response to an invitation.
///
/// Only the invited account may respond, only while its slot is pending, and
/// accepting requires an open slot at response time.
pub fn check_response(
    slots: &[MemberSlot],
    max_members: i64,
    responder_id: DbId,
    accept: bool,
) -> Result<(), CoreError> {
    let slot = slots
        .iter()
        .find(|s| s.user_id == responder_id)
        .ok_or_else(|| CoreError::Forbidden("You have not been invited to this team".into()))?;

    if slot.status != InvitationStatus::Pending {
        return Err(CoreError::Conflict(
            "Invitation has already been responded to".into(),
        ));
    }

    if accept && accepted_count(slots) >= max_members {
        return Err(CoreError::Conflict("Team is full".into()));
    }

    Ok(())
}

/// Validate removing a slot from the roster.
///
/// Removing the sole accepted leader would break invariant 1 and is
/// rejected; every other slot may be deleted outright.
pub fn check_removal(slots: &[MemberSlot], target_id: DbId) -> Result<(), CoreError> {
    let slot = slots
        .iter()
        .find(|s| s.user_id == target_id)
        .ok_or_else(|| CoreError::Validation("User is not on this team".into()))?;

    if slot.is_leader && slot.status == InvitationStatus::Accepted {
        let accepted_leaders = slots
            .iter()
            .filter(|s| s.is_leader && s.status == InvitationStatus::Accepted)
            .count();
        if accepted_leaders <= 1 {
            return Err(CoreError::Conflict(
                "Cannot remove the only team leader".into(),
            ));
        }
    }

    Ok(())
}
